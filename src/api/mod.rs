pub mod client;
pub mod error;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::category::Category;
use crate::models::expense::{Expense, MonthlyStat};
use crate::store::session::AuthToken;

pub use client::ApiClient;
pub use error::ApiError;

/// Payload for creating or updating an expense. The server assigns the id
/// and the timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category_id: i64,
}

/// The backend operations the screens depend on.
///
/// Implemented by [`ApiClient`] against the real service; the UI layer only
/// sees this trait, so tests can drive the fetch-mutate-refetch cycle
/// against a stub. Authenticated operations take an explicit [`AuthToken`]
/// rather than reading ambient session state.
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError>;

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError>;

    async fn categories(&self, auth: &AuthToken) -> Result<Vec<Category>, ApiError>;

    async fn create_category(&self, auth: &AuthToken, name: &str) -> Result<(), ApiError>;

    async fn delete_category(&self, auth: &AuthToken, id: i64) -> Result<(), ApiError>;

    async fn expenses_for_user(&self, auth: &AuthToken) -> Result<Vec<Expense>, ApiError>;

    async fn expenses_for_category(
        &self,
        auth: &AuthToken,
        category_id: i64,
    ) -> Result<Vec<Expense>, ApiError>;

    async fn create_expense(&self, auth: &AuthToken, expense: &NewExpense) -> Result<(), ApiError>;

    async fn update_expense(
        &self,
        auth: &AuthToken,
        id: i64,
        expense: &NewExpense,
    ) -> Result<(), ApiError>;

    async fn delete_expense(&self, auth: &AuthToken, id: i64) -> Result<(), ApiError>;

    async fn monthly_totals(&self, auth: &AuthToken) -> Result<Vec<MonthlyStat>, ApiError>;
}
