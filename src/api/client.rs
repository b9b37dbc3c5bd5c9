use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::category::Category;
use crate::models::expense::{Expense, MonthlyStat};
use crate::store::session::AuthToken;

use super::error::{self, ApiError};
use super::{ExpenseApi, NewExpense};

/// Used when neither a CLI argument nor `EXPENSE_TRACKER_API` names the
/// backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5232/api";

/// HTTP client for the expense backend. One instance is shared by every
/// screen; the bearer token travels as an argument, not as client state.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, serde::Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default, alias = "username")]
    name: String,
}

#[derive(Debug, serde::Serialize)]
struct CreateCategoryRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct TotalsResponse {
    total: Vec<MonthlyStat>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and maps non-2xx responses to [`ApiError::Http`],
    /// extracting the server-supplied message when the body carries one.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = error::message_from_body(status, &body);
        tracing::warn!(status, "Backend request failed: {message}");
        Err(ApiError::Http { status, message })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: &AuthToken,
    ) -> Result<T, ApiError> {
        let request = self.client.get(self.url(path)).bearer_auth(&auth.token);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ExpenseApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        tracing::debug!("Logging in as {email}");
        let request = self
            .client
            .post(self.url("/user/login"))
            .json(&LoginRequest { email, password });
        let response = self.send(request).await?;
        let parsed: LoginResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;

        Ok(AuthToken {
            token: parsed.token,
            display_name: parsed.name,
        })
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        tracing::debug!("Registering {email}");
        let request = self.client.post(self.url("/user/register")).json(&RegisterRequest {
            name,
            email,
            password,
        });
        self.send(request).await.map(|_| ())
    }

    async fn categories(&self, auth: &AuthToken) -> Result<Vec<Category>, ApiError> {
        self.get_json("/category", auth).await
    }

    async fn create_category(&self, auth: &AuthToken, name: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/category"))
            .bearer_auth(&auth.token)
            .json(&CreateCategoryRequest { name });
        self.send(request).await.map(|_| ())
    }

    async fn delete_category(&self, auth: &AuthToken, id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.url(&format!("/category/{id}")))
            .bearer_auth(&auth.token);
        self.send(request).await.map(|_| ())
    }

    async fn expenses_for_user(&self, auth: &AuthToken) -> Result<Vec<Expense>, ApiError> {
        self.get_json("/Expense/user", auth).await
    }

    async fn expenses_for_category(
        &self,
        auth: &AuthToken,
        category_id: i64,
    ) -> Result<Vec<Expense>, ApiError> {
        self.get_json(&format!("/Expense/category/{category_id}"), auth).await
    }

    async fn create_expense(&self, auth: &AuthToken, expense: &NewExpense) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/Expense"))
            .bearer_auth(&auth.token)
            .json(expense);
        self.send(request).await.map(|_| ())
    }

    async fn update_expense(
        &self,
        auth: &AuthToken,
        id: i64,
        expense: &NewExpense,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.url(&format!("/Expense/{id}")))
            .bearer_auth(&auth.token)
            .json(expense);
        self.send(request).await.map(|_| ())
    }

    async fn delete_expense(&self, auth: &AuthToken, id: i64) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.url(&format!("/Expense/{id}")))
            .bearer_auth(&auth.token);
        self.send(request).await.map(|_| ())
    }

    async fn monthly_totals(&self, auth: &AuthToken) -> Result<Vec<MonthlyStat>, ApiError> {
        let totals: TotalsResponse = self.get_json("/Expense/total", auth).await?;
        Ok(totals.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn joins_paths_against_trimmed_base() {
        let client = ApiClient::new("http://localhost:5232/api/");
        assert_eq!(client.url("/category"), "http://localhost:5232/api/category");

        let client = ApiClient::new("http://localhost:5232/api");
        assert_eq!(client.url("/Expense/user"), "http://localhost:5232/api/Expense/user");
    }

    #[test]
    fn new_expense_serializes_camel_case_with_numeric_amount() {
        let expense = NewExpense {
            description: "Coffee".to_string(),
            amount: Decimal::from_str("3.5").unwrap(),
            category_id: 2,
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["description"], "Coffee");
        assert_eq!(json["categoryId"], 2);
        assert_eq!(json["amount"], 3.5);
    }

    #[test]
    fn decodes_wrapped_totals() {
        let json = r#"{"total": [{"year": 2025, "month": 5, "totalAmount": 42.0}]}"#;
        let totals: TotalsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(totals.total.len(), 1);
        assert_eq!(totals.total[0].month, 5);
    }

    #[test]
    fn login_response_accepts_username_alias() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"token": "abc", "username": "minh"}"#).unwrap();
        assert_eq!(parsed.name, "minh");

        let parsed: LoginResponse = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert!(parsed.name.is_empty());
    }
}
