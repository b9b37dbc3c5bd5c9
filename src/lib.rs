pub mod api;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ExpenseApi, NewExpense};
pub use models::category::Category;
pub use models::expense::{Expense, MonthlyStat};
pub use store::session::{AuthToken, Session, SessionStore};
pub use ui::app::App;
