use chrono::NaiveDateTime;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::ListItem,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::utils::filter::SearchRecord;

/// An expense as transferred from the backend.
///
/// The timestamp arrives as `createAt` (backend spelling) without a zone,
/// so it stays a `NaiveDateTime`. The category id is absent from some list
/// payloads and defaults to zero there.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub category_name: String,
    #[serde(rename = "createAt")]
    pub created_at: NaiveDateTime,
}

impl Expense {
    pub fn to_list_item(&self) -> ListItem {
        let amount_style = if self.amount < Decimal::ZERO {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        ListItem::new(Line::from(vec![
            Span::raw(format!("{:>5}  ", self.id)),
            Span::raw(format!("{:<10} ", self.created_at.format("%Y-%m-%d"))),
            Span::styled(format!("{:>12} ", self.amount), amount_style),
            Span::raw(format!("{:<30} ", self.description)),
            Span::raw(self.category_name.clone()),
        ]))
    }
}

impl SearchRecord for Expense {
    fn search_text(&self) -> &str {
        &self.description
    }

    fn search_id(&self) -> i64 {
        self.id
    }
}

/// One month's spending total, aggregated server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub total_amount: Decimal,
}

impl MonthlyStat {
    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(Line::from(vec![
            Span::raw(format!("{:>4}-{:02}  ", self.year, self.month)),
            Span::styled(
                format!("{:>12}", self.total_amount),
                Style::default().fg(Color::Green),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decodes_backend_shape() {
        let json = r#"{
            "id": 12,
            "description": "Morning coffee",
            "amount": 3.5,
            "categoryId": 2,
            "categoryName": "Dining",
            "createAt": "2025-06-01T08:30:00"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.id, 12);
        assert_eq!(expense.amount, Decimal::from_str("3.5").unwrap());
        assert_eq!(expense.category_id, 2);
        assert_eq!(expense.created_at.format("%Y-%m-%d").to_string(), "2025-06-01");
    }

    #[test]
    fn category_id_defaults_when_missing() {
        let json = r#"{
            "id": 1,
            "description": "Bus ticket",
            "amount": 2,
            "categoryName": "Transport",
            "createAt": "2025-06-02T00:00:00"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.category_id, 0);
    }

    #[test]
    fn decodes_monthly_stats() {
        let json = r#"{"year": 2025, "month": 6, "totalAmount": 120.75}"#;
        let stat: MonthlyStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.year, 2025);
        assert_eq!(stat.month, 6);
        assert_eq!(stat.total_amount, Decimal::from_str("120.75").unwrap());
    }
}
