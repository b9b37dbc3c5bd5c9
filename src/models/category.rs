use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};
use serde::Deserialize;

use crate::utils::filter::SearchRecord;

/// A spending category as returned by the backend. The server assigns the
/// id and the owning user; the client never computes either.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub user_id: i64,
}

impl Category {
    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(Line::from(vec![
            Span::raw(format!("{:>5}  ", self.id)),
            Span::styled(
                self.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
    }
}

impl SearchRecord for Category {
    fn search_text(&self) -> &str {
        &self.name
    }

    fn search_id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_shape() {
        let json = r#"{"id": 7, "name": "Groceries", "userId": 3}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, 7);
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.user_id, 3);
    }
}
