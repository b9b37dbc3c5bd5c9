/// A record that can be matched against a live search string.
///
/// Every list screen exposes one textual field and the record id; the
/// search box matches either.
pub trait SearchRecord {
    fn search_text(&self) -> &str;
    fn search_id(&self) -> i64;
}

/// Derives the visible subset of `items` for the current search string.
///
/// Returns indices into `items` in their original order. An empty or
/// whitespace-only query keeps everything visible; otherwise a record
/// matches when its text contains the query case-insensitively, or when
/// the decimal form of its id contains the query.
pub fn filter_indices<T: SearchRecord>(items: &[T], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return (0..items.len()).collect();
    }

    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.search_text().to_lowercase().contains(&query)
                || item.search_id().to_string().contains(&query)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        id: i64,
        text: &'static str,
    }

    impl SearchRecord for Item {
        fn search_text(&self) -> &str {
            self.text
        }

        fn search_id(&self) -> i64 {
            self.id
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            Item { id: 1, text: "Bus ticket" },
            Item { id: 2, text: "Coffee" },
            Item { id: 3, text: "Taxi" },
        ]
    }

    #[test]
    fn empty_query_keeps_everything() {
        let items = sample();
        assert_eq!(filter_indices(&items, ""), vec![0, 1, 2]);
        assert_eq!(filter_indices(&items, "   "), vec![0, 1, 2]);
    }

    #[test]
    fn matches_text_case_insensitively() {
        let items = sample();
        assert_eq!(filter_indices(&items, "co"), vec![1]);
        assert_eq!(filter_indices(&items, "COFFEE"), vec![1]);
    }

    #[test]
    fn matches_id_substring() {
        let items = sample();
        assert_eq!(filter_indices(&items, "1"), vec![0]);

        let items = vec![Item { id: 123, text: "Groceries" }];
        assert_eq!(filter_indices(&items, "12"), vec![0]);
    }

    #[test]
    fn preserves_order_without_duplicates() {
        let items = vec![
            Item { id: 10, text: "coffee beans" },
            Item { id: 11, text: "tea" },
            Item { id: 12, text: "coffee filter" },
        ];
        let visible = filter_indices(&items, "coffee");
        assert_eq!(visible, vec![0, 2]);

        // Always a subsequence of the input, whatever the query.
        for query in ["", "e", "1", "zzz"] {
            let visible = filter_indices(&items, query);
            assert!(visible.windows(2).all(|w| w[0] < w[1]));
            assert!(visible.iter().all(|&i| i < items.len()));
        }
    }

    #[test]
    fn rederiving_is_idempotent() {
        let items = sample();
        assert_eq!(filter_indices(&items, "ti"), filter_indices(&items, "ti"));
    }

    #[test]
    fn no_match_yields_empty() {
        let items = sample();
        assert!(filter_indices(&items, "laundry").is_empty());
    }
}
