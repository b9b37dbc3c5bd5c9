use ratatui::widgets::ListState;

use crate::utils::filter::{SearchRecord, filter_indices};

/// Lifecycle of one screen-focus fetch. `Error` is terminal for the focus
/// cycle; re-entering the screen restarts from a fresh fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// One list screen's read-through cache: the fetched items, the live search
/// string, and the visible subset derived from both.
///
/// `filtered` holds indices into `items` and is recomputed from scratch on
/// every change to either input; the source collection is never mutated by
/// filtering.
#[derive(Debug)]
pub struct ListPane<T> {
    pub items: Vec<T>,
    pub filtered: Vec<usize>,
    pub query: String,
    pub state: FetchState,
    pub list_state: ListState,
}

impl<T: SearchRecord> ListPane<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            state: FetchState::Idle,
            list_state: ListState::default(),
        }
    }

    /// Starts a focus cycle: the previous contents are discarded and a new
    /// read is in flight.
    pub fn begin_loading(&mut self) {
        self.items.clear();
        self.filtered.clear();
        self.query.clear();
        self.list_state.select(None);
        self.state = FetchState::Loading;
    }

    pub fn finish(&mut self, items: Vec<T>) {
        self.items = items;
        self.state = FetchState::Ready;
        self.refilter();
    }

    pub fn fail(&mut self, message: String) {
        self.state = FetchState::Error(message);
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.items, &self.query);
        self.list_state.select(if self.filtered.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    pub fn select_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= self.filtered.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.filtered.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected(&self) -> Option<&T> {
        self.list_state
            .selected()
            .and_then(|i| self.filtered.get(i))
            .and_then(|&idx| self.items.get(idx))
    }
}

impl<T: SearchRecord> Default for ListPane<T> {
    fn default() -> Self {
        Self::new()
    }
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

    fn loaded_pane() -> ListPane<Item> {
        let mut pane = ListPane::new();
        pane.begin_loading();
        pane.finish(vec![
            Item { id: 1, text: "Bus ticket" },
            Item { id: 2, text: "Coffee" },
            Item { id: 3, text: "Taxi" },
        ]);
        pane
    }

    #[test]
    fn starts_idle_and_empty() {
        let pane: ListPane<Item> = ListPane::new();
        assert_eq!(pane.state, FetchState::Idle);
        assert!(pane.items.is_empty());
        assert!(pane.selected().is_none());
    }

    #[test]
    fn loading_discards_previous_contents() {
        let mut pane = loaded_pane();
        pane.push_query('c');
        pane.begin_loading();

        assert_eq!(pane.state, FetchState::Loading);
        assert!(pane.items.is_empty());
        assert!(pane.query.is_empty());
        assert!(pane.selected().is_none());
    }

    #[test]
    fn finish_shows_everything_and_selects_first() {
        let pane = loaded_pane();
        assert_eq!(pane.state, FetchState::Ready);
        assert_eq!(pane.filtered, vec![0, 1, 2]);
        assert_eq!(pane.selected().map(|i| i.id), Some(1));
    }

    #[test]
    fn query_rederives_per_keystroke() {
        let mut pane = loaded_pane();
        pane.push_query('c');
        assert_eq!(pane.filtered, vec![0, 1]); // "Bus ticket", "Coffee"
        pane.push_query('o');
        assert_eq!(pane.filtered, vec![1]);
        pane.pop_query();
        assert_eq!(pane.filtered, vec![0, 1]);
    }

    #[test]
    fn selection_follows_the_filtered_view() {
        let mut pane = loaded_pane();
        pane.push_query('t');
        // "Bus ticket" and "Taxi" match.
        assert_eq!(pane.filtered, vec![0, 2]);
        pane.select_next();
        assert_eq!(pane.selected().map(|i| i.id), Some(3));
        pane.select_next();
        assert_eq!(pane.selected().map(|i| i.id), Some(1));
        pane.select_previous();
        assert_eq!(pane.selected().map(|i| i.id), Some(3));
    }

    #[test]
    fn failure_is_terminal_until_next_focus() {
        let mut pane: ListPane<Item> = ListPane::new();
        pane.begin_loading();
        pane.fail("Request failed with status 500".to_string());

        assert_eq!(
            pane.state,
            FetchState::Error("Request failed with status 500".to_string())
        );
        assert!(pane.items.is_empty());

        // The next focus restarts the cycle.
        pane.begin_loading();
        assert_eq!(pane.state, FetchState::Loading);
    }

    #[test]
    fn no_match_clears_selection() {
        let mut pane = loaded_pane();
        for c in "zzz".chars() {
            pane.push_query(c);
        }
        assert!(pane.filtered.is_empty());
        assert!(pane.selected().is_none());
    }
}
