//! Selection Handler
//!
//! Manages selection lists and pagination when a search surfaces several
//! plausible hits. Handles user selection via voice or typed commands.

use crate::router::SearchHit;
use tracing::{debug, info};

/// Number of items shown per page
const ITEMS_PER_PAGE: usize = 5;

/// Result of a selection command
#[derive(Debug, Clone)]
pub enum SelectionResult {
    /// User selected an item
    Selected(SearchHit, usize),
    /// User wants next page
    NextPage,
    /// User wants previous page
    PreviousPage,
    /// User cancelled selection
    Cancelled,
    /// Need to repeat the options (no action yet)
    RepeatOptions,
    /// Input not recognized
    NotRecognized,
}

/// State of the selection handler
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    /// No active selection
    Inactive,
    /// Waiting for user to select
    Active,
}

/// Handles selection lists, pagination, and user selection commands.
#[derive(Debug)]
pub struct SelectionHandler {
    /// Items to select from
    items: Vec<SearchHit>,
    /// Current page (0-indexed)
    page: usize,
    /// Current state
    state: SelectionState,
}

impl Default for SelectionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionHandler {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            state: SelectionState::Inactive,
        }
    }

    /// Set items for selection and activate
    pub fn set_items(&mut self, items: Vec<SearchHit>) {
        info!("📋 Selection started: {} items", items.len());
        self.items = items;
        self.page = 0;
        self.state = SelectionState::Active;
    }

    /// Check if selection is active
    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Active
    }

    /// Get the items
    pub fn items(&self) -> &[SearchHit] {
        &self.items
    }

    /// Get current page
    pub fn page(&self) -> usize {
        self.page
    }

    /// Total pages
    pub fn total_pages(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.items.len() - 1) / ITEMS_PER_PAGE + 1
        }
    }

    /// Get items for current page
    pub fn current_page_items(&self) -> &[SearchHit] {
        let start = self.page * ITEMS_PER_PAGE;
        let end = std::cmp::min(start + ITEMS_PER_PAGE, self.items.len());
        &self.items[start..end]
    }

    /// Build the message listing the current page
    pub fn options_text(&self) -> String {
        if self.items.is_empty() {
            return "No items to select from.".to_string();
        }

        let start_idx = self.page * ITEMS_PER_PAGE;
        let current_items = self.current_page_items();

        let mut listed: Vec<String> = Vec::new();
        for (i, item) in current_items.iter().enumerate() {
            listed.push(format!("{}. {}", start_idx + i + 1, item.display));
        }

        let mut msg = format!("Found {} matches. ", self.items.len());

        if self.total_pages() > 1 {
            msg = format!("Page {}. ", self.page + 1) + &msg;
        }

        msg += &listed.join(", ");

        let end_idx = start_idx + current_items.len();
        if end_idx < self.items.len() {
            msg += ". Say 'next' for more.";
        }

        msg
    }

    /// Handle a selection command
    ///
    /// Returns the result of processing the command
    pub fn handle_command(&mut self, text: &str) -> SelectionResult {
        if !self.is_active() {
            return SelectionResult::NotRecognized;
        }

        let text = text.to_lowercase();
        let text = text.trim();

        // Pagination commands
        if text.contains("next") || text.contains("more") {
            let max_page = self.total_pages().saturating_sub(1);
            if self.page < max_page {
                self.page += 1;
                debug!("Selection: next page -> {}", self.page + 1);
                return SelectionResult::NextPage;
            }
            return SelectionResult::RepeatOptions; // Already on last page
        }

        if text.contains("previous") || text.contains("back") {
            if self.page > 0 {
                self.page -= 1;
                debug!("Selection: previous page -> {}", self.page + 1);
                return SelectionResult::PreviousPage;
            }
            return SelectionResult::RepeatOptions; // Already on first page
        }

        if text.contains("cancel")
            || text.contains("stop")
            || text.contains("quit")
            || text.contains("exit")
        {
            debug!("Selection: cancelled");
            self.clear();
            return SelectionResult::Cancelled;
        }

        // Strip common prefixes
        let mut clean_text = text.to_string();
        for prefix in &[
            "number ",
            "option ",
            "choice ",
            "pick ",
            "select ",
            "show ",
        ] {
            if clean_text.starts_with(prefix) {
                clean_text = clean_text[prefix.len()..].to_string();
                break;
            }
        }

        // Try to parse a number
        if let Some(selection_index) = parse_number(&clean_text) {
            // Adjust for 0-based index (user says "1", we want index 0)
            let idx = selection_index.saturating_sub(1);

            if idx < self.items.len() {
                let selected = self.items[idx].clone();
                info!("📌 Selected: {} (index {})", selected.display, idx);
                self.clear();
                return SelectionResult::Selected(selected, idx);
            }
        }

        SelectionResult::NotRecognized
    }

    /// Clear selection state
    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 0;
        self.state = SelectionState::Inactive;
    }
}

/// Parse a number from text (1-99)
fn parse_number(text: &str) -> Option<usize> {
    let text = text.trim().to_lowercase();

    // Try direct digit parse
    if let Ok(n) = text.parse::<usize>() {
        if (1..=99).contains(&n) {
            return Some(n);
        }
    }

    // Word mappings
    let word_map = [
        ("one", 1),
        ("two", 2),
        ("three", 3),
        ("four", 4),
        ("five", 5),
        ("six", 6),
        ("seven", 7),
        ("eight", 8),
        ("nine", 9),
        ("ten", 10),
        ("eleven", 11),
        ("twelve", 12),
        ("thirteen", 13),
        ("fourteen", 14),
        ("fifteen", 15),
        ("first", 1),
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
        ("fifth", 5),
    ];

    for (word, num) in word_map {
        if text == word || text.starts_with(&format!("{} ", word)) {
            return Some(num);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::HitKind;

    fn make_hit(display: &str, value: &str) -> SearchHit {
        SearchHit {
            display: display.to_string(),
            value: value.to_string(),
            kind: HitKind::Location,
            score: 0.9,
        }
    }

    #[test]
    fn test_selection_flow() {
        let mut handler = SelectionHandler::new();
        assert!(!handler.is_active());

        let items = vec![
            make_hit("Balme Library (library)", "Balme Library"),
            make_hit("Great Hall (hall)", "Great Hall"),
            make_hit("Night Market (dining)", "Night Market"),
        ];

        handler.set_items(items);
        assert!(handler.is_active());
        assert_eq!(handler.items().len(), 3);

        // Test number selection
        let result = handler.handle_command("1");
        match result {
            SelectionResult::Selected(item, idx) => {
                assert_eq!(item.value, "Balme Library");
                assert_eq!(idx, 0);
            }
            _ => panic!("Expected Selected"),
        }

        assert!(!handler.is_active());
    }

    #[test]
    fn test_ordinal_selection() {
        let mut handler = SelectionHandler::new();
        handler.set_items(vec![
            make_hit("A", "a"),
            make_hit("B", "b"),
            make_hit("C", "c"),
        ]);

        let result = handler.handle_command("option two");
        match result {
            SelectionResult::Selected(item, idx) => {
                assert_eq!(item.value, "b");
                assert_eq!(idx, 1);
            }
            _ => panic!("Expected Selected"),
        }
    }

    #[test]
    fn test_pagination() {
        let mut handler = SelectionHandler::new();
        let items: Vec<SearchHit> = (1..=12)
            .map(|i| make_hit(&format!("Item {}", i), &format!("item{}", i)))
            .collect();

        handler.set_items(items);
        assert_eq!(handler.total_pages(), 3);
        assert_eq!(handler.current_page_items().len(), 5);

        handler.handle_command("next");
        assert_eq!(handler.page(), 1);

        handler.handle_command("previous");
        assert_eq!(handler.page(), 0);
    }

    #[test]
    fn test_cancel() {
        let mut handler = SelectionHandler::new();
        handler.set_items(vec![make_hit("Test", "test")]);
        assert!(handler.is_active());

        let result = handler.handle_command("cancel");
        assert!(matches!(result, SelectionResult::Cancelled));
        assert!(!handler.is_active());
    }

    #[test]
    fn test_out_of_range_number() {
        let mut handler = SelectionHandler::new();
        handler.set_items(vec![make_hit("Test", "test")]);

        let result = handler.handle_command("nine");
        assert!(matches!(result, SelectionResult::NotRecognized));
        assert!(handler.is_active());
    }
}
