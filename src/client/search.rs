use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use super::Navigation;
use crate::domain::Product;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Other,
}

#[derive(Debug, PartialEq)]
pub enum SuggestionPanel<'a> {
    Hidden,
    Suggestions(&'a [Product]),
    NoResults,
}

/// Incremental product search over the already-fetched collection.
///
/// Matching is a case-insensitive substring test on the product name. Input is
/// debounced: every change pushes the recompute deadline out by the debounce
/// window, and matches are only recomputed by [`SearchWidget::poll`] once that
/// deadline has passed.
#[derive(Debug)]
pub struct SearchWidget {
    query: String,
    matches: Vec<Product>,
    highlighted: Option<usize>,
    deadline: Option<Instant>,
    debounce: Duration,
}

impl Default for SearchWidget {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchWidget {
    pub fn new(debounce: Duration) -> Self {
        SearchWidget {
            query: String::new(),
            matches: Vec::new(),
            highlighted: None,
            deadline: None,
            debounce,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[Product] {
        &self.matches
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records a keystroke. Clears the highlight and restarts the debounce window.
    pub fn set_query(&mut self, value: impl Into<String>, now: Instant) {
        let value = value.into();
        if value == self.query {
            return;
        }

        self.query = value;
        self.highlighted = None;
        self.deadline = Some(now + self.debounce);
    }

    /// Recomputes matches against `products` if the debounce window has elapsed.
    /// Returns whether a recompute happened.
    pub fn poll(&mut self, now: Instant, products: &[Product]) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.matches = filter_products(&self.query, products);
                if self.highlighted.is_some_and(|i| i >= self.matches.len()) {
                    self.highlighted = None;
                }
                true
            }
            _ => false,
        }
    }

    /// Waits out the pending debounce window, then recomputes.
    pub async fn settle(&mut self, products: &[Product]) -> bool {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.poll(Instant::now(), products)
            }
            None => false,
        }
    }

    /// Moves the highlight with wraparound, or navigates on Enter.
    pub fn on_key(&mut self, key: Key) -> Option<Navigation> {
        let len = self.matches.len();
        match key {
            Key::ArrowDown if len > 0 => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                });
                None
            }
            Key::ArrowUp if len > 0 => {
                self.highlighted = Some(match self.highlighted {
                    Some(i) if i > 0 => i - 1,
                    _ => len - 1,
                });
                None
            }
            Key::Enter => self
                .highlighted
                .and_then(|i| self.matches.get(i))
                .map(|product| Navigation::Product(product.product_id.clone())),
            _ => None,
        }
    }

    /// `products_loading` is true while the product collection has not been fetched yet.
    pub fn panel(&self, products_loading: bool) -> SuggestionPanel<'_> {
        if self.query.is_empty() {
            SuggestionPanel::Hidden
        } else if !self.matches.is_empty() {
            SuggestionPanel::Suggestions(&self.matches)
        } else if products_loading {
            SuggestionPanel::Hidden
        } else {
            SuggestionPanel::NoResults
        }
    }

    /// Scroll offset that centers the highlighted suggestion in a viewport of
    /// `viewport_height`, clamped to the scrollable range.
    pub fn scroll_offset(&self, item_height: f64, viewport_height: f64) -> Option<f64> {
        let index = self.highlighted?;
        if self.matches.is_empty() {
            return None;
        }

        let content_height = self.matches.len() as f64 * item_height;
        let max_offset = (content_height - viewport_height).max(0.0);
        let centered = index as f64 * item_height - (viewport_height - item_height) / 2.0;
        Some(centered.clamp(0.0, max_offset))
    }
}

/// Products whose name contains `query`, ignoring case, in collection order.
/// A blank query matches nothing; otherwise the query is matched untrimmed.
pub fn filter_products(query: &str, products: &[Product]) -> Vec<Product> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        ["Aloe Gel", "Aloe Cream", "Sunscreen"]
            .iter()
            .enumerate()
            .map(|(i, name)| Product {
                product_id: format!("p{}", i + 1),
                name: name.to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn settled(query: &str) -> SearchWidget {
        let now = Instant::now();
        let mut widget = SearchWidget::default();
        widget.set_query(query, now);
        widget.poll(now + DEFAULT_DEBOUNCE, &catalog());
        widget
    }

    #[test]
    fn matches_case_insensitively_in_listing_order() {
        let widget = settled("aloe");

        assert_eq!(names(widget.matches()), vec!["Aloe Gel", "Aloe Cream"]);
    }

    #[test]
    fn no_match_shows_no_results_once_loaded() {
        let widget = settled("zzz");

        assert!(widget.matches().is_empty());
        assert_eq!(widget.panel(false), SuggestionPanel::NoResults);
        assert_eq!(widget.panel(true), SuggestionPanel::Hidden);
    }

    #[test]
    fn empty_query_hides_panel() {
        let widget = settled("");

        assert_eq!(widget.panel(false), SuggestionPanel::Hidden);
        assert!(widget.matches().is_empty());
    }

    #[test]
    fn whitespace_query_has_no_suggestions() {
        let widget = settled("  ");

        assert!(widget.matches().is_empty());
        assert_eq!(widget.panel(false), SuggestionPanel::NoResults);
    }

    #[test]
    fn inner_spaces_are_matched_literally() {
        let widget = settled("aloe g");

        assert_eq!(names(widget.matches()), vec!["Aloe Gel"]);
    }

    #[test]
    fn recompute_waits_for_quiet_window() {
        let start = Instant::now();
        let products = catalog();
        let mut widget = SearchWidget::default();

        widget.set_query("a", start);
        widget.set_query("al", start + Duration::from_millis(200));
        assert!(!widget.poll(start + Duration::from_millis(300), &products));
        assert!(widget.matches().is_empty());

        assert!(widget.poll(start + Duration::from_millis(500), &products));
        assert_eq!(widget.matches().len(), 2);
        assert!(!widget.poll(start + Duration::from_millis(900), &products));
    }

    #[test]
    fn arrow_keys_wrap_around() {
        let mut widget = settled("e");
        assert_eq!(widget.matches().len(), 3);

        widget.on_key(Key::ArrowDown);
        assert_eq!(widget.highlighted(), Some(0));
        widget.on_key(Key::ArrowUp);
        assert_eq!(widget.highlighted(), Some(2));
        widget.on_key(Key::ArrowDown);
        assert_eq!(widget.highlighted(), Some(0));
    }

    #[test]
    fn arrow_up_from_nothing_selects_last() {
        let mut widget = settled("aloe");

        widget.on_key(Key::ArrowUp);
        assert_eq!(widget.highlighted(), Some(1));
    }

    #[test]
    fn keys_do_nothing_without_matches() {
        let mut widget = settled("zzz");

        widget.on_key(Key::ArrowDown);
        assert_eq!(widget.highlighted(), None);
        assert_eq!(widget.on_key(Key::Enter), None);
    }

    #[test]
    fn enter_navigates_to_highlighted_product() {
        let mut widget = settled("aloe");
        assert_eq!(widget.on_key(Key::Enter), None);

        widget.on_key(Key::ArrowDown);
        widget.on_key(Key::ArrowDown);

        let navigation = widget.on_key(Key::Enter);
        assert_eq!(navigation, Some(Navigation::Product("p2".to_string())));
        assert_eq!(navigation.unwrap().path(), "/products/p2");
    }

    #[test]
    fn changing_query_resets_highlight() {
        let mut widget = settled("aloe");
        widget.on_key(Key::ArrowDown);

        widget.set_query("aloe ", Instant::now());

        assert_eq!(widget.highlighted(), None);
    }

    #[test]
    fn highlighted_item_is_centered_and_clamped() {
        let products: Vec<Product> = (0..10)
            .map(|i| Product {
                product_id: format!("p{}", i),
                name: format!("Serum {}", i),
                ..Default::default()
            })
            .collect();
        let now = Instant::now();
        let mut widget = SearchWidget::default();
        widget.set_query("serum", now);
        widget.poll(now + DEFAULT_DEBOUNCE, &products);
        assert_eq!(widget.scroll_offset(40.0, 200.0), None);

        widget.on_key(Key::ArrowDown);
        assert_eq!(widget.scroll_offset(40.0, 200.0), Some(0.0));

        for _ in 0..5 {
            widget.on_key(Key::ArrowDown);
        }
        // index 5: 200 - (200 - 40) / 2
        assert_eq!(widget.scroll_offset(40.0, 200.0), Some(120.0));

        // 4, 3, 2, 1, 0, then wrap to 9 and 8
        for _ in 0..7 {
            widget.on_key(Key::ArrowUp);
        }
        assert_eq!(widget.highlighted(), Some(8));
        assert_eq!(widget.scroll_offset(40.0, 200.0), Some(200.0));
    }

    #[tokio::test]
    async fn settle_waits_for_the_deadline() {
        let mut widget = SearchWidget::new(Duration::from_millis(5));
        widget.set_query("sun", Instant::now());

        assert!(widget.settle(&catalog()).await);
        assert_eq!(names(widget.matches()), vec!["Sunscreen"]);
        assert!(!widget.settle(&catalog()).await);
    }
}
