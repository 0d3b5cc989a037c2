use std::sync::Arc;

use tokio::time::Instant;

use super::{
    api::InventoryApi,
    fetch::FetchState,
    global::GlobalState,
    search::{Key, SearchWidget, SuggestionPanel},
    Navigation,
};
use crate::domain::Product;

/// Top bar: product search with suggestions plus the sidebar and theme toggles.
pub struct Navbar {
    api: Arc<dyn InventoryApi>,
    products: FetchState<Vec<Product>>,
    search: SearchWidget,
}

impl Navbar {
    pub fn new(api: Arc<dyn InventoryApi>, search: SearchWidget) -> Self {
        Navbar {
            api,
            products: FetchState::new(),
            search,
        }
    }

    pub async fn load_products(&mut self) {
        let ticket = self.products.begin();
        let result = self.api.get_products(None).await;
        self.products.resolve(ticket, result);
    }

    pub fn search(&self) -> &SearchWidget {
        &self.search
    }

    pub fn on_input(&mut self, value: impl Into<String>, now: Instant) {
        self.search.set_query(value, now);
    }

    /// Drives the debounce timer; call when [`SearchWidget::next_deadline`] passes.
    pub fn tick(&mut self, now: Instant) -> bool {
        let products = self.products.data().map(Vec::as_slice).unwrap_or_default();
        self.search.poll(now, products)
    }

    pub fn on_key(&mut self, key: Key) -> Option<Navigation> {
        self.search.on_key(key)
    }

    pub fn panel(&self) -> SuggestionPanel<'_> {
        self.search.panel(self.products.is_loading())
    }

    pub fn toggle_sidebar(&self, global: &mut GlobalState) {
        global.set_sidebar_collapsed(!global.is_sidebar_collapsed);
    }

    pub fn toggle_dark_mode(&self, global: &mut GlobalState) {
        global.set_dark_mode(!global.is_dark_mode);
    }
}
