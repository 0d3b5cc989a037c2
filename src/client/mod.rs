//! Headless dashboard view-models.
//!
//! Each page owns its UI state and drives the REST API through
//! [`api::InventoryApi`]. Rendering is left to the shell that owns these
//! values; every transition happens through `&mut self`, one event at a time.

pub mod api;
pub mod assets;
pub mod detail;
pub mod fetch;
pub mod global;
pub mod list_view;
pub mod modal;
pub mod navbar;
pub mod search;

/// A route the shell should navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Products,
    Product(String),
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::Products => "/products".to_string(),
            Navigation::Product(product_id) => format!("/products/{}", product_id),
        }
    }
}
