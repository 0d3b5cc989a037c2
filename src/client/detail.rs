use std::sync::Arc;

use tracing::{error, event, Level};

use super::{
    api::{ClientError, InventoryApi, ProductFormData},
    fetch::{FetchState, Phase},
    modal::Modal,
    Navigation,
};
use crate::domain::Product;

/// Takes the product identifier from the last segment of a route path.
/// A path with a single segment (the listing itself) has no identifier.
pub fn product_id_from_path(path: &str) -> Option<&str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_, .., last] => Some(*last),
        _ => None,
    }
}

/// Single product page with its own edit and delete modals.
pub struct ProductDetailPage {
    api: Arc<dyn InventoryApi>,
    product_id: Option<String>,
    product: FetchState<Product>,
    modal: Modal<ProductFormData>,
}

impl ProductDetailPage {
    pub fn from_path(api: Arc<dyn InventoryApi>, path: &str) -> Self {
        ProductDetailPage {
            api,
            product_id: product_id_from_path(path).map(str::to_string),
            product: FetchState::new(),
            modal: Modal::Closed,
        }
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    pub async fn load(&mut self) {
        let ticket = self.product.begin();
        let result = match &self.product_id {
            Some(product_id) => self.api.get_product(product_id.clone()).await,
            None => Err(ClientError::NotFound),
        };
        self.product.resolve(ticket, result);
    }

    pub fn phase(&self) -> Phase<'_, Product> {
        self.product.phase()
    }

    pub fn modal(&self) -> &Modal<ProductFormData> {
        &self.modal
    }

    pub fn form_mut(&mut self) -> Option<&mut ProductFormData> {
        self.modal.form_mut()
    }

    /// Opens the edit form seeded from the loaded product; a missing rating
    /// starts at zero.
    pub fn open_edit(&mut self) -> bool {
        let (Some(product_id), Some(product)) = (&self.product_id, self.product.data()) else {
            return false;
        };

        self.modal = Modal::Edit {
            id: product_id.clone(),
            form: ProductFormData::from(product),
        };
        true
    }

    pub fn open_delete(&mut self) -> bool {
        let (Some(product_id), Some(product)) = (&self.product_id, self.product.data()) else {
            return false;
        };

        self.modal = Modal::Delete {
            id: product_id.clone(),
            display_name: product.name.clone(),
        };
        true
    }

    pub fn cancel(&mut self) {
        self.modal.close();
    }

    /// Confirms the open modal. A successful edit re-fetches the product; a
    /// successful delete returns the navigation back to the product list.
    pub async fn confirm(&mut self) -> Result<Option<Navigation>, ClientError> {
        let result = match &self.modal {
            Modal::Closed | Modal::Create(_) => return Ok(None),
            Modal::Edit { id, form } => self
                .api
                .update_product(id.clone(), form.clone())
                .await
                .map(|_| None),
            Modal::Delete { id, .. } => self
                .api
                .delete_product(id.clone())
                .await
                .map(|_| Some(Navigation::Products)),
        };

        match result {
            Ok(navigation) => {
                event!(Level::INFO, "product {} succeeded", self.modal.operation());
                if navigation.is_none() {
                    self.load().await;
                }
                self.modal.close();
                Ok(navigation)
            }
            Err(e) => {
                error!("Error during product {}: {}", self.modal.operation(), e);
                Err(e)
            }
        }
    }
}
