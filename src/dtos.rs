use serde::{Deserialize, Serialize};

use crate::domain::Product;

#[derive(Debug, Deserialize, Serialize)]
pub struct ProductMutationResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub const PRODUCT_UPDATED: &str = "Product updated successfully";
pub const PRODUCT_DELETED: &str = "Product deleted successfully";
pub const USER_DELETED: &str = "User deleted successfully";
