use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{event, Level};

#[cfg(test)]
use mockall::automock;

use crate::{
    domain::{Product, User},
    dtos::{MessageResponse, ProductMutationResponse},
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid API base url {0}")]
    InvalidBaseUrl(String),

    #[error("record not found")]
    NotFound,

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Form fields for creating or editing a product.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormData {
    pub name: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub rating: f64,
}

impl From<&Product> for ProductFormData {
    fn from(product: &Product) -> Self {
        ProductFormData {
            name: product.name.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            rating: product.rating.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct UserFormData {
    pub name: String,
    pub email: String,
}

impl From<&User> for UserFormData {
    fn from(user: &User) -> Self {
        UserFormData {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Typed queries and mutations against the inventory REST API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn get_products(&self, search: Option<String>) -> Result<Vec<Product>, ClientError>;
    async fn get_product(&self, product_id: String) -> Result<Product, ClientError>;
    async fn create_product(&self, product: ProductFormData) -> Result<Product, ClientError>;
    async fn update_product(
        &self,
        product_id: String,
        product: ProductFormData,
    ) -> Result<Product, ClientError>;
    async fn delete_product(&self, product_id: String) -> Result<(), ClientError>;

    async fn get_users(&self) -> Result<Vec<User>, ClientError>;
    async fn create_user(&self, user: User) -> Result<User, ClientError>;
    async fn update_user(&self, user_id: String, user: UserFormData) -> Result<User, ClientError>;
    async fn delete_user(&self, user_id: String) -> Result<(), ClientError>;
}

pub struct HttpInventoryApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpInventoryApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(HttpInventoryApi {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`: the base url always has a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    if !status.is_success() {
        let message = response
            .json::<MessageResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_default();
        event!(Level::WARN, "API call failed with {}: {}", status, message);
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn get_products(&self, search: Option<String>) -> Result<Vec<Product>, ClientError> {
        let mut request = self.client.get(self.endpoint(&["products"]));
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }

        decode(request.send().await?).await
    }

    async fn get_product(&self, product_id: String) -> Result<Product, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["products", &product_id]))
            .send()
            .await?;

        decode(response).await
    }

    async fn create_product(&self, product: ProductFormData) -> Result<Product, ClientError> {
        let response = self
            .client
            .post(self.endpoint(&["products"]))
            .json(&product)
            .send()
            .await?;

        decode(response).await
    }

    async fn update_product(
        &self,
        product_id: String,
        product: ProductFormData,
    ) -> Result<Product, ClientError> {
        let response = self
            .client
            .put(self.endpoint(&["products", &product_id]))
            .json(&product)
            .send()
            .await?;

        decode::<ProductMutationResponse>(response)
            .await
            .map(|body| body.product)
    }

    async fn delete_product(&self, product_id: String) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.endpoint(&["products", &product_id]))
            .send()
            .await?;

        decode::<ProductMutationResponse>(response).await.map(drop)
    }

    async fn get_users(&self) -> Result<Vec<User>, ClientError> {
        decode(self.client.get(self.endpoint(&["users"])).send().await?).await
    }

    async fn create_user(&self, user: User) -> Result<User, ClientError> {
        let response = self
            .client
            .post(self.endpoint(&["users"]))
            .json(&user)
            .send()
            .await?;

        decode(response).await
    }

    async fn update_user(&self, user_id: String, user: UserFormData) -> Result<User, ClientError> {
        let response = self
            .client
            .put(self.endpoint(&["users", &user_id]))
            .json(&user)
            .send()
            .await?;

        decode(response).await
    }

    async fn delete_user(&self, user_id: String) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.endpoint(&["users", &user_id]))
            .send()
            .await?;

        decode::<MessageResponse>(response).await.map(drop)
    }
}
