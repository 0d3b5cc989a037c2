use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, to_document, Document},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{event, Level};

#[cfg(test)]
use mockall::automock;

use crate::{
    domain::{Product, ProductChanges, User, UserChanges},
    error::StoreError,
};

#[derive(Debug, Clone)]
pub struct MongoDbInitializationInfo {
    pub uri: String,
    pub database: String,
    pub products_collection: String,
    pub users_collection: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> Result<Product, StoreError>;
    async fn read(&self, product_id: &str) -> Result<Option<Product>, StoreError>;
    /// Lists products, keeping only those whose name contains `name_filter` when given.
    async fn read_all(&self, name_filter: Option<String>) -> Result<Vec<Product>, StoreError>;
    async fn update(&self, product_id: &str, changes: ProductChanges) -> Result<Product, StoreError>;
    async fn delete(&self, product_id: &str) -> Result<Product, StoreError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, StoreError>;
    async fn read_all(&self) -> Result<Vec<User>, StoreError>;
    async fn update(&self, user_id: &str, changes: UserChanges) -> Result<User, StoreError>;
    async fn delete(&self, user_id: &str) -> Result<User, StoreError>;
}

/// The repositories shared by every command and query handler.
#[derive(Clone)]
pub struct RepositoryContext {
    pub product_repository: Arc<dyn ProductRepository>,
    pub user_repository: Arc<dyn UserRepository>,
}

impl RepositoryContext {
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        RepositoryContext {
            product_repository,
            user_repository,
        }
    }

    pub fn in_memory() -> Self {
        event!(Level::INFO, "Using in-memory repositories");
        Self::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    pub async fn mongodb(info: &MongoDbInitializationInfo) -> Result<Self, StoreError> {
        event!(Level::INFO, "Connecting to MongoDB database {}", info.database);
        let client = Client::with_uri_str(&info.uri).await?;

        let product_repository = MongoDbProductRepository::new(info, &client);
        let user_repository = MongoDbUserRepository::new(info, &client);
        product_repository
            .product_collection
            .create_index(unique_index("productId"))
            .await?;
        user_repository
            .user_collection
            .create_index(unique_index("userId"))
            .await?;

        Ok(Self::new(
            Arc::new(product_repository),
            Arc::new(user_repository),
        ))
    }
}

// duplicate inserts then fail with a duplicate-key error, same as the in-memory stores
fn unique_index(field: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1);

    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

// in-memory stores keep insertion order so listings are stable
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<Mutex<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        let mut lock = self.products.lock().await;
        if lock.iter().any(|p| p.product_id == product.product_id) {
            return Err(StoreError::Backend(format!(
                "Product with id {} already exists",
                product.product_id
            )));
        }

        lock.push(product.clone());
        Ok(product)
    }

    async fn read(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let lock = self.products.lock().await;
        Ok(lock.iter().find(|p| p.product_id == product_id).cloned())
    }

    async fn read_all(&self, name_filter: Option<String>) -> Result<Vec<Product>, StoreError> {
        let lock = self.products.lock().await;
        let products = lock
            .iter()
            .filter(|p| match &name_filter {
                Some(filter) => p.name.contains(filter.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        Ok(products)
    }

    async fn update(&self, product_id: &str, changes: ProductChanges) -> Result<Product, StoreError> {
        let mut lock = self.products.lock().await;
        match lock.iter_mut().find(|p| p.product_id == product_id) {
            Some(product) => {
                changes.apply_to(product);
                Ok(product.clone())
            }
            None => Err(StoreError::NotFound {
                entity: "Product",
                id: product_id.to_string(),
            }),
        }
    }

    async fn delete(&self, product_id: &str) -> Result<Product, StoreError> {
        let mut lock = self.products.lock().await;
        match lock.iter().position(|p| p.product_id == product_id) {
            Some(index) => Ok(lock.remove(index)),
            None => Err(StoreError::NotFound {
                entity: "Product",
                id: product_id.to_string(),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut lock = self.users.lock().await;
        if lock.iter().any(|u| u.user_id == user.user_id) {
            return Err(StoreError::Backend(format!(
                "User with id {} already exists",
                user.user_id
            )));
        }

        lock.push(user.clone());
        Ok(user)
    }

    async fn read_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().await.clone())
    }

    async fn update(&self, user_id: &str, changes: UserChanges) -> Result<User, StoreError> {
        let mut lock = self.users.lock().await;
        match lock.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                changes.apply_to(user);
                Ok(user.clone())
            }
            None => Err(StoreError::NotFound {
                entity: "User",
                id: user_id.to_string(),
            }),
        }
    }

    async fn delete(&self, user_id: &str) -> Result<User, StoreError> {
        let mut lock = self.users.lock().await;
        match lock.iter().position(|u| u.user_id == user_id) {
            Some(index) => Ok(lock.remove(index)),
            None => Err(StoreError::NotFound {
                entity: "User",
                id: user_id.to_string(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct MongoDbProductRepository {
    product_collection: Collection<Product>,
}

impl MongoDbProductRepository {
    pub fn new(info: &MongoDbInitializationInfo, client: &Client) -> Self {
        MongoDbProductRepository {
            product_collection: client
                .database(&info.database)
                .collection(&info.products_collection),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoDbProductRepository {
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        self.product_collection.insert_one(&product).await?;

        match self.read(&product.product_id).await? {
            Some(p) => Ok(p),
            None => Err(StoreError::Backend(format!(
                "Failed to find product with id {} after insert",
                product.product_id
            ))),
        }
    }

    async fn read(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .product_collection
            .find_one(doc! {"productId": product_id})
            .await?)
    }

    async fn read_all(&self, name_filter: Option<String>) -> Result<Vec<Product>, StoreError> {
        let filter = match name_filter {
            Some(name) => doc! {"name": {"$regex": escape_regex(&name)}},
            None => doc! {},
        };

        let mut products_to_return = Vec::new();
        let mut found_products = self.product_collection.find(filter).await?;
        while let Some(product) = found_products.try_next().await? {
            products_to_return.push(product);
        }

        Ok(products_to_return)
    }

    async fn update(&self, product_id: &str, changes: ProductChanges) -> Result<Product, StoreError> {
        let set = changes_document(&changes)?;
        let updated = if set.is_empty() {
            self.read(product_id).await?
        } else {
            self.product_collection
                .find_one_and_update(doc! {"productId": product_id}, doc! {"$set": set})
                .return_document(ReturnDocument::After)
                .await?
        };

        updated.ok_or_else(|| StoreError::NotFound {
            entity: "Product",
            id: product_id.to_string(),
        })
    }

    async fn delete(&self, product_id: &str) -> Result<Product, StoreError> {
        self.product_collection
            .find_one_and_delete(doc! {"productId": product_id})
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "Product",
                id: product_id.to_string(),
            })
    }
}

#[derive(Clone)]
pub struct MongoDbUserRepository {
    user_collection: Collection<User>,
}

impl MongoDbUserRepository {
    pub fn new(info: &MongoDbInitializationInfo, client: &Client) -> Self {
        MongoDbUserRepository {
            user_collection: client
                .database(&info.database)
                .collection(&info.users_collection),
        }
    }
}

#[async_trait]
impl UserRepository for MongoDbUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        self.user_collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn read_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users_to_return = Vec::new();
        let mut found_users = self.user_collection.find(doc! {}).await?;
        while let Some(user) = found_users.try_next().await? {
            users_to_return.push(user);
        }

        Ok(users_to_return)
    }

    async fn update(&self, user_id: &str, changes: UserChanges) -> Result<User, StoreError> {
        let set = changes_document(&changes)?;
        let updated = if set.is_empty() {
            self.user_collection.find_one(doc! {"userId": user_id}).await?
        } else {
            self.user_collection
                .find_one_and_update(doc! {"userId": user_id}, doc! {"$set": set})
                .return_document(ReturnDocument::After)
                .await?
        };

        updated.ok_or_else(|| StoreError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        })
    }

    async fn delete(&self, user_id: &str) -> Result<User, StoreError> {
        self.user_collection
            .find_one_and_delete(doc! {"userId": user_id})
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "User",
                id: user_id.to_string(),
            })
    }
}

// absent fields are dropped so `$set` leaves them untouched
fn changes_document<T: serde::Serialize>(changes: &T) -> Result<Document, StoreError> {
    let mut document =
        to_document(changes).map_err(|e| StoreError::Backend(format!("Failed to encode changes: {}", e)))?;
    let absent: Vec<String> = document
        .iter()
        .filter(|(_, value)| matches!(value, mongodb::bson::Bson::Null))
        .map(|(key, _)| key.clone())
        .collect();
    for key in absent {
        document.remove(&key);
    }

    Ok(document)
}

/// Escapes regex metacharacters so a search term matches literally.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
