use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::{
    domain::{Product, ProductChanges, User, UserChanges},
    error::StoreError,
    repositories::RepositoryContext,
};

// traits
pub trait Command {}
pub trait Query {}

pub trait CommandHandler<C: Command, R> {
    async fn handle(&self, input: &C) -> Result<R, StoreError>;
}

pub trait QueryHandler<Q: Query, R> {
    async fn handle(&self, input: &Q) -> Result<R, StoreError>;
}

// commands
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductCommand {
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub stock_quantity: i64,
    #[serde(default)]
    pub rating: Option<f64>,
}
impl Command for CreateProductCommand {}

#[derive(Debug)]
pub struct UpdateProductCommand {
    pub product_id: String,
    pub changes: ProductChanges,
}
impl Command for UpdateProductCommand {}

#[derive(Debug)]
pub struct DeleteProductCommand {
    pub product_id: String,
}
impl Command for DeleteProductCommand {}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub user_id: String,
    pub name: String,
    pub email: String,
}
impl Command for CreateUserCommand {}

#[derive(Debug)]
pub struct UpdateUserCommand {
    pub user_id: String,
    pub changes: UserChanges,
}
impl Command for UpdateUserCommand {}

#[derive(Debug)]
pub struct DeleteUserCommand {
    pub user_id: String,
}
impl Command for DeleteUserCommand {}

// queries
#[derive(Debug, Default, Deserialize)]
pub struct GetProductsQuery {
    pub search: Option<String>,
}
impl Query for GetProductsQuery {}

#[derive(Debug)]
pub struct GetProductByIdQuery {
    pub product_id: String,
}
impl Query for GetProductByIdQuery {}

#[derive(Debug)]
pub struct GetUsersQuery;
impl Query for GetUsersQuery {}

fn log_failure(action: &str, e: &StoreError) {
    event!(Level::ERROR, "Error occurred while {}: {}", action, e);
}

// command handlers
#[derive(Clone)]
pub struct ProductCommandHandler {
    uow: RepositoryContext,
}

impl ProductCommandHandler {
    pub fn new(uow: RepositoryContext) -> Self {
        ProductCommandHandler { uow }
    }
}

impl CommandHandler<CreateProductCommand, Product> for ProductCommandHandler {
    async fn handle(&self, input: &CreateProductCommand) -> Result<Product, StoreError> {
        let domain_product = Product {
            product_id: input
                .product_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: input.name.clone(),
            price: input.price,
            stock_quantity: input.stock_quantity,
            rating: input.rating,
        };

        match self.uow.product_repository.create(domain_product).await {
            Ok(created_product) => {
                event!(Level::INFO, "Created product {}", created_product.product_id);
                Ok(created_product)
            }
            Err(e) => {
                log_failure("creating product", &e);
                Err(e)
            }
        }
    }
}

impl CommandHandler<UpdateProductCommand, Product> for ProductCommandHandler {
    async fn handle(&self, input: &UpdateProductCommand) -> Result<Product, StoreError> {
        self.uow
            .product_repository
            .update(&input.product_id, input.changes.clone())
            .await
            .inspect_err(|e| log_failure("updating product", e))
    }
}

impl CommandHandler<DeleteProductCommand, Product> for ProductCommandHandler {
    async fn handle(&self, input: &DeleteProductCommand) -> Result<Product, StoreError> {
        self.uow
            .product_repository
            .delete(&input.product_id)
            .await
            .inspect_err(|e| log_failure("deleting product", e))
    }
}

#[derive(Clone)]
pub struct UserCommandHandler {
    uow: RepositoryContext,
}

impl UserCommandHandler {
    pub fn new(uow: RepositoryContext) -> Self {
        UserCommandHandler { uow }
    }
}

impl CommandHandler<CreateUserCommand, User> for UserCommandHandler {
    async fn handle(&self, input: &CreateUserCommand) -> Result<User, StoreError> {
        let domain_user = User {
            user_id: input.user_id.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
        };

        self.uow
            .user_repository
            .create(domain_user)
            .await
            .inspect_err(|e| log_failure("creating user", e))
    }
}

impl CommandHandler<UpdateUserCommand, User> for UserCommandHandler {
    async fn handle(&self, input: &UpdateUserCommand) -> Result<User, StoreError> {
        self.uow
            .user_repository
            .update(&input.user_id, input.changes.clone())
            .await
            .inspect_err(|e| log_failure("updating user", e))
    }
}

impl CommandHandler<DeleteUserCommand, User> for UserCommandHandler {
    async fn handle(&self, input: &DeleteUserCommand) -> Result<User, StoreError> {
        self.uow
            .user_repository
            .delete(&input.user_id)
            .await
            .inspect_err(|e| log_failure("deleting user", e))
    }
}

// query handlers
#[derive(Clone)]
pub struct ProductQueryHandler {
    uow: RepositoryContext,
}

impl ProductQueryHandler {
    pub fn new(uow: RepositoryContext) -> Self {
        ProductQueryHandler { uow }
    }
}

impl QueryHandler<GetProductsQuery, Vec<Product>> for ProductQueryHandler {
    async fn handle(&self, input: &GetProductsQuery) -> Result<Vec<Product>, StoreError> {
        // an empty search term lists everything
        let name_filter = input.search.clone().filter(|s| !s.is_empty());

        self.uow
            .product_repository
            .read_all(name_filter)
            .await
            .inspect_err(|e| log_failure("retrieving products", e))
    }
}

impl QueryHandler<GetProductByIdQuery, Option<Product>> for ProductQueryHandler {
    async fn handle(&self, input: &GetProductByIdQuery) -> Result<Option<Product>, StoreError> {
        self.uow
            .product_repository
            .read(&input.product_id)
            .await
            .inspect_err(|e| log_failure("retrieving product by id", e))
    }
}

#[derive(Clone)]
pub struct UserQueryHandler {
    uow: RepositoryContext,
}

impl UserQueryHandler {
    pub fn new(uow: RepositoryContext) -> Self {
        UserQueryHandler { uow }
    }
}

impl QueryHandler<GetUsersQuery, Vec<User>> for UserQueryHandler {
    async fn handle(&self, _: &GetUsersQuery) -> Result<Vec<User>, StoreError> {
        self.uow
            .user_repository
            .read_all()
            .await
            .inspect_err(|e| log_failure("retrieving users", e))
    }
}
