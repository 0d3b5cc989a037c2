use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::{
    cqrs::{
        CommandHandler, CreateProductCommand, CreateUserCommand, DeleteProductCommand,
        DeleteUserCommand, GetProductByIdQuery, GetProductsQuery, GetUsersQuery, QueryHandler,
        UpdateProductCommand, UpdateUserCommand,
    },
    domain::{ProductChanges, UserChanges},
    dtos::{MessageResponse, ProductMutationResponse, PRODUCT_DELETED, PRODUCT_UPDATED, USER_DELETED},
    error::ApiError,
    metrics::{MutationKind, Resource},
    state::AppState,
};

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

/// Routes for every resource plus the security headers applied to each response.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(render_metrics))
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/{product_id}",
            get(get_product_by_id)
                .put(update_product)
                .delete(delete_product),
        )
        .route("/users", get(get_users).post(create_user))
        .route("/users/{user_id}", put(update_user).delete(delete_user))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("cross-origin-resource-policy"),
                    HeaderValue::from_static("cross-origin"),
                )),
        )
}

pub async fn index() -> &'static str {
    "Inventory service is running"
}

pub async fn render_metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

pub async fn get_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetProductsQuery>,
) -> ApiResult {
    match state.product_query_handler.handle(&query).await {
        Ok(products) => Ok((StatusCode::OK, Json(json!(products)))),
        Err(_) => Err(ApiError::Internal("Error retrieving products")),
    }
}

pub async fn get_product_by_id(
    Path(product_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let input = GetProductByIdQuery { product_id };

    match state.product_query_handler.handle(&input).await {
        Ok(Some(product)) => Ok((StatusCode::OK, Json(json!(product)))),
        Ok(None) => Err(ApiError::NotFound("Product not found")),
        Err(_) => Err(ApiError::Internal("Error retrieving product")),
    }
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(create_product_command): Json<CreateProductCommand>,
) -> ApiResult {
    let result = state
        .product_command_handler
        .handle(&create_product_command)
        .await;
    state
        .metrics
        .record_mutation(Resource::Product, MutationKind::Create, result.is_ok());

    match result {
        Ok(product) => Ok((StatusCode::CREATED, Json(json!(product)))),
        Err(_) => Err(ApiError::Internal("Error creating product")),
    }
}

pub async fn update_product(
    Path(product_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(changes): Json<ProductChanges>,
) -> ApiResult {
    let input = UpdateProductCommand {
        product_id,
        changes,
    };
    let result = state.product_command_handler.handle(&input).await;
    state
        .metrics
        .record_mutation(Resource::Product, MutationKind::Update, result.is_ok());

    match result {
        Ok(product) => Ok((
            StatusCode::OK,
            Json(json!(ProductMutationResponse {
                message: PRODUCT_UPDATED.to_string(),
                product,
            })),
        )),
        Err(_) => Err(ApiError::Internal("Error updating product")),
    }
}

pub async fn delete_product(
    Path(product_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let input = DeleteProductCommand { product_id };
    let result = state.product_command_handler.handle(&input).await;
    state
        .metrics
        .record_mutation(Resource::Product, MutationKind::Delete, result.is_ok());

    match result {
        Ok(product) => Ok((
            StatusCode::OK,
            Json(json!(ProductMutationResponse {
                message: PRODUCT_DELETED.to_string(),
                product,
            })),
        )),
        Err(_) => Err(ApiError::Internal("Error deleting product")),
    }
}

pub async fn get_users(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.user_query_handler.handle(&GetUsersQuery).await {
        Ok(users) => Ok((StatusCode::OK, Json(json!(users)))),
        Err(_) => Err(ApiError::Internal("Error retrieving users")),
    }
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(create_user_command): Json<CreateUserCommand>,
) -> ApiResult {
    let result = state.user_command_handler.handle(&create_user_command).await;
    state
        .metrics
        .record_mutation(Resource::User, MutationKind::Create, result.is_ok());

    match result {
        Ok(user) => Ok((StatusCode::CREATED, Json(json!(user)))),
        Err(_) => Err(ApiError::Internal("Error creating user")),
    }
}

pub async fn update_user(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(changes): Json<UserChanges>,
) -> ApiResult {
    let input = UpdateUserCommand { user_id, changes };
    let result = state.user_command_handler.handle(&input).await;
    state
        .metrics
        .record_mutation(Resource::User, MutationKind::Update, result.is_ok());

    match result {
        Ok(user) => Ok((StatusCode::OK, Json(json!(user)))),
        Err(_) => Err(ApiError::Internal("Error updating user")),
    }
}

pub async fn delete_user(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let input = DeleteUserCommand { user_id };
    let result = state.user_command_handler.handle(&input).await;
    state
        .metrics
        .record_mutation(Resource::User, MutationKind::Delete, result.is_ok());

    match result {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!(MessageResponse {
                message: USER_DELETED.to_string(),
            })),
        )),
        Err(_) => Err(ApiError::Internal("Error deleting user")),
    }
}
