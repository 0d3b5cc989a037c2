use std::sync::Arc;

use inventory_management::{
    client::{
        api::{ClientError, HttpInventoryApi, InventoryApi, ProductFormData},
        detail::ProductDetailPage,
        fetch::Phase,
        list_view::{ListPhase, ListView, Products, Users},
        Navigation,
    },
    metrics::PrometheusMetricsService,
    repositories::RepositoryContext,
    routes::build_router,
    state::AppState,
};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let metrics = Arc::new(PrometheusMetricsService::new().unwrap());
    let app = build_router(Arc::new(AppState::new(RepositoryContext::in_memory(), metrics)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", address)
}

async fn api() -> Arc<HttpInventoryApi> {
    Arc::new(HttpInventoryApi::new(&spawn_server().await).unwrap())
}

fn form(name: &str, stock_quantity: i64) -> ProductFormData {
    ProductFormData {
        name: name.to_string(),
        price: 9.5,
        stock_quantity,
        rating: 3.0,
    }
}

#[tokio::test]
async fn http_client_speaks_the_server_contract() {
    let api = api().await;

    let created = api.create_product(form("Aloe Gel", 4)).await.unwrap();
    api.create_product(form("Sunscreen", 8)).await.unwrap();

    let filtered = api.get_products(Some("Sun".to_string())).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Sunscreen");

    let updated = api
        .update_product(created.product_id.clone(), form("Aloe Gel", 12))
        .await
        .unwrap();
    assert_eq!(updated.stock_quantity, 12);

    api.delete_product(created.product_id.clone()).await.unwrap();
    assert!(matches!(
        api.get_product(created.product_id.clone()).await,
        Err(ClientError::NotFound)
    ));
    assert!(matches!(
        api.delete_product(created.product_id).await,
        Err(ClientError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn list_view_stays_in_sync_with_server() {
    let api = api().await;
    let mut view = ListView::new(Products::new(api.clone()));
    view.refresh().await;
    assert_eq!(view.phase(), ListPhase::Ready(Vec::new()));

    view.open_create();
    if let Some(form) = view.form_mut() {
        form.name = "Night Cream".to_string();
        form.price = 30.0;
        form.stock_quantity = 7;
    }
    view.confirm().await.unwrap();

    let product_id = match view.phase() {
        ListPhase::Ready(products) => {
            assert_eq!(products.len(), 1);
            products[0].product_id.clone()
        }
        other => panic!("unexpected phase {:?}", other),
    };

    assert!(view.open_delete(&product_id));
    view.confirm().await.unwrap();
    assert_eq!(view.phase(), ListPhase::Ready(Vec::new()));
    assert!(api.get_products(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn users_view_creates_with_generated_id() {
    let api = api().await;
    let mut view = ListView::new(Users::new(api.clone()));
    view.refresh().await;

    view.open_create();
    if let Some(form) = view.form_mut() {
        form.name = "Kelly".to_string();
        form.email = "kelly@example.com".to_string();
    }
    view.confirm().await.unwrap();

    let users = api.get_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(uuid::Uuid::parse_str(&users[0].user_id).is_ok());
}

#[tokio::test]
async fn detail_page_edits_then_deletes() {
    let api = api().await;
    let created = api.create_product(form("Toner", 2)).await.unwrap();

    let mut page = ProductDetailPage::from_path(api.clone(), &format!("/products/{}", created.product_id));
    page.load().await;
    assert!(matches!(page.phase(), Phase::Ready(p) if p.name == "Toner"));

    page.open_edit();
    if let Some(form) = page.form_mut() {
        form.stock_quantity = 20;
    }
    assert_eq!(page.confirm().await.unwrap(), None);
    assert!(matches!(page.phase(), Phase::Ready(p) if p.stock_quantity == 20));

    page.open_delete();
    assert_eq!(page.confirm().await.unwrap(), Some(Navigation::Products));
    assert!(api.get_products(None).await.unwrap().is_empty());
}
