use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, event, Level};

use super::{
    api::{ClientError, InventoryApi, ProductFormData, UserFormData},
    fetch::{FetchState, Phase},
    modal::Modal,
};
use crate::domain::{Product, User};

/// An entity collection the list view can fetch and mutate.
#[async_trait]
pub trait Resource: Send + Sync {
    type Entity: Clone + Send + Sync;
    type Form: Clone + Default + Send + Sync;

    fn label(&self) -> &'static str;
    fn id_of(entity: &Self::Entity) -> &str;
    fn name_of(entity: &Self::Entity) -> &str;
    fn form_of(entity: &Self::Entity) -> Self::Form;

    async fn list(&self) -> Result<Vec<Self::Entity>, ClientError>;
    async fn create(&self, form: Self::Form) -> Result<(), ClientError>;
    async fn update(&self, id: &str, form: Self::Form) -> Result<(), ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

pub struct Products {
    api: Arc<dyn InventoryApi>,
}

impl Products {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Products { api }
    }
}

#[async_trait]
impl Resource for Products {
    type Entity = Product;
    type Form = ProductFormData;

    fn label(&self) -> &'static str {
        "product"
    }

    fn id_of(entity: &Product) -> &str {
        &entity.product_id
    }

    fn name_of(entity: &Product) -> &str {
        &entity.name
    }

    fn form_of(entity: &Product) -> ProductFormData {
        ProductFormData::from(entity)
    }

    async fn list(&self) -> Result<Vec<Product>, ClientError> {
        self.api.get_products(None).await
    }

    async fn create(&self, form: ProductFormData) -> Result<(), ClientError> {
        self.api.create_product(form).await.map(drop)
    }

    async fn update(&self, id: &str, form: ProductFormData) -> Result<(), ClientError> {
        self.api.update_product(id.to_string(), form).await.map(drop)
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.api.delete_product(id.to_string()).await
    }
}

pub struct Users {
    api: Arc<dyn InventoryApi>,
}

impl Users {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Users { api }
    }
}

#[async_trait]
impl Resource for Users {
    type Entity = User;
    type Form = UserFormData;

    fn label(&self) -> &'static str {
        "user"
    }

    fn id_of(entity: &User) -> &str {
        &entity.user_id
    }

    fn name_of(entity: &User) -> &str {
        &entity.name
    }

    fn form_of(entity: &User) -> UserFormData {
        UserFormData::from(entity)
    }

    async fn list(&self) -> Result<Vec<User>, ClientError> {
        self.api.get_users().await
    }

    // users are keyed by a client-generated id
    async fn create(&self, form: UserFormData) -> Result<(), ClientError> {
        let user = User {
            user_id: uuid::Uuid::new_v4().to_string(),
            name: form.name,
            email: form.email,
        };

        self.api.create_user(user).await.map(drop)
    }

    async fn update(&self, id: &str, form: UserFormData) -> Result<(), ClientError> {
        self.api.update_user(id.to_string(), form).await.map(drop)
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.api.delete_user(id.to_string()).await
    }
}

/// What the list page renders.
#[derive(Debug, PartialEq)]
pub enum ListPhase<'a, E> {
    Loading,
    Failed,
    Ready(Vec<&'a E>),
}

/// A fetched collection with a local display filter and create/edit/delete
/// modals. Every successful mutation is followed by a full re-fetch.
pub struct ListView<R: Resource> {
    resource: R,
    items: FetchState<Vec<R::Entity>>,
    search: String,
    modal: Modal<R::Form>,
}

pub type ProductsView = ListView<Products>;
pub type UsersView = ListView<Users>;

impl<R: Resource> ListView<R> {
    pub fn new(resource: R) -> Self {
        ListView {
            resource,
            items: FetchState::new(),
            search: String::new(),
            modal: Modal::Closed,
        }
    }

    pub async fn refresh(&mut self) {
        let ticket = self.items.begin();
        let result = self.resource.list().await;
        self.items.resolve(ticket, result);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn items(&self) -> &FetchState<Vec<R::Entity>> {
        &self.items
    }

    /// The fetched collection narrowed to names containing the search string,
    /// ignoring case.
    pub fn phase(&self) -> ListPhase<'_, R::Entity> {
        match self.items.phase() {
            Phase::Loading => ListPhase::Loading,
            Phase::Failed => ListPhase::Failed,
            Phase::Ready(items) => {
                let needle = self.search.to_lowercase();
                ListPhase::Ready(
                    items
                        .iter()
                        .filter(|item| R::name_of(item).to_lowercase().contains(&needle))
                        .collect(),
                )
            }
        }
    }

    pub fn modal(&self) -> &Modal<R::Form> {
        &self.modal
    }

    pub fn form_mut(&mut self) -> Option<&mut R::Form> {
        self.modal.form_mut()
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Create(R::Form::default());
    }

    /// Selects the row with `id` and opens the edit modal pre-populated with
    /// its values. Returns false when no such row is loaded.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(form) = self.find(id).map(R::form_of) else {
            return false;
        };

        self.modal = Modal::Edit {
            id: id.to_string(),
            form,
        };
        true
    }

    pub fn open_delete(&mut self, id: &str) -> bool {
        let Some(display_name) = self.find(id).map(|entity| R::name_of(entity).to_string()) else {
            return false;
        };

        self.modal = Modal::Delete {
            id: id.to_string(),
            display_name,
        };
        true
    }

    pub fn cancel(&mut self) {
        self.modal.close();
    }

    /// Runs the mutation for the open modal. On success the collection is
    /// re-fetched and only then is the modal closed. On failure the modal stays
    /// open with its form intact.
    pub async fn confirm(&mut self) -> Result<(), ClientError> {
        let result = match &self.modal {
            Modal::Closed => return Ok(()),
            Modal::Create(form) => self.resource.create(form.clone()).await,
            Modal::Edit { id, form } => self.resource.update(id, form.clone()).await,
            Modal::Delete { id, .. } => self.resource.delete(id).await,
        };

        match result {
            Ok(()) => {
                event!(
                    Level::INFO,
                    "{} {} succeeded",
                    self.resource.label(),
                    self.modal.operation()
                );
                self.refresh().await;
                self.modal.close();
                Ok(())
            }
            Err(e) => {
                error!(
                    "Error during {} {}: {}",
                    self.resource.label(),
                    self.modal.operation(),
                    e
                );
                Err(e)
            }
        }
    }

    fn find(&self, id: &str) -> Option<&R::Entity> {
        self.items
            .data()
            .and_then(|items| items.iter().find(|item| R::id_of(item) == id))
    }
}
