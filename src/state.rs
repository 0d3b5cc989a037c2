use std::sync::Arc;

use crate::{
    cqrs::{ProductCommandHandler, ProductQueryHandler, UserCommandHandler, UserQueryHandler},
    metrics::MetricsService,
    repositories::RepositoryContext,
};

#[derive(Clone)]
pub struct AppState {
    pub product_command_handler: ProductCommandHandler,
    pub product_query_handler: ProductQueryHandler,
    pub user_command_handler: UserCommandHandler,
    pub user_query_handler: UserQueryHandler,
    pub metrics: Arc<dyn MetricsService>,
}

impl AppState {
    pub fn new(uow: RepositoryContext, metrics: Arc<dyn MetricsService>) -> Self {
        AppState {
            product_command_handler: ProductCommandHandler::new(uow.clone()),
            product_query_handler: ProductQueryHandler::new(uow.clone()),
            user_command_handler: UserCommandHandler::new(uow.clone()),
            user_query_handler: UserQueryHandler::new(uow),
            metrics,
        }
    }
}
