//! Shared application state.

use queries::QueryService;
use services::{CatalogService, OrderService, ReportService, UserService};
use store::Store;

use crate::config::Config;

/// Services accessible from all handlers, all over the same store.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub catalog: CatalogService<S>,
    pub users: UserService<S>,
    pub reports: ReportService<S>,
    pub queries: QueryService<S>,
}

impl<S: Store + Clone> AppState<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            users: UserService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            queries: QueryService::new(store, config.page_size, config.low_stock_threshold),
        }
    }
}
