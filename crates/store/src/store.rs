use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, ReportId, UserId};
use domain::{
    Category, CategoryChanges, NewCategory, NewProduct, NewReport, Order, OrderDraft, OrderState,
    Product, ProductChanges, Report, ReportChanges, StateChange, User, UserChanges, UserRecord,
};

use crate::{Result, StoreError};

/// Store-side filter for listing orders.
///
/// Free-text search joins users and is done by the query layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders placed for this user.
    pub user_id: Option<UserId>,
    /// Only orders currently in this state.
    pub state: Option<OrderState>,
}

impl OrderFilter {
    /// Creates a filter that matches every order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn in_state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }

    /// Returns true if the order satisfies every set criterion.
    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.is_none_or(|id| order.user_id() == id)
            && self.state.is_none_or(|state| order.state() == state)
    }
}

/// Categories, products and the stock ledger.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, input: NewCategory) -> Result<Category>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Lists every category ordered by id.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Replaces the editable fields of a category.
    ///
    /// Deactivating fails with `CategoryInUse` while active products reference it.
    async fn update_category(&self, id: CategoryId, changes: CategoryChanges) -> Result<Category>;

    /// Soft-deletes a category, with the same guard as [`Self::update_category`].
    async fn deactivate_category(&self, id: CategoryId) -> Result<Category>;

    /// Inserts a product under an existing active category.
    async fn insert_product(&self, input: NewProduct) -> Result<Product>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists every product ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Replaces the editable fields of a product.
    ///
    /// An active product must stay under an existing active category.
    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Product>;

    /// Soft-deletes a product.
    async fn deactivate_product(&self, id: ProductId) -> Result<Product>;

    /// Atomically takes `quantity` units from an active product.
    ///
    /// Untracked products (`stock == None`) are left untouched. Concurrent
    /// reservations never drive tracked stock below zero.
    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()>;

    /// Atomically gives `quantity` units back to a product if its stock is tracked.
    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()>;
}

/// Extension trait providing convenience methods for catalog stores.
#[async_trait]
pub trait CatalogStoreExt: CatalogStore {
    /// Loads a product, failing if it is missing or inactive.
    async fn find_active_product(&self, id: ProductId) -> Result<Product> {
        let product = self
            .get_product(id)
            .await?
            .ok_or_else(|| StoreError::product_not_found(id))?;
        if !product.active {
            return Err(StoreError::ProductInactive(id));
        }
        Ok(product)
    }
}

// Blanket implementation for all CatalogStore implementations
impl<T: CatalogStore + ?Sized> CatalogStoreExt for T {}

/// Orders and their line items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reserves stock for every line of the draft and inserts the order.
    ///
    /// Either everything is persisted or nothing is: a failed reservation or
    /// a failed insert leaves every product's stock as it was.
    async fn place_order(&self, draft: OrderDraft) -> Result<Order>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists matching orders ordered by id.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Applies a state change computed by the order state machine.
    ///
    /// Fails with `ConcurrencyConflict` if the persisted state is no longer
    /// `change.from`. Stock releases are applied in the same unit as the
    /// state update.
    async fn apply_state_change(&self, change: &StateChange) -> Result<Order>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Emails are unique regardless of case.
    async fn insert_user(&self, record: UserRecord) -> Result<User>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Lists every user ordered by id.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Replaces the editable fields of a user. The email never changes.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User>;

    /// Soft-deletes a user.
    async fn deactivate_user(&self, id: UserId) -> Result<User>;
}

/// Customer reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts an active report.
    async fn insert_report(&self, input: NewReport) -> Result<Report>;

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>>;

    /// Lists every report, inactive ones included, ordered by id.
    async fn list_reports(&self) -> Result<Vec<Report>>;

    /// Replaces the editable fields of a report.
    async fn update_report(&self, id: ReportId, changes: ReportChanges) -> Result<Report>;

    /// Soft-deletes a report.
    async fn deactivate_report(&self, id: ReportId) -> Result<Report>;
}

/// Everything the services need from persistence.
pub trait Store: CatalogStore + OrderStore + UserStore + ReportStore {}

impl<T: CatalogStore + OrderStore + UserStore + ReportStore + ?Sized> Store for T {}
