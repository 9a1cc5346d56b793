use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{CategoryId, OrderId, ProductId, ReportId, UserId};
use domain::{
    Category, CategoryChanges, NewCategory, NewProduct, NewReport, Order, OrderDraft, Product,
    ProductChanges, Report, ReportChanges, StateChange, User, UserChanges, UserRecord,
};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CatalogStore, OrderFilter, OrderStore, ReportStore, UserStore},
};

#[derive(Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    users: BTreeMap<UserId, User>,
    reports: BTreeMap<ReportId, Report>,
    last_category_id: i64,
    last_product_id: i64,
    last_order_id: i64,
    last_user_id: i64,
    last_report_id: i64,
}

impl State {
    fn active_products_in(&self, category_id: CategoryId) -> i64 {
        self.products
            .values()
            .filter(|p| p.category_id == category_id && p.active)
            .count() as i64
    }

    fn require_active_category(&self, category_id: CategoryId) -> Result<()> {
        let category = self
            .categories
            .get(&category_id)
            .ok_or_else(|| StoreError::category_not_found(category_id))?;
        if !category.active {
            return Err(StoreError::CategoryInactive(category_id));
        }
        Ok(())
    }

    fn set_category(&mut self, id: CategoryId, changes: CategoryChanges) -> Result<Category> {
        if !changes.active {
            let active_products = self.active_products_in(id);
            if self.categories.contains_key(&id) && active_products > 0 {
                return Err(StoreError::CategoryInUse {
                    category_id: id,
                    active_products,
                });
            }
        }

        let category = self
            .categories
            .get_mut(&id)
            .ok_or_else(|| StoreError::category_not_found(id))?;
        category.name = changes.name;
        category.active = changes.active;
        Ok(category.clone())
    }
}

/// Computes the stock left after reserving `quantity` units of `product`.
fn stock_after_reservation(product: &Product, quantity: u32) -> Result<Option<u32>> {
    if !product.active {
        return Err(StoreError::ProductInactive(product.id));
    }
    match product.stock {
        None => Ok(None),
        Some(available) if available >= quantity => Ok(Some(available - quantity)),
        Some(available) => Err(StoreError::InsufficientStock {
            product_id: product.id,
            requested: quantity,
            available,
        }),
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

/// In-memory store implementation for tests and database-less runs.
///
/// All tables live behind one lock; every write operation holds it
/// exclusively, which makes compound operations atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    fail_next_write: Arc<AtomicBool>,
    pending_conflicts: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next order write (placement or state change) fail after its
    /// stock effects were staged, as a lost database connection would.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Makes the next `count` state changes fail as if another writer had
    /// changed the order first.
    pub fn conflict_next_state_changes(&self, count: usize) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn take_injected_failure(&self) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, input: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        let id = CategoryId::new(next_id(&mut state.last_category_id));
        let category = Category {
            id,
            name: input.name,
            active: true,
            created_at: Utc::now(),
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn update_category(&self, id: CategoryId, changes: CategoryChanges) -> Result<Category> {
        self.state.write().await.set_category(id, changes)
    }

    async fn deactivate_category(&self, id: CategoryId) -> Result<Category> {
        let mut state = self.state.write().await;
        let name = state
            .categories
            .get(&id)
            .map(|c| c.name.clone())
            .ok_or_else(|| StoreError::category_not_found(id))?;
        state.set_category(
            id,
            CategoryChanges {
                name,
                active: false,
            },
        )
    }

    async fn insert_product(&self, input: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        state.require_active_category(input.category_id)?;

        let id = ProductId::new(next_id(&mut state.last_product_id));
        let now = Utc::now();
        let product = Product {
            id,
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            active: true,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Product> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&id) {
            return Err(StoreError::product_not_found(id));
        }
        if changes.active {
            state.require_active_category(changes.category_id)?;
        } else if !state.categories.contains_key(&changes.category_id) {
            return Err(StoreError::category_not_found(changes.category_id));
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::product_not_found(id))?;
        product.category_id = changes.category_id;
        product.name = changes.name;
        product.description = changes.description;
        product.price = changes.price;
        product.stock = changes.stock;
        product.active = changes.active;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn deactivate_product(&self, id: ProductId) -> Result<Product> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::product_not_found(id))?;
        product.active = false;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::product_not_found(product_id))?;
        product.stock = stock_after_reservation(product, quantity)?;
        Ok(())
    }

    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::product_not_found(product_id))?;
        if let Some(stock) = product.stock.as_mut() {
            *stock = stock.saturating_add(quantity);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn place_order(&self, draft: OrderDraft) -> Result<Order> {
        let mut state = self.state.write().await;

        // Stage every reservation before touching anything.
        let mut staged = Vec::with_capacity(draft.line_items().len());
        for item in draft.line_items() {
            let product = state
                .products
                .get(&item.product_id())
                .ok_or_else(|| StoreError::product_not_found(item.product_id()))?;
            staged.push((product.id, stock_after_reservation(product, item.quantity())?));
        }

        self.take_injected_failure()?;

        for (product_id, stock) in staged {
            if let Some(product) = state.products.get_mut(&product_id) {
                product.stock = stock;
            }
        }

        let id = OrderId::new(next_id(&mut state.last_order_id));
        let order = Order::place(id, draft);
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn apply_state_change(&self, change: &StateChange) -> Result<Order> {
        let mut state = self.state.write().await;
        let mut order = state
            .orders
            .get(&change.order_id)
            .cloned()
            .ok_or_else(|| StoreError::order_not_found(change.order_id))?;

        if order.state() != change.from || self.take_injected_conflict() {
            return Err(StoreError::ConcurrencyConflict {
                order_id: change.order_id,
                expected: change.from,
                actual: order.state(),
            });
        }
        order
            .apply(change)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        self.take_injected_failure()?;

        for release in &change.releases {
            if let Some(product) = state.products.get_mut(&release.product_id)
                && let Some(stock) = product.stock.as_mut()
            {
                *stock = stock.saturating_add(release.quantity);
            }
        }
        state.orders.insert(order.id(), order.clone());
        Ok(order)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, record: UserRecord) -> Result<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(StoreError::DuplicateEmail(record.email));
        }

        let id = UserId::new(next_id(&mut state.last_user_id));
        let user = User {
            id,
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            role: record.role,
            active: true,
            created_at: Utc::now(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::user_not_found(id))?;
        user.name = changes.name;
        user.role = changes.role;
        user.active = changes.active;
        Ok(user.clone())
    }

    async fn deactivate_user(&self, id: UserId) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::user_not_found(id))?;
        user.active = false;
        Ok(user.clone())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn insert_report(&self, input: NewReport) -> Result<Report> {
        let mut state = self.state.write().await;
        let id = ReportId::new(next_id(&mut state.last_report_id));
        let now = Utc::now();
        let report = Report {
            id,
            user_id: input.user_id,
            order_id: input.order_id,
            title: input.title,
            description: input.description,
            report_type: input.report_type,
            active: true,
            created_at: now,
            updated_at: now,
        };
        state.reports.insert(id, report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        Ok(self.state.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        Ok(self.state.read().await.reports.values().cloned().collect())
    }

    async fn update_report(&self, id: ReportId, changes: ReportChanges) -> Result<Report> {
        let mut state = self.state.write().await;
        let report = state
            .reports
            .get_mut(&id)
            .ok_or_else(|| StoreError::report_not_found(id))?;
        report.title = changes.title;
        report.description = changes.description;
        report.report_type = changes.report_type;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn deactivate_report(&self, id: ReportId) -> Result<Report> {
        let mut state = self.state.write().await;
        let report = state
            .reports
            .get_mut(&id)
            .ok_or_else(|| StoreError::report_not_found(id))?;
        report.active = false;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }
}
