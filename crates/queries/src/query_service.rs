//! Read-side service over a [`Store`].

use std::collections::HashMap;

use common::{CategoryId, ProductId, UserId};
use domain::{Actor, Category, Order, Role, User};
use services::{Result, ServiceError};
use store::{OrderFilter, Store};

use crate::page::Page;
use crate::search::SearchTerm;
use crate::stats::{InventoryStats, OrderStats};
use crate::views::{
    CategoryListQuery, OrderDetail, OrderListQuery, OrderSummary, ProductListQuery, ProductView,
    ReportListQuery, ReportView, RoleView, UserListQuery,
};

/// Answers listing, detail and dashboard queries.
///
/// Listings are ordered by id, filtered in memory, then cut into pages of
/// `page_size`. Customers only ever see their own orders and reports.
pub struct QueryService<S: Store> {
    store: S,
    page_size: usize,
    low_stock_threshold: u32,
}

impl<S: Store> QueryService<S> {
    pub fn new(store: S, page_size: usize, low_stock_threshold: u32) -> Self {
        Self {
            store,
            page_size,
            low_stock_threshold,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[tracing::instrument(skip(self), level = "debug", fields(actor = %actor.user_id))]
    pub async fn list_orders(
        &self,
        actor: Actor,
        query: &OrderListQuery,
    ) -> Result<Page<OrderSummary>> {
        let mut filter = OrderFilter::new();
        if let Some(state) = query.state {
            filter = filter.in_state(state);
        }
        if !actor.role.is_staff() {
            filter = filter.for_user(actor.user_id);
        }

        let orders = self.store.list_orders(filter).await?;
        let users = self.users_by_id().await?;
        let term = query.search_term();

        let rows: Vec<OrderSummary> = orders
            .iter()
            .map(|order| OrderSummary::new(order, users.get(&order.user_id())))
            .filter(|row| row.matches(term.as_ref()))
            .collect();

        Ok(Page::paginate(rows, query.page.unwrap_or(1), self.page_size))
    }

    /// Resolves customer and product names for an order.
    ///
    /// Takes an order the caller already obtained through `OrderService`,
    /// which checked that the actor may see it.
    #[tracing::instrument(skip(self, order), level = "debug", fields(order_id = %order.id()))]
    pub async fn order_detail(&self, order: &Order) -> Result<OrderDetail> {
        let customer = self.store.get_user(order.user_id()).await?;
        let mut products = HashMap::with_capacity(order.line_items().len());
        for item in order.line_items() {
            if let Some(product) = self.store.get_product(item.product_id()).await? {
                products.insert(product.id, product);
            }
        }

        Ok(OrderDetail::new(order, customer.as_ref(), &products))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn list_products(&self, query: &ProductListQuery) -> Result<Page<ProductView>> {
        let categories = self.categories_by_id().await?;
        let term = SearchTerm::parse(query.search.as_deref());

        let rows: Vec<ProductView> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .filter(|p| query.active.is_none_or(|active| p.active == active))
            .map(|p| ProductView::new(p, &categories))
            .filter(|view| view.matches(term.as_ref()))
            .collect();

        Ok(Page::paginate(rows, query.page.unwrap_or(1), self.page_size))
    }

    pub async fn product(&self, id: ProductId) -> Result<ProductView> {
        let product = self
            .store
            .get_product(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Product",
                id: id.as_i64(),
            })?;
        let categories = self.categories_by_id().await?;
        Ok(ProductView::new(product, &categories))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn list_categories(&self, query: &CategoryListQuery) -> Result<Page<Category>> {
        let rows: Vec<Category> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();

        Ok(Page::paginate(rows, query.page.unwrap_or(1), self.page_size))
    }

    pub async fn category(&self, id: CategoryId) -> Result<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Category",
                id: id.as_i64(),
            })
    }

    #[tracing::instrument(skip(self), level = "debug", fields(actor = %actor.user_id))]
    pub async fn list_users(&self, actor: Actor, query: &UserListQuery) -> Result<Page<User>> {
        if !actor.role.can_manage_users() {
            return Err(ServiceError::forbidden("list users"));
        }

        let rows: Vec<User> = self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|u| query.matches(u))
            .collect();

        Ok(Page::paginate(rows, query.page.unwrap_or(1), self.page_size))
    }

    /// Admins may look up anyone; everybody may look up themselves.
    pub async fn user(&self, actor: Actor, id: UserId) -> Result<User> {
        if !actor.role.can_manage_users() && actor.user_id != id {
            return Err(ServiceError::forbidden("view other users"));
        }
        self.store
            .get_user(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "User",
                id: id.as_i64(),
            })
    }

    /// Active reports by default; customers only get their own.
    #[tracing::instrument(skip(self), level = "debug", fields(actor = %actor.user_id))]
    pub async fn list_reports(
        &self,
        actor: Actor,
        query: &ReportListQuery,
    ) -> Result<Page<ReportView>> {
        let owner = (!actor.role.is_staff()).then_some(actor.user_id);
        let reports = self.store.list_reports().await?;
        let users = self.users_by_id().await?;
        let term = query.search_term();

        let rows: Vec<ReportView> = reports
            .into_iter()
            .filter(|r| owner.is_none_or(|owner| r.user_id == owner))
            .filter(|r| query.keeps(r))
            .map(|r| {
                let author = users.get(&r.user_id);
                ReportView::new(r, author)
            })
            .filter(|view| view.matches(term.as_ref()))
            .collect();

        Ok(Page::paginate(rows, query.page.unwrap_or(1), self.page_size))
    }

    /// The fixed role catalog, in id order.
    pub fn roles(&self) -> Vec<RoleView> {
        Role::ALL.into_iter().map(RoleView::from).collect()
    }

    pub async fn order_stats(&self, actor: Actor) -> Result<OrderStats> {
        if !actor.role.is_staff() {
            return Err(ServiceError::forbidden("view order statistics"));
        }
        let orders = self.store.list_orders(OrderFilter::new()).await?;
        Ok(OrderStats::from_orders(&orders))
    }

    pub async fn inventory_stats(&self, actor: Actor) -> Result<InventoryStats> {
        if !actor.role.is_staff() {
            return Err(ServiceError::forbidden("view inventory statistics"));
        }
        let products = self.store.list_products().await?;
        Ok(InventoryStats::from_products(
            &products,
            self.low_stock_threshold,
        ))
    }

    async fn users_by_id(&self) -> Result<HashMap<UserId, User>> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn categories_by_id(&self) -> Result<HashMap<CategoryId, Category>> {
        let categories = self.store.list_categories().await?;
        Ok(categories.into_iter().map(|c| (c.id, c)).collect())
    }
}
