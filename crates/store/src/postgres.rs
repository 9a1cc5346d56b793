use std::collections::HashMap;

use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, ReportId, UserId};
use domain::{
    Category, CategoryChanges, Money, NewCategory, NewProduct, NewReport, Order, OrderDraft,
    OrderLineItem, OrderParts, OrderState, Product, ProductChanges, Report, ReportChanges,
    ReportType, Role, StateChange, User, UserChanges, UserRecord,
};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{CatalogStore, OrderFilter, OrderStore, ReportStore, UserStore},
};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_unique";

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, price_cents, stock, active, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, password_hash, role_id, active, created_at";
const ORDER_COLUMNS: &str = "id, code, user_id, payment_type, state, created_at, updated_at";
const REPORT_COLUMNS: &str =
    "id, user_id, order_id, title, description, report_type, active, created_at, updated_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: CategoryId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let stock: Option<i64> = row.try_get("stock")?;
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            category_id: CategoryId::new(row.try_get("category_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: stock.map(to_quantity).transpose()?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        let role_id: i64 = row.try_get("role_id")?;
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: Role::from_id(role_id)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown role id {role_id}")))?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_report(row: PgRow) -> Result<Report> {
        let id = ReportId::new(row.try_get("id")?);
        let order_id: Option<i64> = row.try_get("order_id")?;
        let report_type: Option<String> = row.try_get("report_type")?;
        Ok(Report {
            id,
            user_id: UserId::new(row.try_get("user_id")?),
            order_id: order_id.map(OrderId::new),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            report_type: report_type
                .map(|name| name.parse::<ReportType>())
                .transpose()
                .map_err(|e| StoreError::Corrupt(format!("report {id}: {e}")))?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_line_item(row: &PgRow) -> Result<(OrderId, OrderLineItem)> {
        let quantity: i64 = row.try_get("quantity")?;
        let order_id = OrderId::new(row.try_get("order_id")?);
        let item = OrderLineItem::new(
            ProductId::new(row.try_get("product_id")?),
            to_quantity(quantity)?,
            Money::from_cents(row.try_get("unit_price_cents")?),
        )
        .map_err(|e| StoreError::Corrupt(format!("order {order_id}: {e}")))?;
        Ok((order_id, item))
    }

    /// Loads the line items of `rows` and assembles the orders, keeping row order.
    async fn assemble_orders(conn: &mut PgConnection, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let ids: Vec<i64> = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<std::result::Result<_, _>>()?;

        let line_rows = sqlx::query(
            r#"
            SELECT order_id, product_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id ASC, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut lines: HashMap<OrderId, Vec<OrderLineItem>> = HashMap::new();
        for row in &line_rows {
            let (order_id, item) = Self::row_to_line_item(row)?;
            lines.entry(order_id).or_default().push(item);
        }

        rows.into_iter()
            .map(|row| {
                let id = OrderId::new(row.try_get("id")?);
                let payment_type: String = row.try_get("payment_type")?;
                let state: String = row.try_get("state")?;
                Order::restore(OrderParts {
                    id,
                    code: row.try_get("code")?,
                    user_id: UserId::new(row.try_get("user_id")?),
                    payment_type: payment_type
                        .parse()
                        .map_err(|e| StoreError::Corrupt(format!("order {id}: {e}")))?,
                    state: state
                        .parse()
                        .map_err(|e| StoreError::Corrupt(format!("order {id}: {e}")))?,
                    line_items: lines.remove(&id).unwrap_or_default(),
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
                .map_err(|e| StoreError::Corrupt(format!("order {id}: {e}")))
            })
            .collect()
    }

    async fn fetch_order(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(Self::assemble_orders(conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Decrements tracked stock if enough is available, diagnosing failures.
    async fn reserve_in(conn: &mut PgConnection, product_id: ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = CASE WHEN stock IS NULL THEN NULL ELSE stock - $2 END
            WHERE id = $1 AND active AND (stock IS NULL OR stock >= $2)
            "#,
        )
        .bind(product_id.as_i64())
        .bind(i64::from(quantity))
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let row = sqlx::query("SELECT stock, active FROM products WHERE id = $1")
            .bind(product_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| StoreError::product_not_found(product_id))?;

        let active: bool = row.try_get("active")?;
        if !active {
            return Err(StoreError::ProductInactive(product_id));
        }
        let stock: Option<i64> = row.try_get("stock")?;
        Err(StoreError::InsufficientStock {
            product_id,
            requested: quantity,
            available: stock.map(to_quantity).transpose()?.unwrap_or(0),
        })
    }

    async fn release_in(conn: &mut PgConnection, product_id: ProductId, quantity: u32) -> Result<()> {
        sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1 AND stock IS NOT NULL")
            .bind(product_id.as_i64())
            .bind(i64::from(quantity))
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Checks the category is active and share-locks it until the transaction
    /// ends, so a concurrent deactivation waits for the product write.
    async fn require_active_category(conn: &mut PgConnection, id: CategoryId) -> Result<()> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT active FROM categories WHERE id = $1 FOR SHARE")
                .bind(id.as_i64())
                .fetch_optional(&mut *conn)
                .await?;
        match active {
            None => Err(StoreError::category_not_found(id)),
            Some(false) => Err(StoreError::CategoryInactive(id)),
            Some(true) => Ok(()),
        }
    }

    async fn set_category(&self, id: CategoryId, changes: CategoryChanges) -> Result<Category> {
        let mut tx = self.pool.begin().await?;

        // Lock the category so no product can join it while we check.
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(StoreError::category_not_found(id));
        }

        if !changes.active {
            let active_products: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM products WHERE category_id = $1 AND active",
            )
            .bind(id.as_i64())
            .fetch_one(&mut *tx)
            .await?;
            if active_products > 0 {
                return Err(StoreError::CategoryInUse {
                    category_id: id,
                    active_products,
                });
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE categories SET name = $2, active = $3
            WHERE id = $1
            RETURNING id, name, active, created_at
            "#,
        )
        .bind(id.as_i64())
        .bind(&changes.name)
        .bind(changes.active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_category(row)
    }
}

fn to_quantity(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("invalid quantity {value}")))
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_category(&self, input: NewCategory) -> Result<Category> {
        let row = sqlx::query(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, active, created_at",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_category(row)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        sqlx::query("SELECT id, name, active, created_at FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_category)
            .transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, active, created_at FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn update_category(&self, id: CategoryId, changes: CategoryChanges) -> Result<Category> {
        self.set_category(id, changes).await
    }

    async fn deactivate_category(&self, id: CategoryId) -> Result<Category> {
        let category = self
            .get_category(id)
            .await?
            .ok_or_else(|| StoreError::category_not_found(id))?;
        self.set_category(
            id,
            CategoryChanges {
                name: category.name,
                active: false,
            },
        )
        .await
    }

    async fn insert_product(&self, input: NewProduct) -> Result<Product> {
        let mut tx = self.pool.begin().await?;
        Self::require_active_category(&mut tx, input.category_id).await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (category_id, name, description, price_cents, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(input.category_id.as_i64())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price.cents())
        .bind(input.stock.map(i64::from))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_product(row)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_product)
            .transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Product> {
        let mut tx = self.pool.begin().await?;
        if changes.active {
            Self::require_active_category(&mut tx, changes.category_id).await?;
        } else {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = $1")
                .bind(changes.category_id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(StoreError::category_not_found(changes.category_id));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET category_id = $2, name = $3, description = $4, price_cents = $5,
                stock = $6, active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.category_id.as_i64())
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price.cents())
        .bind(changes.stock.map(i64::from))
        .bind(changes.active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::product_not_found(id))?;

        tx.commit().await?;
        Self::row_to_product(row)
    }

    async fn deactivate_product(&self, id: ProductId) -> Result<Product> {
        sqlx::query(&format!(
            "UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_product)
        .transpose()?
        .ok_or_else(|| StoreError::product_not_found(id))
    }

    async fn reserve_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_in(&mut conn, product_id, quantity).await
    }

    async fn release_stock(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
            .bind(product_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Err(StoreError::product_not_found(product_id));
        }
        Self::release_in(&mut conn, product_id, quantity).await
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn place_order(&self, draft: OrderDraft) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        for item in draft.line_items() {
            Self::reserve_in(&mut tx, item.product_id(), item.quantity()).await?;
        }

        // The code embeds the id, so take it from the sequence up front.
        let id: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('orders', 'id'))")
            .fetch_one(&mut *tx)
            .await?;
        let order = Order::place(OrderId::new(id), draft);

        sqlx::query(
            r#"
            INSERT INTO orders (id, code, user_id, payment_type, state, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id().as_i64())
        .bind(order.code())
        .bind(order.user_id().as_i64())
        .bind(order.payment_type().as_str())
        .bind(order.state().as_str())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.line_items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, position, product_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id().as_i64())
            .bind(position as i32)
            .bind(item.product_id().as_i64())
            .bind(i64::from(item.quantity()))
            .bind(item.unit_price().cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(order_id = %order.id(), code = order.code(), "order persisted");
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_order(&mut conn, id).await
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        if filter.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if filter.state.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND state = ${param_count}"));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id.as_i64());
        }
        if let Some(state) = filter.state {
            query = query.bind(state.as_str());
        }

        let mut conn = self.pool.acquire().await?;
        let rows = query.fetch_all(&mut *conn).await?;
        Self::assemble_orders(&mut conn, rows).await
    }

    async fn apply_state_change(&self, change: &StateChange) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE orders SET state = $1, updated_at = $2 WHERE id = $3 AND state = $4")
                .bind(change.to.as_str())
                .bind(change.at)
                .bind(change.order_id.as_i64())
                .bind(change.from.as_str())
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            let actual: Option<String> = sqlx::query_scalar("SELECT state FROM orders WHERE id = $1")
                .bind(change.order_id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;
            let actual = actual.ok_or_else(|| StoreError::order_not_found(change.order_id))?;
            let actual: OrderState = actual
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("order {}: {e}", change.order_id)))?;
            return Err(StoreError::ConcurrencyConflict {
                order_id: change.order_id,
                expected: change.from,
                actual,
            });
        }

        for release in &change.releases {
            Self::release_in(&mut tx, release.product_id, release.quantity).await?;
        }

        let order = Self::fetch_order(&mut tx, change.order_id)
            .await?
            .ok_or_else(|| StoreError::order_not_found(change.order_id))?;

        tx.commit().await?;
        Ok(order)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, record: UserRecord) -> Result<User> {
        sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
            {
                return StoreError::DuplicateEmail(record.email.clone());
            }
            StoreError::Database(e)
        })
        .and_then(Self::row_to_user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_user)
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User> {
        sqlx::query(&format!(
            r#"
            UPDATE users SET name = $2, role_id = $3, active = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(&changes.name)
        .bind(changes.role.id())
        .bind(changes.active)
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_user)
        .transpose()?
        .ok_or_else(|| StoreError::user_not_found(id))
    }

    async fn deactivate_user(&self, id: UserId) -> Result<User> {
        sqlx::query(&format!(
            "UPDATE users SET active = FALSE WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_user)
        .transpose()?
        .ok_or_else(|| StoreError::user_not_found(id))
    }
}

#[async_trait]
impl ReportStore for PostgresStore {
    async fn insert_report(&self, input: NewReport) -> Result<Report> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO reports (user_id, order_id, title, description, report_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(input.user_id.as_i64())
        .bind(input.order_id.map(|id| id.as_i64()))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.report_type.map(|kind| kind.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_report(row)
    }

    async fn get_report(&self, id: ReportId) -> Result<Option<Report>> {
        sqlx::query(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_report)
            .transpose()
    }

    async fn list_reports(&self) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_report).collect()
    }

    async fn update_report(&self, id: ReportId, changes: ReportChanges) -> Result<Report> {
        sqlx::query(&format!(
            r#"
            UPDATE reports SET title = $2, description = $3, report_type = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.report_type.map(|kind| kind.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_report)
        .transpose()?
        .ok_or_else(|| StoreError::report_not_found(id))
    }

    async fn deactivate_report(&self, id: ReportId) -> Result<Report> {
        sqlx::query(&format!(
            "UPDATE reports SET active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {REPORT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_report)
        .transpose()?
        .ok_or_else(|| StoreError::report_not_found(id))
    }
}
