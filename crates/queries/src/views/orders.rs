//! Order listing rows and the order detail view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use domain::{Money, Order, OrderState, PaymentType, Product, User};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::search::{SearchTerm, matches};

/// Filters for the order listing, as sent in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderListQuery {
    /// Only orders in this state. Blank means any state.
    #[serde(alias = "estado", deserialize_with = "state_filter")]
    pub state: Option<OrderState>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl OrderListQuery {
    pub(crate) fn search_term(&self) -> Option<SearchTerm> {
        SearchTerm::parse(self.search.as_deref())
    }
}

/// Accepts any casing and the Spanish state names; an empty value is no filter.
fn state_filter<'de, D>(deserializer: D) -> Result<Option<OrderState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(de::Error::custom),
    }
}

/// One row of the order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub code: String,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    pub payment_type: PaymentType,
    pub state: OrderState,
    pub total: Money,
    pub item_count: u64,
    pub created_at: DateTime<Utc>,
}

impl OrderSummary {
    pub fn new(order: &Order, customer: Option<&User>) -> Self {
        let (customer_name, customer_email) = customer_labels(order.user_id(), customer);
        Self {
            id: order.id(),
            code: order.code().to_string(),
            user_id: order.user_id(),
            customer_name,
            customer_email,
            payment_type: order.payment_type(),
            state: order.state(),
            total: order.total(),
            item_count: order.total_quantity(),
            created_at: order.created_at(),
        }
    }

    /// Free-text match over code, payment type names and customer.
    pub fn matches(&self, term: Option<&SearchTerm>) -> bool {
        let mut fields = vec![
            self.code.as_str(),
            self.customer_name.as_str(),
            self.customer_email.as_str(),
        ];
        fields.extend_from_slice(self.payment_type.names());
        matches(term, &fields)
    }
}

/// A line item as shown on the order detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Full order with display names resolved.
///
/// Names come from the current catalog; quantities and prices always come
/// from the order's own snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub code: String,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    pub payment_type: PaymentType,
    pub state: OrderState,
    pub total: Money,
    pub line_items: Vec<OrderLineView>,
    pub allowed_transitions: Vec<OrderState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderDetail {
    pub fn new(
        order: &Order,
        customer: Option<&User>,
        products: &HashMap<ProductId, Product>,
    ) -> Self {
        let (customer_name, customer_email) = customer_labels(order.user_id(), customer);
        let line_items = order
            .line_items()
            .iter()
            .map(|item| OrderLineView {
                product_id: item.product_id(),
                product_name: products
                    .get(&item.product_id())
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("Product #{}", item.product_id())),
                quantity: item.quantity(),
                unit_price: item.unit_price(),
                subtotal: item.subtotal(),
            })
            .collect();

        Self {
            id: order.id(),
            code: order.code().to_string(),
            user_id: order.user_id(),
            customer_name,
            customer_email,
            payment_type: order.payment_type(),
            state: order.state(),
            total: order.total(),
            line_items,
            allowed_transitions: order.state().allowed_transitions().to_vec(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

fn customer_labels(user_id: UserId, customer: Option<&User>) -> (String, String) {
    match customer {
        Some(user) => (user.name.clone(), user.email.clone()),
        None => (format!("User #{user_id}"), String::new()),
    }
}
