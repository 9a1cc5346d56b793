//! Catalog entities: categories and products.

use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Money;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;

/// Highest accepted product price, 10,000,000.00.
pub const MAX_PRICE: Money = Money::from_cents(1_000_000_000);

/// Errors raised while validating catalog input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{entity} name must be between 2 and 100 characters (got {length})")]
    InvalidName { entity: &'static str, length: usize },

    #[error("Product description must be at most 500 characters (got {length})")]
    DescriptionTooLong { length: usize },

    #[error("Product price must not be negative (got {price})")]
    NegativePrice { price: Money },

    #[error("Product price must be at most {MAX_PRICE} (got {price})")]
    PriceTooHigh { price: Money },
}

/// A product category. Categories are deactivated, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    /// Trims and validates the input.
    pub fn validate(self) -> Result<Self, CatalogError> {
        Ok(Self {
            name: validate_name("Category", &self.name)?,
        })
    }
}

/// Editable fields of an existing category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryChanges {
    pub name: String,
    pub active: bool,
}

impl CategoryChanges {
    pub fn validate(self) -> Result<Self, CatalogError> {
        Ok(Self {
            name: validate_name("Category", &self.name)?,
            active: self.active,
        })
    }
}

/// A sellable product.
///
/// `stock == None` means inventory is not tracked for the product; `Some(0)`
/// means it is sold out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: Option<u32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product's inventory is managed.
    pub fn is_stock_tracked(&self) -> bool {
        self.stock.is_some()
    }

    /// Returns true if `quantity` units can be reserved right now.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock.is_none_or(|stock| stock >= quantity)
    }

    /// Active, tracked and down to `threshold` units or fewer (but not zero).
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.active && matches!(self.stock, Some(stock) if stock > 0 && stock <= threshold)
    }

    /// Active, tracked and exhausted.
    pub fn is_out_of_stock(&self) -> bool {
        self.active && self.stock == Some(0)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    #[serde(alias = "categoryId")]
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl NewProduct {
    /// Trims and validates the input. Category existence is checked by the store.
    pub fn validate(self) -> Result<Self, CatalogError> {
        Ok(Self {
            category_id: self.category_id,
            name: validate_name("Product", &self.name)?,
            description: validate_description(self.description)?,
            price: validate_price(self.price)?,
            stock: self.stock,
        })
    }
}

/// Editable fields of an existing product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductChanges {
    #[serde(alias = "categoryId")]
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock: Option<u32>,
    pub active: bool,
}

impl ProductChanges {
    pub fn validate(self) -> Result<Self, CatalogError> {
        Ok(Self {
            category_id: self.category_id,
            name: validate_name("Product", &self.name)?,
            description: validate_description(self.description)?,
            price: validate_price(self.price)?,
            stock: self.stock,
            active: self.active,
        })
    }
}

/// Trims a display name and checks its length in characters.
pub(crate) fn validate_name(entity: &'static str, raw: &str) -> Result<String, CatalogError> {
    let name = raw.trim();
    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        return Err(CatalogError::InvalidName { entity, length });
    }
    Ok(name.to_string())
}

fn validate_description(raw: Option<String>) -> Result<Option<String>, CatalogError> {
    let Some(description) = raw else {
        return Ok(None);
    };
    let description = description.trim();
    if description.is_empty() {
        return Ok(None);
    }
    let length = description.chars().count();
    if length > DESCRIPTION_MAX_CHARS {
        return Err(CatalogError::DescriptionTooLong { length });
    }
    Ok(Some(description.to_string()))
}

fn validate_price(price: Money) -> Result<Money, CatalogError> {
    if price.is_negative() {
        return Err(CatalogError::NegativePrice { price });
    }
    if price > MAX_PRICE {
        return Err(CatalogError::PriceTooHigh { price });
    }
    Ok(price)
}
