//! Product and category listings.

use std::collections::HashMap;

use common::CategoryId;
use domain::{Category, Product};
use serde::{Deserialize, Serialize};

use crate::search::{SearchTerm, matches};

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductListQuery {
    pub search: Option<String>,
    /// Only active (`true`) or only inactive (`false`) products.
    pub active: Option<bool>,
    pub page: Option<usize>,
}

/// A product with its category name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
}

impl ProductView {
    pub fn new(product: Product, categories: &HashMap<CategoryId, Category>) -> Self {
        let category_name = categories
            .get(&product.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("Category #{}", product.category_id));
        Self {
            product,
            category_name,
        }
    }

    /// Free-text match over name, description and category name.
    pub fn matches(&self, term: Option<&SearchTerm>) -> bool {
        matches(
            term,
            &[
                &self.product.name,
                self.product.description.as_deref().unwrap_or_default(),
                &self.category_name,
            ],
        )
    }
}

/// Filters for the category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryListQuery {
    pub search: Option<String>,
    pub active: Option<bool>,
    pub page: Option<usize>,
}

impl CategoryListQuery {
    pub fn matches(&self, category: &Category) -> bool {
        self.active.is_none_or(|active| category.active == active)
            && matches(
                SearchTerm::parse(self.search.as_deref()).as_ref(),
                &[&category.name],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::ProductId;
    use domain::Money;

    fn category(id: i64, name: &str, active: bool) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            active,
            created_at: Utc::now(),
        }
    }

    fn product(category_id: i64, description: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(category_id),
            name: "Espresso".to_string(),
            description: description.map(str::to_string),
            price: Money::from_cents(450),
            stock: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_search_covers_category_and_description() {
        let categories = HashMap::from([(CategoryId::new(1), category(1, "Hot Drinks", true))]);
        let view = ProductView::new(product(1, Some("Double shot")), &categories);

        assert_eq!(view.category_name, "Hot Drinks");
        assert!(view.matches(SearchTerm::parse(Some("hot dr")).as_ref()));
        assert!(view.matches(SearchTerm::parse(Some("DOUBLE")).as_ref()));
        assert!(!view.matches(SearchTerm::parse(Some("tea")).as_ref()));
    }

    #[test]
    fn test_missing_category_gets_placeholder() {
        let view = ProductView::new(product(9, None), &HashMap::new());
        assert_eq!(view.category_name, "Category #9");
    }

    #[test]
    fn test_product_view_serializes_flat() {
        let view = ProductView::new(product(9, None), &HashMap::new());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Espresso");
        assert_eq!(json["price"], 4.5);
        assert_eq!(json["category_name"], "Category #9");
    }

    #[test]
    fn test_category_query_filters_active_and_name() {
        let query = CategoryListQuery {
            search: Some("drink".to_string()),
            active: Some(true),
            page: None,
        };
        assert!(query.matches(&category(1, "Drinks", true)));
        assert!(!query.matches(&category(2, "Drinks", false)));
        assert!(!query.matches(&category(3, "Pastry", true)));
    }
}
