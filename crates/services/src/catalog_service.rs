//! Catalog service: category and product administration.

use common::{CategoryId, ProductId};
use domain::{
    Actor, Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges,
};
use store::Store;

use crate::error::{Result, ServiceError};

/// Service for managing categories and products.
///
/// Every operation requires the catalog management capability.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn authorize(actor: Actor) -> Result<()> {
        if !actor.role.can_manage_catalog() {
            return Err(ServiceError::forbidden("manage the catalog"));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn create_category(&self, actor: Actor, input: NewCategory) -> Result<Category> {
        Self::authorize(actor)?;
        let category = self.store.insert_category(input.validate()?).await?;
        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// Updates a category. Deactivating one that still has active products
    /// is a conflict.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn update_category(
        &self,
        actor: Actor,
        id: CategoryId,
        changes: CategoryChanges,
    ) -> Result<Category> {
        Self::authorize(actor)?;
        Ok(self.store.update_category(id, changes.validate()?).await?)
    }

    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn deactivate_category(&self, actor: Actor, id: CategoryId) -> Result<Category> {
        Self::authorize(actor)?;
        let category = self.store.deactivate_category(id).await?;
        tracing::info!(category_id = %id, "category deactivated");
        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn create_product(&self, actor: Actor, input: NewProduct) -> Result<Product> {
        Self::authorize(actor)?;
        let product = self.store.insert_product(input.validate()?).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Updates a product, including its stock level. Existing orders keep
    /// their price snapshots.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn update_product(
        &self,
        actor: Actor,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product> {
        Self::authorize(actor)?;
        Ok(self.store.update_product(id, changes.validate()?).await?)
    }

    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn deactivate_product(&self, actor: Actor, id: ProductId) -> Result<Product> {
        Self::authorize(actor)?;
        let product = self.store.deactivate_product(id).await?;
        tracing::info!(product_id = %id, "product deactivated");
        Ok(product)
    }
}
