//! 상품 서비스.

use catalog_core::{ListQuery, NewProduct, Product, ProductPatch};
use std::sync::Arc;
use validator::Validate;

use super::{ensure_positive_id, ServiceError};
use crate::repository::ProductRepository;

/// 상품 서비스.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Vec<Product>, ServiceError> {
        query.validate()?;
        Ok(self.products.list(&query).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Product, ServiceError> {
        ensure_positive_id(id, "product")?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, ServiceError> {
        input.validate()?;
        let product = self.products.create(input).await?;
        tracing::info!(product_id = product.id, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, ServiceError> {
        patch.validate()?;
        let current = self.get(id).await?;

        self.products
            .update(&patch.apply(current))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        ensure_positive_id(id, "product")?;
        if !self.products.delete(id).await? {
            return Err(ServiceError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
