//! Product Repository
//!
//! 상품 관련 데이터베이스 연산을 담당합니다.

use async_trait::async_trait;
use catalog_core::{CatalogResult, ListQuery, NewProduct, Product};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use super::{contains_pattern, map_write_error};

/// products 테이블 레코드.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
        }
    }
}

/// 상품 저장소.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 페이지 단위 목록 (이름 부분 일치, 대소문자 무시).
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<Product>>;

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<Product>>;

    async fn create(&self, product: NewProduct) -> CatalogResult<Product>;

    /// 전체 필드 갱신. 대상이 없으면 `None`.
    async fn update(&self, product: &Product) -> CatalogResult<Option<Product>>;

    /// 삭제. 실제로 삭제되었으면 `true`.
    async fn delete(&self, id: i64) -> CatalogResult<bool>;
}

/// PostgreSQL 상품 저장소.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price
            FROM products
            WHERE $3::TEXT IS NULL OR name ILIKE $3 ESCAPE '\'
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(query.limit)
        .bind(query.offset())
        .bind(query.name_filter().map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> CatalogResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = $2, price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
