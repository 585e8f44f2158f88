//! 메모리 기반 저장소 (테스트용).
//!
//! PostgreSQL 구현과 같은 계약을 따릅니다: 이메일 중복은 `Conflict`,
//! 없는 대상의 갱신은 `None`, 삭제 결과는 실제 삭제 여부.

use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, ListQuery, NewProduct, Product, User};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{NewUserRecord, ProductRepository, UserRepository};

#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_with_id(&mut self, id: i64, row: T) {
        self.next_id = self.next_id.max(id + 1);
        self.rows.insert(id, row);
    }
}

fn page<'a, T: Clone + 'a>(
    rows: impl Iterator<Item = &'a T>,
    query: &ListQuery,
    name_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    let needle = query.name_filter().map(str::to_lowercase);

    rows.filter(|row| {
        needle
            .as_deref()
            .map_or(true, |n| name_of(row).to_lowercase().contains(n))
    })
    .skip(query.offset().max(0) as usize)
    .take(query.limit.max(0) as usize)
    .cloned()
    .collect()
}

// ================================================================================================
// Users
// ================================================================================================

/// 메모리 사용자 저장소.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 ID 그대로 사용자 추가 (시드 데이터용).
    pub async fn insert(&self, user: User) {
        self.table.write().await.insert_with_id(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(page(table.rows.values(), query, |u| u.username.as_str()))
    }

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CatalogResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUserRecord) -> CatalogResult<User> {
        let mut table = self.table.write().await;

        if table.rows.values().any(|u| u.email == user.email) {
            return Err(CatalogError::Conflict("email already exists".to_string()));
        }

        let id = table.allocate_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> CatalogResult<Option<User>> {
        let mut table = self.table.write().await;

        if table
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(CatalogError::Conflict("email already exists".to_string()));
        }

        Ok(table.rows.get_mut(&user.id).map(|stored| {
            *stored = user.clone();
            stored.clone()
        }))
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

// ================================================================================================
// Products
// ================================================================================================

/// 메모리 상품 저장소.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, query: &ListQuery) -> CatalogResult<Vec<Product>> {
        let table = self.table.read().await;
        Ok(page(table.rows.values(), query, |p| p.name.as_str()))
    }

    async fn find_by_id(&self, id: i64) -> CatalogResult<Option<Product>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let product = Product {
            id,
            name: product.name,
            price: product.price,
        };
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> CatalogResult<Option<Product>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&product.id).map(|stored| {
            *stored = product.clone();
            stored.clone()
        }))
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
