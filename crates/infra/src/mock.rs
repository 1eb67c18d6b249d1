//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラのテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! catalog-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 商品名の一意性・ID の単調増加はストレージ実装と同じ規則で再現する。
//! トランザクションは持たないため、書き込みは即座に反映される。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_domain::product::{
    NewProduct,
    Product,
    ProductFilter,
    ProductId,
    ProductPatch,
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::ProductRepository,
};

// ===== MockProductRepository =====

#[derive(Default)]
struct MockStore {
    products: Vec<Product>,
    last_id:  i64,
}

#[derive(Clone, Default)]
pub struct MockProductRepository {
    store: Arc<Mutex<MockStore>>,
}

impl MockProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 採番してから商品を直接追加する（テストの前提データ用）
    pub fn add_product(&self, product: NewProduct) -> Product {
        let mut store = self.store.lock().unwrap();
        store.last_id += 1;
        let product = product.into_product(ProductId::new(store.last_id));
        store.products.push(product.clone());
        product
    }

    /// 保持している商品数
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, InfraError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, InfraError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        product: &NewProduct,
    ) -> Result<Product, InfraError> {
        let mut store = self.store.lock().unwrap();
        if store.products.iter().any(|p| p.name() == &product.name) {
            return Err(InfraError::duplicate("Product", product.name.as_str()));
        }
        store.last_id += 1;
        let created = product.clone().into_product(ProductId::new(store.last_id));
        store.products.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        _tx: &mut TxContext,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, InfraError> {
        let mut store = self.store.lock().unwrap();
        let Some(index) = store.products.iter().position(|p| p.id() == id) else {
            return Ok(None);
        };
        let changed = store.products[index].clone().apply(patch.clone());
        if store
            .products
            .iter()
            .any(|p| p.id() != id && p.name() == changed.name())
        {
            return Err(InfraError::duplicate("Product", changed.name().as_str()));
        }
        store.products[index] = changed.clone();
        Ok(Some(changed))
    }

    async fn delete(&self, _tx: &mut TxContext, id: ProductId) -> Result<bool, InfraError> {
        let mut store = self.store.lock().unwrap();
        let before = store.products.len();
        store.products.retain(|p| p.id() != id);
        Ok(store.products.len() < before)
    }
}

// ===== MockTransactionManager =====

/// 常に Mock の TxContext を返す TransactionManager
#[derive(Clone, Copy, Default)]
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}
