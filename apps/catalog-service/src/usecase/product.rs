//! 商品管理ユースケース
//!
//! 入力値を値オブジェクトに変換してから永続化層を呼び出す。
//! 検証はストレージへのアクセスより先に行うため、不正な入力は
//! 対象の存在有無にかかわらず `Validation` になる。

use std::sync::Arc;

use catalog_domain::{
    DomainError,
    product::{
        NewProduct,
        Price,
        PriceFloor,
        Product,
        ProductFilter,
        ProductId,
        ProductName,
        ProductPatch,
        Quantity,
    },
};
use catalog_infra::{TransactionManager, repository::ProductRepository};

use crate::error::CoreError;

const NOT_FOUND: &str = "Product not found";
const CREATE_DUPLICATE: &str = "Product creation failed due to duplicate name.";
const UPDATE_DUPLICATE: &str = "Product update failed due to duplicate name.";

/// 商品登録の入力
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name:        String,
    pub price:       f64,
    pub quantity:    i64,
    pub description: Option<String>,
    pub category:    Option<String>,
}

/// 商品更新の入力
///
/// 各フィールドは「指定なし（`None`）」「null 指定（`Some(None)`）」
/// 「値の指定（`Some(Some(v))`）」の 3 状態を持つ。
/// 必須項目（`name` / `price` / `quantity`）への null 指定は検証エラーになる。
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name:        Option<Option<String>>,
    pub price:       Option<Option<f64>>,
    pub quantity:    Option<Option<i64>>,
    pub description: Option<Option<String>>,
    pub category:    Option<Option<String>>,
}

impl TryFrom<CreateProductInput> for NewProduct {
    type Error = DomainError;

    fn try_from(input: CreateProductInput) -> Result<Self, Self::Error> {
        Ok(NewProduct {
            name:        ProductName::new(input.name)?,
            price:       Price::new(input.price)?,
            quantity:    Quantity::new(input.quantity)?,
            description: input.description,
            category:    input.category,
        })
    }
}

impl TryFrom<UpdateProductInput> for ProductPatch {
    type Error = DomainError;

    fn try_from(input: UpdateProductInput) -> Result<Self, Self::Error> {
        Ok(ProductPatch {
            name:        required("name", input.name)?
                .map(ProductName::new)
                .transpose()?,
            price:       required("price", input.price)?
                .map(Price::new)
                .transpose()?,
            quantity:    required("quantity", input.quantity)?
                .map(Quantity::new)
                .transpose()?,
            description: input.description,
            category:    input.category,
        })
    }
}

/// 必須項目への null 指定を拒否する
fn required<T>(field: &str, value: Option<Option<T>>) -> Result<Option<T>, DomainError> {
    match value {
        Some(None) => Err(DomainError::Validation(format!(
            "{field} must not be null"
        ))),
        Some(Some(v)) => Ok(Some(v)),
        None => Ok(None),
    }
}

/// 商品管理ユースケース
pub struct ProductUseCaseImpl {
    product_repository: Arc<dyn ProductRepository>,
    tx_manager:         Arc<dyn TransactionManager>,
}

impl ProductUseCaseImpl {
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            product_repository,
            tx_manager,
        }
    }

    /// 商品を登録する
    ///
    /// 1. 入力を値オブジェクトに変換（不正な値は `Validation`）
    /// 2. トランザクション内で挿入（重複名は DB 制約で `DuplicateName`）
    /// 3. コミットして採番済みの商品を返す
    pub async fn create_product(&self, input: CreateProductInput) -> Result<Product, CoreError> {
        let new_product = NewProduct::try_from(input)?;

        let mut tx = self.tx_manager.begin().await?;
        let product = self
            .product_repository
            .insert(&mut tx, &new_product)
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    tracing::info!(name = %new_product.name, "重複した商品名での登録を拒否しました");
                    CoreError::DuplicateName(CREATE_DUPLICATE.to_string())
                } else {
                    CoreError::Database(e)
                }
            })?;
        tx.commit().await?;

        tracing::info!(
            product_id = %product.id(),
            name = %product.name(),
            "商品を登録しました"
        );
        Ok(product)
    }

    /// 商品を取得する
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CoreError> {
        self.product_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(NOT_FOUND.to_string()))
    }

    /// 商品を部分更新する
    ///
    /// - 指定されたフィールドのみ変更する（空の更新は現在の商品をそのまま返す）
    /// - 書き込むのは指定された列のみで、それ以外の列は書き込み時点の値を維持する
    /// - 他の商品と同じ名前への変更は `DuplicateName`
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, CoreError> {
        let patch = ProductPatch::try_from(input)?;
        if patch.is_empty() {
            return self.get_product(id).await;
        }

        let mut tx = self.tx_manager.begin().await?;
        let updated = self
            .product_repository
            .update(&mut tx, id, &patch)
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    tracing::info!(
                        product_id = %id,
                        name = ?patch.name.as_ref().map(ProductName::as_str),
                        "重複した商品名への変更を拒否しました"
                    );
                    CoreError::DuplicateName(UPDATE_DUPLICATE.to_string())
                } else {
                    CoreError::Database(e)
                }
            })?
            .ok_or_else(|| CoreError::NotFound(NOT_FOUND.to_string()))?;
        tx.commit().await?;

        tracing::info!(product_id = %id, "商品を更新しました");
        Ok(updated)
    }

    /// 商品を削除する
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CoreError> {
        let mut tx = self.tx_manager.begin().await?;
        let deleted = self.product_repository.delete(&mut tx, id).await?;
        if !deleted {
            return Err(CoreError::NotFound(NOT_FOUND.to_string()));
        }
        tx.commit().await?;

        tracing::info!(product_id = %id, "商品を削除しました");
        Ok(())
    }

    /// 商品一覧を取得する
    ///
    /// `price_gte` を指定した場合は価格がその値以上の商品のみを返す。
    pub async fn list_products(&self, price_gte: Option<f64>) -> Result<Vec<Product>, CoreError> {
        let filter = match price_gte {
            Some(value) => ProductFilter::price_gte(PriceFloor::new(value)?),
            None => ProductFilter::all(),
        };

        Ok(self.product_repository.find_all(&filter).await?)
    }
}
