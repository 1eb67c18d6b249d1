//! # ProductRepository
//!
//! 商品の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **一意性はストレージで判定**: 商品名の重複は事前 SELECT で確認せず、
//!   `uq_product_name` 制約の違反を [`InfraError::duplicate`] に変換する。
//!   同名の同時登録はストレージが調停し、ちょうど 1 件だけが成功する
//! - **存在確認は影響行数で判定**: UPDATE / DELETE の対象が存在しない場合は
//!   `None` / `false` を返し、エラーの判断はユースケース層に委ねる
//! - **RETURNING で結果を返す**: 書き込み後の状態を同じ文で取得する
//! - **部分更新は指定列のみ書き込む**: 指定のない列は UPDATE 実行時点の値を維持する

use async_trait::async_trait;
use catalog_domain::product::{
    NewProduct,
    Product,
    ProductFilter,
    ProductId,
    ProductName,
    ProductPatch,
};
use sqlx::SqlitePool;

use crate::{db::TxContext, error::InfraError};

/// 商品リポジトリトレイト
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 条件に一致する商品を ID 昇順（登録順）で取得する
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, InfraError>;

    /// ID で商品を検索する
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, InfraError>;

    /// 商品を挿入し、採番された ID を含む商品を返す
    ///
    /// 商品名が既存の商品と重複する場合は `InfraErrorKind::Duplicate` を返す。
    async fn insert(&self, tx: &mut TxContext, product: &NewProduct)
    -> Result<Product, InfraError>;

    /// 部分更新を適用し、更新後の商品を返す
    ///
    /// パッチで指定された列のみ書き込む。
    /// 対象が存在しない場合は `None` を返す。
    /// 商品名が他の商品と重複する場合は `InfraErrorKind::Duplicate` を返す。
    async fn update(
        &self,
        tx: &mut TxContext,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, InfraError>;

    /// 商品を削除する
    ///
    /// 対象が存在しない場合は `false` を返す。
    async fn delete(&self, tx: &mut TxContext, id: ProductId) -> Result<bool, InfraError>;
}

/// SQLite 実装の ProductRepository
#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// products テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id:          i64,
    name:        String,
    price:       f64,
    quantity:    i64,
    description: Option<String>,
    category:    Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = InfraError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Product::from_db(
            row.id,
            row.name,
            row.price,
            row.quantity,
            row.description,
            row.category,
        )
        .map_err(|e| InfraError::unexpected(format!("products(id={id}) の復元に失敗: {e}")))
    }
}

/// 書き込み時の sqlx エラーを変換する
///
/// 一意制約違反のみ `Duplicate` として区別し、それ以外はそのまま包む。
fn map_write_error(err: sqlx::Error, name: &str) -> InfraError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            InfraError::duplicate("Product", name)
        }
        _ => err.into(),
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(price_gte = ?filter.price_gte))]
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, InfraError> {
        let rows: Vec<ProductRow> = match filter.price_gte {
            Some(floor) => {
                sqlx::query_as(
                    r#"
                    SELECT id, name, price, quantity, description, category
                    FROM products
                    WHERE price >= ?
                    ORDER BY id ASC
                    "#,
                )
                .bind(floor.value())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, name, price, quantity, description, category
                    FROM products
                    ORDER BY id ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Product::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, InfraError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price, quantity, description, category
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(name = %product.name))]
    async fn insert(
        &self,
        tx: &mut TxContext,
        product: &NewProduct,
    ) -> Result<Product, InfraError> {
        let row: ProductRow = sqlx::query_as(
            r#"
            INSERT INTO products (name, price, quantity, description, category)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, price, quantity, description, category
            "#,
        )
        .bind(product.name.as_str())
        .bind(product.price.value())
        .bind(product.quantity.value())
        .bind(product.description.as_deref())
        .bind(product.category.as_deref())
        .fetch_one(tx.conn())
        .await
        .map_err(|e| map_write_error(e, product.name.as_str()))?;

        Product::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn update(
        &self,
        tx: &mut TxContext,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, InfraError> {
        // 任意項目は変更フラグと値の組で渡す（`Some(None)` は NULL へのクリア）
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            UPDATE products
            SET name        = COALESCE(?, name),
                price       = COALESCE(?, price),
                quantity    = COALESCE(?, quantity),
                description = CASE WHEN ? THEN ? ELSE description END,
                category    = CASE WHEN ? THEN ? ELSE category END
            WHERE id = ?
            RETURNING id, name, price, quantity, description, category
            "#,
        )
        .bind(patch.name.as_ref().map(ProductName::as_str))
        .bind(patch.price.map(|p| p.value()))
        .bind(patch.quantity.map(|q| q.value()))
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.category.is_some())
        .bind(patch.category.clone().flatten())
        .bind(id.as_i64())
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| {
            map_write_error(
                e,
                patch.name.as_ref().map(ProductName::as_str).unwrap_or_default(),
            )
        })?;

        row.map(Product::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: ProductId) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = ?
            "#,
        )
        .bind(id.as_i64())
        .execute(tx.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
