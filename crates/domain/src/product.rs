//! # 商品（Product）
//!
//! 商品カタログの唯一のエンティティと、その値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 制約 |
//! |---|------------|------|
//! | [`Product`] | 商品 | 永続化済みのレコード。`id` は採番後不変 |
//! | [`NewProduct`] | 登録候補 | 採番前の商品。全必須項目が検証済み |
//! | [`ProductPatch`] | 部分更新 | 指定されたフィールドのみを変更する（merge-patch） |
//! | [`ProductFilter`] | 一覧条件 | 最低価格（`price_gte`、境界を含む） |
//! | [`ProductName`] | 商品名 | 空文字列は不可。全商品で一意（一意性は永続化層で保証） |
//! | [`Price`] | 価格 | 有限かつ 0 より大きい |
//! | [`Quantity`] | 在庫数 | 0 以上 |
//! | [`PriceFloor`] | 最低価格 | 有限かつ 0 以上 |
//!
//! ## 設計方針
//!
//! - **生成時検証**: 値オブジェクトは `new()` でのみ生成でき、不正な値は
//!   `DomainError::Validation` になる。検証済みの値しか `Product` に入らない
//! - **入力をそのまま保持**: 商品名は trim しない（登録した値がそのまま返る）
//! - **部分更新の静的表現**: 更新ペイロードは動的な辞書ではなく、
//!   フィールドごとに「指定あり / なし」を `Option` で表す

use derive_more::Display;

use crate::DomainError;

/// 商品 ID
///
/// 永続化層が採番する整数 ID。採番後は不変で、削除後も再利用されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct ProductId(i64);

impl ProductId {
    /// 永続化層から取得した値で ID を作成する
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// 内部の整数値を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// 商品名（値オブジェクト）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct ProductName(String);

impl ProductName {
    /// 商品名を作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない（空白のみの名前は有効）
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::Validation(
                "name must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 価格（値オブジェクト）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{_0}")]
pub struct Price(f64);

impl Price {
    /// 価格を作成する
    ///
    /// # バリデーション
    ///
    /// - 有限値（NaN / 無限大は不可）
    /// - 0 より大きい
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::Validation(
                "price must be greater than 0".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// 在庫数（値オブジェクト）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct Quantity(i64);

impl Quantity {
    /// 在庫数を作成する
    ///
    /// # バリデーション
    ///
    /// - 0 以上
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::Validation(
                "quantity must be greater than or equal to 0".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 一覧取得の最低価格（値オブジェクト）
///
/// 価格と異なり 0 を許容する（`price_gte=0` は全件に一致する）。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{_0}")]
pub struct PriceFloor(f64);

impl PriceFloor {
    /// 最低価格を作成する
    ///
    /// # バリデーション
    ///
    /// - 有限値
    /// - 0 以上
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::Validation(
                "price_gte must be greater than or equal to 0".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// 登録候補の商品
///
/// ID 採番前の商品。全フィールドが検証済みの値オブジェクトで構成される。
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name:        ProductName,
    pub price:       Price,
    pub quantity:    Quantity,
    pub description: Option<String>,
    pub category:    Option<String>,
}

impl NewProduct {
    /// 採番済み ID と組み合わせて永続化済みの商品にする
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            description: self.description,
            category: self.category,
        }
    }
}

/// 商品の部分更新
///
/// 各フィールドは独立に「指定あり / なし」を持つ。指定なし（`None`）の
/// フィールドは更新前の値が維持される。
///
/// `description` / `category` は NULL 許容カラムのため二重の `Option` を使う:
///
/// | 値 | 意味 |
/// |---|------|
/// | `None` | 指定なし（変更しない） |
/// | `Some(None)` | 値をクリアする |
/// | `Some(Some(s))` | `s` に変更する |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name:        Option<ProductName>,
    pub price:       Option<Price>,
    pub quantity:    Option<Quantity>,
    pub description: Option<Option<String>>,
    pub category:    Option<Option<String>>,
}

impl ProductPatch {
    /// 変更対象のフィールドが 1 つもないか
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
            && self.category.is_none()
    }
}

/// 一覧取得の絞り込み条件
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductFilter {
    /// 最低価格（境界を含む）。`None` の場合は全件
    pub price_gte: Option<PriceFloor>,
}

impl ProductFilter {
    /// 絞り込みなし
    pub fn all() -> Self {
        Self::default()
    }

    /// 最低価格で絞り込む
    pub fn price_gte(floor: PriceFloor) -> Self {
        Self {
            price_gte: Some(floor),
        }
    }

    /// 商品が条件を満たすか判定する
    pub fn matches(&self, product: &Product) -> bool {
        match self.price_gte {
            Some(floor) => product.price().value() >= floor.value(),
            None => true,
        }
    }
}

/// 商品エンティティ
///
/// # 不変条件
///
/// - `price > 0`、`quantity >= 0`（値オブジェクトで保証）
/// - `id` は生成後に変更されない（setter を持たない）
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id:          ProductId,
    name:        ProductName,
    price:       Price,
    quantity:    Quantity,
    description: Option<String>,
    category:    Option<String>,
}

impl Product {
    /// データベースから復元する
    ///
    /// DB の CHECK 制約を経由した値を受け取るが、検証は省略しない。
    /// 制約外の値が入っていた場合は `DomainError::Validation` を返す。
    pub fn from_db(
        id: i64,
        name: String,
        price: f64,
        quantity: i64,
        description: Option<String>,
        category: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: ProductId::new(id),
            name: ProductName::new(name)?,
            price: Price::new(price)?,
            quantity: Quantity::new(quantity)?,
            description,
            category,
        })
    }

    /// 部分更新を適用した新しい商品を返す
    ///
    /// 指定されたフィールドのみを差し替え、それ以外は現在値を維持する。
    /// `id` は変更されない。
    pub fn apply(self, patch: ProductPatch) -> Self {
        Self {
            id:          self.id,
            name:        patch.name.unwrap_or(self.name),
            price:       patch.price.unwrap_or(self.price),
            quantity:    patch.quantity.unwrap_or(self.quantity),
            description: patch.description.unwrap_or(self.description),
            category:    patch.category.unwrap_or(self.category),
        }
    }

    // Getter メソッド

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}
