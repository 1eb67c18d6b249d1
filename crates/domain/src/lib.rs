//! # Catalog ドメイン層
//!
//! 商品カタログのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（[`product::Product`]）
//! - **値オブジェクト**: 生成時に検証される不変オブジェクト（`ProductName`, `Price` など）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! catalog-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB）に一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use catalog_domain::product::{Price, ProductName, Quantity};
//!
//! let name = ProductName::new("Widget").unwrap();
//! let price = Price::new(10.0).unwrap();
//! let quantity = Quantity::new(5).unwrap();
//!
//! assert_eq!(name.as_str(), "Widget");
//! assert!(Price::new(0.0).is_err());
//! assert!(Quantity::new(-1).is_err());
//! # let _ = (price, quantity);
//! ```

pub mod error;
pub mod product;

pub use error::DomainError;
