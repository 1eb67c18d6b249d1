//! # ユースケース層
//!
//! Catalog Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `product`: 商品の登録・取得・更新・削除・一覧

pub mod product;

pub use product::{CreateProductInput, ProductUseCaseImpl, UpdateProductInput};
