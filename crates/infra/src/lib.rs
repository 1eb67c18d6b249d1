//! # Catalog インフラ層
//!
//! 外部システム（データベース）との接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! リポジトリトレイトとその具体的な実装を提供する。SQL や接続管理の詳細を
//! カプセル化し、ユースケース層を永続化方式の変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: SQLite への接続プール管理とスキーマ作成
//! - **トランザクション**: 書き込み 1 回分のスコープを持つ [`TxContext`]
//! - **リポジトリ実装**: [`repository::ProductRepository`] の SQLite 実装
//!
//! ## 依存関係
//!
//! ```text
//! catalog-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プール、スキーマ、トランザクション管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use catalog_infra::{db, repository::SqliteProductRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("sqlite://products.db?mode=rwc", 5).await?;
//!     db::ensure_schema(&pool).await?;
//!
//!     let repo = SqliteProductRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use db::{SqliteTransactionManager, TransactionManager, TxContext};
pub use error::{InfraError, InfraErrorKind};
