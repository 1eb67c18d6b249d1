//! # リポジトリ実装
//!
//! リポジトリトレイトとその SQLite 実装を提供する。
//!
//! ## 設計方針
//!
//! - **明示的なメソッド**: 暗黙的なクエリ構築は行わず、操作ごとにメソッドを定義
//! - **書き込みは TxContext 必須**: トランザクション外の書き込みを型で禁止
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod product_repository;

pub use product_repository::{ProductRepository, SqliteProductRepository};
