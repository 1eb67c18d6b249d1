//! テスト共通フィクスチャ
//!
//! インメモリ SQLite を使用する統合テストで共通利用する
//! プール作成・エンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use catalog_domain::product::{NewProduct, Price, ProductName, Quantity};
use catalog_infra::db;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// スキーマ作成済みのインメモリ DB プールを用意する
pub async fn setup_pool() -> SqlitePool {
    let pool = db::create_in_memory_pool().await.unwrap();
    db::ensure_schema(&pool).await.unwrap();
    pool
}

/// スキーマ作成済みのファイル DB プールを用意する
///
/// `dir` はテスト終了まで保持すること（ドロップで削除される）。
pub async fn setup_file_pool(dir: &TempDir) -> SqlitePool {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
    let pool = db::create_pool(&url, 5).await.unwrap();
    db::ensure_schema(&pool).await.unwrap();
    pool
}

/// デフォルト値で NewProduct を作成
pub fn new_product(name: &str, price: f64, quantity: i64) -> NewProduct {
    NewProduct {
        name:        ProductName::new(name).unwrap(),
        price:       Price::new(price).unwrap(),
        quantity:    Quantity::new(quantity).unwrap(),
        description: None,
        category:    None,
    }
}
