//! # SQLite データベース接続管理
//!
//! 接続プールの作成、スキーマの作成、書き込み用トランザクションの管理を行う。
//!
//! ## 設計方針
//!
//! - **接続プール**: 毎回接続を張り直すオーバーヘッドを避け、接続を再利用
//! - **sqlx 採用**: 非同期サポート、型安全なバインド
//! - **リクエストスコープのセッション**: 読み取りはプールから借りた接続を
//!   クエリ 1 回分だけ使い、ドロップで返却する。書き込みは [`TxContext`] の中で
//!   行い、コミットしないままドロップされた場合は自動的にロールバックされる
//!
//! ## スキーマ
//!
//! マイグレーションの仕組みは持たない。起動時に [`ensure_schema`] が
//! `CREATE TABLE IF NOT EXISTS` を実行するだけで、既存のテーブルには触れない。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use catalog_infra::db;
//!
//! async fn example() -> Result<(), sqlx::Error> {
//!     let pool = db::create_pool("sqlite://products.db?mode=rwc", 5).await?;
//!     db::ensure_schema(&pool).await?;
//!
//!     let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
//!         .fetch_one(&pool)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    Sqlite,
    SqliteConnection,
    SqlitePool,
    Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::InfraError;

/// products テーブルの DDL
///
/// - `AUTOINCREMENT`: 削除済みの ID を再利用しない
/// - `uq_product_name`: 商品名の一意性はこの制約が唯一の判定基準
/// - `CHECK`: ドメイン層の検証をすり抜けた値も永続化させない
const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL,
        price       REAL    NOT NULL CHECK (price > 0),
        quantity    INTEGER NOT NULL CHECK (quantity >= 0),
        description TEXT,
        category    TEXT,
        CONSTRAINT uq_product_name UNIQUE (name)
    )
"#;

/// SQLite 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。
///
/// # 引数
///
/// * `database_url` - SQLite 接続 URL（例: `sqlite://products.db?mode=rwc`）
/// * `max_connections` - 最大接続数
///
/// # 設定値
///
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト。超過時はエラー
/// - `busy_timeout(5秒)`: 書き込みロック待ちの上限。同時書き込みは SQLite が直列化する
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// インメモリ SQLite の接続プールを作成する
///
/// インメモリ DB は接続ごとに独立しているため、接続数を 1 に固定し、
/// アイドル切断も無効にする（切断すると DB ごと消える）。
/// テストやローカルでの動作確認に使用する。
pub async fn create_in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// products テーブルを作成する（存在する場合は何もしない）
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_PRODUCTS_TABLE).execute(pool).await?;
    Ok(())
}

/// データベースへの疎通を確認する
///
/// Readiness Check から呼び出される。
#[tracing::instrument(skip_all, level = "debug")]
pub async fn ping(pool: &SqlitePool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

// =============================================================================
// TxContext
// =============================================================================

/// トランザクションコンテキスト
///
/// 書き込みリポジトリメソッドの必須引数。
/// トランザクションなしの書き込みをコンパイルエラーにする。
///
/// # ライフサイクル
///
/// 1. `TransactionManager::begin()` で作成
/// 2. 書き込みメソッドに `&mut TxContext` として渡す
/// 3. `commit()` でコミット、またはドロップでロールバック
///
/// エラーを `?` で返すとコンテキストはドロップされるため、
/// 重複エラーなどを呼び出し元に返す時点で部分的な書き込みは残らない。
pub struct TxContext(TxContextInner);

enum TxContextInner {
    Sqlite(Transaction<'static, Sqlite>),
    #[cfg(any(test, feature = "test-utils"))]
    Mock,
}

impl TxContext {
    /// SQLite トランザクションを開始する
    ///
    /// `SqliteTransactionManager` のみが使用する。
    pub(crate) async fn begin_sqlite(pool: &SqlitePool) -> Result<Self, InfraError> {
        Ok(Self(TxContextInner::Sqlite(pool.begin().await?)))
    }

    /// テスト用のモック TxContext を作成する
    ///
    /// Mock リポジトリはインメモリ実装のため、実際のトランザクションは不要。
    /// `conn()` を呼ぶと panic するが、Mock リポジトリは `conn()` を使用しない。
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mock() -> Self {
        Self(TxContextInner::Mock)
    }

    /// トランザクションをコミットする
    ///
    /// 呼ばずにドロップすると、sqlx が自動的にロールバックする。
    pub async fn commit(self) -> Result<(), InfraError> {
        match self.0 {
            TxContextInner::Sqlite(tx) => {
                tx.commit().await?;
                Ok(())
            }
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock => Ok(()),
        }
    }

    /// トランザクション内の DB コネクションを取得する
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        match &mut self.0 {
            TxContextInner::Sqlite(tx) => &mut **tx,
            #[cfg(any(test, feature = "test-utils"))]
            TxContextInner::Mock => {
                panic!("BUG: conn() called on Mock TxContext. Mock repos should not call conn().")
            }
        }
    }
}

// =============================================================================
// TransactionManager
// =============================================================================

/// トランザクション管理 trait
///
/// ユースケース層が TxContext を作成するための抽象化。
/// ユースケース層は SqlitePool に直接依存せず、この trait 経由で
/// トランザクションを開始する。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// トランザクションを開始し、TxContext を返す
    async fn begin(&self) -> Result<TxContext, InfraError>;
}

/// SQLite 用 TransactionManager 実装
pub struct SqliteTransactionManager {
    pool: SqlitePool,
}

impl SqliteTransactionManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for SqliteTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        TxContext::begin_sqlite(&self.pool).await
    }
}
