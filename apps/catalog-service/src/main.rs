//! # Catalog Service サーバー
//!
//! 商品カタログの CRUD API を提供する HTTP サービス。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CATALOG_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CATALOG_PORT` | No | ポート番号（デフォルト: `8000`） |
//! | `DATABASE_URL` | No | SQLite 接続 URL（デフォルト: `sqlite://products.db?mode=rwc`） |
//! | `DATABASE_MAX_CONNECTIONS` | No | 最大接続数（デフォルト: `5`） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,catalog=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p catalog-service
//!
//! # 本番環境
//! CATALOG_PORT=8000 LOG_FORMAT=json cargo run -p catalog-service --release
//! ```

use anyhow::Context as _;
use catalog_infra::db;
use catalog_service::{build_app, config::CatalogConfig};
use catalog_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Catalog Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(&TracingConfig::from_env("catalog-service"));

    // 設定読み込み
    let config = CatalogConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Catalog Service サーバーを起動します: {}",
        config.bind_address()
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("データベース接続に失敗しました")?;
    db::ensure_schema(&pool)
        .await
        .context("スキーマの作成に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let app = build_app(pool);

    // サーバー起動
    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("{} にバインドできません", config.bind_address()))?;
    tracing::info!(
        "Catalog Service サーバーが起動しました: {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Ctrl+C を受け取るまで待機する
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナルの待機に失敗しました: {}", e);
    }
    tracing::info!("シャットダウンします");
}
