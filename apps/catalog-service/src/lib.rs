//! # Catalog Service ライブラリ
//!
//! Catalog Service の設定・ユースケース・ハンドラを公開し、
//! ルーターの組み立てを [`build_app`] にまとめる。
//! `main.rs` と統合テストは同じ関数でルーターを作成する。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;

use std::sync::Arc;

use axum::{Router, routing::get};
use catalog_infra::{SqliteTransactionManager, repository::SqliteProductRepository};
use catalog_shared::observability::{MakeRequestUuidV7, make_request_span};
use handler::{
    ProductState,
    ReadinessState,
    create_product,
    delete_product,
    get_product,
    health_check,
    list_products,
    readiness_check,
    update_product,
};
use sqlx::SqlitePool;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use usecase::ProductUseCaseImpl;

/// 接続プールから依存コンポーネントを初期化し、ルーターを構築する
///
/// レイヤーは外側から順に Request ID 採番、トレース、Request ID 伝播。
pub fn build_app(pool: SqlitePool) -> Router {
    let product_repository = Arc::new(SqliteProductRepository::new(pool.clone()));
    let tx_manager = Arc::new(SqliteTransactionManager::new(pool.clone()));
    let product_state = Arc::new(ProductState {
        usecase: ProductUseCaseImpl::new(product_repository, tx_manager),
    });
    let readiness_state = Arc::new(ReadinessState { pool });

    let products = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(product_state);

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state);

    Router::new()
        .merge(health)
        .merge(products)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
