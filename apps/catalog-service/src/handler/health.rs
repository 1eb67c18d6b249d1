//! # ヘルスチェックハンドラ
//!
//! Catalog Service の稼働状態を確認するためのエンドポイント。
//!
//! ## エンドポイント
//!
//! - `GET /health` - プロセスが応答できるか（liveness）
//! - `GET /health/ready` - データベースに到達できるか（readiness）
//!
//! ## レスポンス例
//!
//! ```json
//! { "status": "healthy", "version": "0.1.0" }
//! ```
//!
//! ```json
//! { "status": "not_ready", "checks": { "database": "error" } }
//! ```

use std::{collections::HashMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use catalog_infra::db;
use catalog_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
use sqlx::SqlitePool;

/// Readiness Check の共有状態
pub struct ReadinessState {
    pub pool: SqlitePool,
}

/// ヘルスチェックエンドポイント
///
/// サーバーが正常に稼働していることを確認するためのエンドポイント。
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check エンドポイント
///
/// データベースへの疎通を確認し、失敗した場合は 503 を返す。
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = match db::ping(&state.pool).await {
        Ok(()) => CheckStatus::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "データベースへの疎通確認に失敗しました");
            CheckStatus::Error
        }
    };

    let response = ReadinessResponse::from_checks(HashMap::from([(
        "database".to_string(),
        database,
    )]));
    let status = match response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, routing::get};
    use http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    async fn readiness_router() -> (Router, SqlitePool) {
        let pool = db::create_in_memory_pool().await.unwrap();
        let state = Arc::new(ReadinessState { pool: pool.clone() });
        let router = Router::new()
            .route("/health/ready", get(readiness_check))
            .with_state(state);
        (router, pool)
    }

    fn ready_request() -> Request<Body> {
        Request::builder()
            .uri("/health/ready")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_checkはhealthyとバージョンを返す() {
        let Json(response) = health_check().await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_checkはdbに到達できれば200を返す() {
        let (router, _pool) = readiness_router().await;

        let response = router.oneshot(ready_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_checkはdbに到達できなければ503を返す() {
        let (router, pool) = readiness_router().await;
        pool.close().await;

        let response = router.oneshot(ready_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "status": "not_ready", "checks": { "database": "error" } })
        );
    }
}
