//! # Catalog Service エラー定義
//!
//! Catalog Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | HTTP ステータス |
//! |-----------|----------------|
//! | `Validation` | 422 Unprocessable Entity |
//! | `DuplicateName` | 400 Bad Request |
//! | `NotFound` | 404 Not Found |
//! | `Database` | 500 Internal Server Error |

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_domain::DomainError;
use catalog_shared::ErrorResponse;
use thiserror::Error;

/// Catalog Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 入力値の検証失敗（不正なボディ・パス・クエリを含む）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 商品名の重複
    #[error("商品名が重複しています: {0}")]
    DuplicateName(String),

    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] catalog_infra::InfraError),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::Validation(msg),
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        CoreError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for CoreError {
    fn from(rejection: QueryRejection) -> Self {
        CoreError::Validation(rejection.body_text())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CoreError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::validation_error(msg),
            ),
            CoreError::DuplicateName(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::duplicate_name(msg))
            }
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            CoreError::Database(e) => {
                tracing::error!(
                    error = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
