//! # 商品ハンドラ
//!
//! 商品カタログの CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `POST /products/` - 商品登録
//! - `GET /products/` - 商品一覧（`price_gte` で最低価格を指定可能）
//! - `GET /products/{id}` - 商品取得
//! - `PUT /products/{id}` - 商品の部分更新（merge-patch）
//! - `DELETE /products/{id}` - 商品削除
//!
//! 末尾スラッシュなしの `/products` も同じハンドラで受け付ける。
//!
//! ボディ・パス・クエリの解析失敗は axum の既定応答ではなく
//! [`CoreError::Validation`]（422）として返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path,
        Query,
        State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use catalog_domain::product::{Product, ProductId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::CoreError,
    usecase::{CreateProductInput, ProductUseCaseImpl, UpdateProductInput},
};

/// 商品 API の共有状態
pub struct ProductState {
    pub usecase: ProductUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 商品 DTO
#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id:          i64,
    pub name:        String,
    pub price:       f64,
    pub quantity:    i64,
    pub description: Option<String>,
    pub category:    Option<String>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id:          product.id().as_i64(),
            name:        product.name().to_string(),
            price:       product.price().value(),
            quantity:    product.quantity().value(),
            description: product.description().map(str::to_string),
            category:    product.category().map(str::to_string),
        }
    }
}

/// 商品登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name:        String,
    pub price:       f64,
    pub quantity:    i64,
    pub description: Option<String>,
    pub category:    Option<String>,
}

/// 商品更新リクエスト
///
/// キーの省略と明示的な `null` を区別するため、全フィールドを二重の
/// `Option` で受ける。省略時は `None`、`null` は `Some(None)`。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub name:        Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub price:       Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub quantity:    Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category:    Option<Option<String>>,
}

/// キーが存在する場合に呼ばれ、値（`null` を含む）を `Some` で包む
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// 商品一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub price_gte: Option<f64>,
}

/// 商品削除レスポンス
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub message: String,
}

// --- ハンドラ ---

/// POST /products/
///
/// 商品を登録する。
///
/// ## レスポンス
///
/// - `200 OK`: 採番済みの商品
/// - `400 Bad Request`: 商品名の重複
/// - `422 Unprocessable Entity`: 入力値が不正
pub async fn create_product(
    State(state): State<Arc<ProductState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Json(req) = payload?;
    let input = CreateProductInput {
        name:        req.name,
        price:       req.price,
        quantity:    req.quantity,
        description: req.description,
        category:    req.category,
    };

    let product = state.usecase.create_product(input).await?;

    Ok((StatusCode::OK, Json(ProductDto::from(product))))
}

/// GET /products/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 商品
/// - `404 Not Found`: 商品が見つからない
/// - `422 Unprocessable Entity`: ID が整数でない
pub async fn get_product(
    State(state): State<Arc<ProductState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;

    let product = state.usecase.get_product(ProductId::new(id)).await?;

    Ok((StatusCode::OK, Json(ProductDto::from(product))))
}

/// PUT /products/{id}
///
/// 指定されたフィールドのみを更新し、更新後の商品全体を返す。
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の商品
/// - `400 Bad Request`: 他の商品と商品名が重複
/// - `404 Not Found`: 商品が見つからない
/// - `422 Unprocessable Entity`: 入力値が不正
pub async fn update_product(
    State(state): State<Arc<ProductState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let input = UpdateProductInput {
        name:        req.name,
        price:       req.price,
        quantity:    req.quantity,
        description: req.description,
        category:    req.category,
    };

    let product = state
        .usecase
        .update_product(ProductId::new(id), input)
        .await?;

    Ok((StatusCode::OK, Json(ProductDto::from(product))))
}

/// DELETE /products/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 削除完了メッセージ
/// - `404 Not Found`: 商品が見つからない
pub async fn delete_product(
    State(state): State<Arc<ProductState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Path(id) = id?;

    state.usecase.delete_product(ProductId::new(id)).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteProductResponse {
            message: "Product deleted successfully".to_string(),
        }),
    ))
}

/// GET /products/
///
/// 商品を登録順に返す。該当がなければ空配列。
///
/// ## レスポンス
///
/// - `200 OK`: 商品の配列
/// - `422 Unprocessable Entity`: `price_gte` が負、または数値でない
pub async fn list_products(
    State(state): State<Arc<ProductState>>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Query(query) = query?;

    let products = state.usecase.list_products(query.price_gte).await?;
    let items: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();

    Ok((StatusCode::OK, Json(items)))
}
