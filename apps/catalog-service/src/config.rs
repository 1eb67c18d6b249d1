//! # Catalog Service 設定
//!
//! 環境変数から Catalog Service サーバーの設定を読み込む。
//!
//! すべての変数にデフォルト値があり、未設定でも起動できる。
//! 値が設定されていて解釈できない場合のみ [`ConfigError`] を返す。

use std::env;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://products.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値を解釈できない
    #[error("{name} の値が不正です: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Catalog Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 接続プールの最大接続数
    pub max_connections: u32,
}

impl CatalogConfig {
    /// 環境変数から設定を読み込む
    ///
    /// | 変数名 | デフォルト |
    /// |--------|-----------|
    /// | `CATALOG_HOST` | `0.0.0.0` |
    /// | `CATALOG_PORT` | `8000` |
    /// | `DATABASE_URL` | `sqlite://products.db?mode=rwc` |
    /// | `DATABASE_MAX_CONNECTIONS` | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// プロセスの環境変数を書き換えずにテストするために分離している。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("CATALOG_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("CATALOG_PORT", lookup("CATALOG_PORT"), DEFAULT_PORT)?;
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name:  "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
        })
    }

    /// バインドするアドレス文字列（`host:port`）
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
