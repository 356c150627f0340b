//! 存储与文件操作错误定义

use roomplan_core::entity::{DesignId, FurnitureId};
use thiserror::Error;

/// 存储操作错误
///
/// 返回这些错误时存储状态保持不变。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No active design")]
    NoActiveDesign,

    #[error("Design not found: {0}")]
    DesignNotFound(DesignId),

    #[error("Furniture not found: {0}")]
    FurnitureNotFound(FurnitureId),
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
