//! RoomPlan 状态与文件处理
//!
//! 提供：
//! - `RoomStore` 设计存储（唯一状态所有者）
//! - 基于SQLite的快照持久化
//! - OBJ / JSON 导出
//! - 应用设置（TOML）

pub mod error;
pub mod export;
pub mod native;
pub mod settings;
pub mod store;

pub use error::{FileError, StoreError};
pub use native::SnapshotStorage;
pub use settings::Settings;
pub use store::{RoomStore, StoreSnapshot};
