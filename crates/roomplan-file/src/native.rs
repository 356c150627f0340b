//! 存储快照的持久化
//!
//! 整个 [`StoreSnapshot`] 序列化为一个 JSON 文本，按命名空间保存在 SQLite 表中。
//! 每次保存在一个事务中整体替换。

use crate::error::FileError;
use crate::store::{RoomStore, StoreSnapshot, SNAPSHOT_FORMAT_VERSION};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::info;

/// 默认命名空间
pub const DEFAULT_NAMESPACE: &str = "room-designs-storage";

/// 创建数据库架构
fn create_schema(conn: &Connection) -> Result<(), FileError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS snapshots (
            namespace TEXT PRIMARY KEY,
            format_version INTEGER NOT NULL,
            data TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// 基于SQLite的快照存储
pub struct SnapshotStorage {
    conn: Connection,
    namespace: String,
}

impl SnapshotStorage {
    /// 打开（或创建）数据库文件
    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self, FileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    /// 内存数据库
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self, FileError> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 保存整个存储
    pub fn save(&self, store: &RoomStore) -> Result<(), FileError> {
        self.save_snapshot(&store.snapshot())
    }

    pub fn save_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), FileError> {
        let data = serde_json::to_string(snapshot)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO snapshots (namespace, format_version, data, saved_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &self.namespace,
                snapshot.format_version,
                &data,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        info!(
            "Saved {} designs to namespace {}",
            snapshot.designs.len(),
            self.namespace
        );
        Ok(())
    }

    /// 读取快照；命名空间不存在时返回 None
    pub fn load_snapshot(&self) -> Result<Option<StoreSnapshot>, FileError> {
        let row: Option<(u32, String)> = self
            .conn
            .query_row(
                "SELECT format_version, data FROM snapshots WHERE namespace = ?1",
                params![&self.namespace],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((version, data)) = row else {
            return Ok(None);
        };

        if version > SNAPSHOT_FORMAT_VERSION {
            return Err(FileError::UnsupportedVersion(format!(
                "Snapshot version {} is newer than supported version {}",
                version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let snapshot: StoreSnapshot = serde_json::from_str(&data)?;
        if snapshot.format_version != version {
            return Err(FileError::InvalidFormat(format!(
                "Snapshot declares version {} but was stored as {}",
                snapshot.format_version, version
            )));
        }
        Ok(Some(snapshot))
    }

    /// 加载存储；命名空间不存在时返回 None
    pub fn load(&self) -> Result<Option<RoomStore>, FileError> {
        let store = self.load_snapshot()?.map(RoomStore::from_snapshot);
        if let Some(store) = &store {
            info!(
                "Loaded {} designs from namespace {}",
                store.designs().len(),
                self.namespace
            );
        }
        Ok(store)
    }

    /// 删除命名空间下的快照
    pub fn clear(&self) -> Result<(), FileError> {
        self.conn.execute(
            "DELETE FROM snapshots WHERE namespace = ?1",
            params![&self.namespace],
        )?;
        Ok(())
    }
}
