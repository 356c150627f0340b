//! 应用设置
//!
//! 保存在平台配置目录下的 `roomplan/settings.toml`，文件不存在时使用默认值。

use crate::error::FileError;
use crate::native::DEFAULT_NAMESPACE;
use roomplan_core::hit::HitTestMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 2D缩放的允许范围（像素/米）
pub const MIN_CANVAS_SCALE: f64 = 10.0;
pub const MAX_CANVAS_SCALE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// 快照命名空间
    pub namespace: String,
    /// 数据库路径，缺省时使用平台数据目录
    pub database_path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            database_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub default_scale: f64,
    pub width: f32,
    pub height: f32,
    pub hit_test: HitTestMode,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            default_scale: 20.0,
            width: 1200.0,
            height: 800.0,
            hit_test: HitTestMode::Circular,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// 轨道相机阻尼系数
    pub damping: f64,
    /// 模型文件根目录，目录中的 `/furniture/models/...` 引用相对于它解析
    pub assets_dir: PathBuf,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            damping: 0.1,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// 应用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub storage: StorageSettings,
    pub canvas: CanvasSettings,
    pub viewer: ViewerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage: StorageSettings::default(),
            canvas: CanvasSettings::default(),
            viewer: ViewerSettings::default(),
        }
    }
}

impl Settings {
    /// 平台配置目录下的默认路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roomplan").join("settings.toml"))
    }

    /// 从文件加载，文件不存在时返回默认值
    pub fn load_from_file(path: &Path) -> Result<Self, FileError> {
        if !path.exists() {
            debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), FileError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FileError> {
        if self.storage.namespace.trim().is_empty() {
            return Err(FileError::InvalidSettings(
                "Storage namespace must not be empty".to_string(),
            ));
        }
        let scale = self.canvas.default_scale;
        if !(MIN_CANVAS_SCALE..=MAX_CANVAS_SCALE).contains(&scale) {
            return Err(FileError::InvalidSettings(format!(
                "Canvas scale {} must be within [{}, {}]",
                scale, MIN_CANVAS_SCALE, MAX_CANVAS_SCALE
            )));
        }
        if self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            return Err(FileError::InvalidSettings(
                "Canvas dimensions must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.viewer.damping) {
            return Err(FileError::InvalidSettings(format!(
                "Damping {} must be within [0, 1]",
                self.viewer.damping
            )));
        }
        self.log_level()?;
        Ok(())
    }

    /// 日志级别
    pub fn log_level(&self) -> Result<tracing::Level, FileError> {
        self.log_level.parse().map_err(|_| {
            FileError::InvalidSettings(format!("Unknown log level: {}", self.log_level))
        })
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        self.storage.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("roomplan"))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roomplan.db")
        })
    }
}
