//! 家具模型加载
//!
//! 只读取模型的包围盒，用于计算自动归一化缩放。加载在 tokio 任务中进行，
//! 结果通过通道回传，由UI线程调用 [`ModelRegistry::pump`] 合并。

use crate::error::LoadError;
use futures::future::BoxFuture;
use roomplan_core::math::{BoundingBox3, Point3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 模型文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Obj,
    Gltf,
}

impl ModelFormat {
    /// 按扩展名识别格式，忽略查询串和片段
    pub fn from_reference(reference: &str) -> Result<Self, LoadError> {
        let path = strip_query(reference);
        if path.trim().is_empty() {
            return Err(LoadError::MissingReference);
        }
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("obj") => Ok(ModelFormat::Obj),
            Some("glb") | Some("gltf") => Ok(ModelFormat::Gltf),
            _ => Err(LoadError::UnsupportedFormat(reference.to_string())),
        }
    }
}

fn strip_query(reference: &str) -> &str {
    reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference)
}

/// 自动归一化缩放
///
/// OBJ 归一化到单位尺寸；其他格式只在最大边超过2时缩小到2。
pub fn auto_scale(format: ModelFormat, bounds: &BoundingBox3) -> f64 {
    let max_dim = bounds.max_dimension();
    if max_dim <= f64::EPSILON {
        return 1.0;
    }
    match format {
        ModelFormat::Obj => 1.0 / max_dim,
        ModelFormat::Gltf if max_dim > 2.0 => 2.0 / max_dim,
        ModelFormat::Gltf => 1.0,
    }
}

/// 从 OBJ 文本的 `v` 记录计算包围盒
pub fn obj_bounds(reference: &str, text: &str) -> Result<BoundingBox3, LoadError> {
    let mut bounds = BoundingBox3::empty();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("v") {
            continue;
        }
        let mut coords = [0.0f64; 3];
        for coord in coords.iter_mut() {
            *coord = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| LoadError::Parse {
                    reference: reference.to_string(),
                    message: format!("malformed vertex: {line}"),
                })?;
        }
        bounds.expand_to_include(&Point3::new(coords[0], coords[1], coords[2]));
    }
    if bounds.is_empty() {
        return Err(LoadError::EmptyGeometry(reference.to_string()));
    }
    Ok(bounds)
}

/// 从 glTF / GLB 的访问器 min/max 计算包围盒
pub fn gltf_bounds(reference: &str, bytes: &[u8]) -> Result<BoundingBox3, LoadError> {
    let document = gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::Parse {
        reference: reference.to_string(),
        message: e.to_string(),
    })?;

    let mut bounds = BoundingBox3::empty();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let bbox = primitive.bounding_box();
            for corner in [bbox.min, bbox.max] {
                bounds.expand_to_include(&Point3::new(
                    corner[0] as f64,
                    corner[1] as f64,
                    corner[2] as f64,
                ));
            }
        }
    }
    if bounds.is_empty() {
        return Err(LoadError::EmptyGeometry(reference.to_string()));
    }
    Ok(bounds)
}

/// 几何来源：返回模型的包围盒
pub trait GeometrySource: Send + Sync {
    fn load_bounds(&self, reference: &str) -> BoxFuture<'static, Result<BoundingBox3, LoadError>>;
}

/// 本地文件几何来源
///
/// 绝对路径存在时直接读取，否则相对于资源根目录解析（用于 `/furniture/models/...` 这类引用）。
#[derive(Debug, Clone)]
pub struct FileGeometrySource {
    root: PathBuf,
}

impl FileGeometrySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(strip_query(reference));
        if path.is_absolute() && path.exists() {
            return path.to_path_buf();
        }
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }
}

impl GeometrySource for FileGeometrySource {
    fn load_bounds(&self, reference: &str) -> BoxFuture<'static, Result<BoundingBox3, LoadError>> {
        let reference = reference.to_string();
        let path = self.resolve(&reference);
        Box::pin(async move {
            let format = ModelFormat::from_reference(&reference)?;
            let bytes = tokio::fs::read(&path).await?;
            match format {
                ModelFormat::Obj => obj_bounds(&reference, &String::from_utf8_lossy(&bytes)),
                ModelFormat::Gltf => gltf_bounds(&reference, &bytes),
            }
        })
    }
}

/// 已加载模型的信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    pub format: ModelFormat,
    pub bounds: BoundingBox3,
    pub auto_scale: f64,
}

/// 模型加载状态
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Loaded(LoadedModel),
    Failed(String),
}

type LoadMessage = (String, Result<BoundingBox3, LoadError>);

/// 模型注册表：按引用缓存加载状态
pub struct ModelRegistry {
    source: Arc<dyn GeometrySource>,
    runtime: Handle,
    states: HashMap<String, LoadState>,
    sender: mpsc::UnboundedSender<LoadMessage>,
    receiver: mpsc::UnboundedReceiver<LoadMessage>,
}

impl ModelRegistry {
    pub fn new(source: Arc<dyn GeometrySource>, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            states: HashMap::new(),
            sender,
            receiver,
        }
    }

    pub fn state(&self, reference: &str) -> Option<&LoadState> {
        self.states.get(reference)
    }

    /// 请求加载；已请求过的引用直接返回当前状态
    pub fn request(&mut self, reference: &str) -> &LoadState {
        if !self.states.contains_key(reference) {
            let state = match ModelFormat::from_reference(reference) {
                Ok(_) => {
                    self.spawn_load(reference);
                    LoadState::Pending
                }
                Err(e) => {
                    warn!("Cannot load model {}: {}", reference, e);
                    LoadState::Failed(e.to_string())
                }
            };
            self.states.insert(reference.to_string(), state);
        }
        &self.states[reference]
    }

    fn spawn_load(&self, reference: &str) {
        debug!("Loading model {}", reference);
        let future = self.source.load_bounds(reference);
        let sender = self.sender.clone();
        let key = reference.to_string();
        self.runtime.spawn(async move {
            let result = future.await;
            // 注册表已被丢弃时忽略结果
            let _ = sender.send((key, result));
        });
    }

    /// 合并已完成的加载结果，返回合并的数量
    pub fn pump(&mut self) -> usize {
        let mut merged = 0;
        while let Ok((reference, result)) = self.receiver.try_recv() {
            let state = match result.and_then(|bounds| {
                let format = ModelFormat::from_reference(&reference)?;
                Ok(LoadedModel {
                    format,
                    bounds,
                    auto_scale: auto_scale(format, &bounds),
                })
            }) {
                Ok(model) => {
                    debug!("Loaded model {} (auto scale {:.4})", reference, model.auto_scale);
                    LoadState::Loaded(model)
                }
                Err(e) => {
                    warn!("Failed to load model {}: {}", reference, e);
                    LoadState::Failed(e.to_string())
                }
            };
            self.states.insert(reference, state);
            merged += 1;
        }
        merged
    }

    pub fn has_pending(&self) -> bool {
        self.states.values().any(|s| matches!(s, LoadState::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FixedSource(BoundingBox3);

    impl GeometrySource for FixedSource {
        fn load_bounds(
            &self,
            reference: &str,
        ) -> BoxFuture<'static, Result<BoundingBox3, LoadError>> {
            let bounds = self.0;
            let fail = reference.contains("broken");
            Box::pin(async move {
                if fail {
                    Err(LoadError::EmptyGeometry("broken".into()))
                } else {
                    Ok(bounds)
                }
            })
        }
    }

    fn cube(size: f64) -> BoundingBox3 {
        BoundingBox3::new(Point3::origin(), Point3::new(size, size / 2.0, size / 4.0))
    }

    async fn settle(registry: &mut ModelRegistry) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while registry.has_pending() {
                registry.pump();
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("model loading did not settle");
    }

    #[test]
    fn test_format_dispatch() {
        assert_eq!(ModelFormat::from_reference("/m/chair.obj").unwrap(), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_reference("/m/table.GLB?v=2").unwrap(), ModelFormat::Gltf);
        assert_eq!(ModelFormat::from_reference("scene.gltf#node").unwrap(), ModelFormat::Gltf);
        assert!(matches!(
            ModelFormat::from_reference("/m/chair.fbx"),
            Err(LoadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ModelFormat::from_reference(""),
            Err(LoadError::MissingReference)
        ));
    }

    #[test]
    fn test_auto_scale() {
        assert!((auto_scale(ModelFormat::Obj, &cube(4.0)) - 0.25).abs() < 1e-12);
        assert!((auto_scale(ModelFormat::Obj, &cube(0.5)) - 2.0).abs() < 1e-12);
        assert!((auto_scale(ModelFormat::Gltf, &cube(4.0)) - 0.5).abs() < 1e-12);
        assert_eq!(auto_scale(ModelFormat::Gltf, &cube(1.5)), 1.0);
        assert_eq!(auto_scale(ModelFormat::Obj, &BoundingBox3::empty()), 1.0);
    }

    #[test]
    fn test_obj_bounds() {
        let text = "# chair\nv 0 0 0\nvn 0 1 0\nvt 0.5 0.5\nv 1 2 -3\nf 1 2 3\n";
        let bounds = obj_bounds("chair.obj", text).unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, -3.0));
        assert_eq!(bounds.max, Point3::new(1.0, 2.0, 0.0));

        assert!(matches!(
            obj_bounds("empty.obj", "# nothing\n"),
            Err(LoadError::EmptyGeometry(_))
        ));
        assert!(matches!(
            obj_bounds("bad.obj", "v 1 two 3\n"),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_resolve_against_root() {
        let source = FileGeometrySource::new("/srv/assets");
        assert_eq!(
            source.resolve("/furniture/models/table-1.glb?x=1"),
            PathBuf::from("/srv/assets/furniture/models/table-1.glb")
        );
        assert_eq!(source.resolve("chair.obj"), PathBuf::from("/srv/assets/chair.obj"));
    }

    #[tokio::test]
    async fn test_registry_loads_and_caches() {
        let mut registry = ModelRegistry::new(Arc::new(FixedSource(cube(4.0))), Handle::current());
        assert_eq!(registry.request("/m/sofa.obj"), &LoadState::Pending);
        settle(&mut registry).await;

        match registry.state("/m/sofa.obj") {
            Some(LoadState::Loaded(model)) => {
                assert_eq!(model.format, ModelFormat::Obj);
                assert!((model.auto_scale - 0.25).abs() < 1e-12);
            }
            other => panic!("unexpected state: {other:?}"),
        }
        // 再次请求不会重新加载
        assert!(matches!(registry.request("/m/sofa.obj"), LoadState::Loaded(_)));
    }

    #[tokio::test]
    async fn test_registry_failures() {
        let mut registry = ModelRegistry::new(Arc::new(FixedSource(cube(1.0))), Handle::current());
        assert!(matches!(registry.request("lamp.fbx"), LoadState::Failed(_)));

        registry.request("broken.glb");
        settle(&mut registry).await;
        assert!(matches!(registry.state("broken.glb"), Some(LoadState::Failed(_))));
    }

    #[tokio::test]
    async fn test_file_source_reads_obj() {
        let dir = std::env::temp_dir().join(format!("roomplan_models_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("box.obj"), "v -1 0 -1\nv 1 3 1\n").await.unwrap();

        let source = FileGeometrySource::new(&dir);
        let bounds = source.load_bounds("/box.obj").await.unwrap();
        assert!((bounds.max_dimension() - 3.0).abs() < 1e-12);

        let missing = source.load_bounds("/missing.obj").await;
        assert!(matches!(missing, Err(LoadError::Io(_))));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
