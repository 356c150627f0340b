//! 房间设计存储
//!
//! [`RoomStore`] 是全部设计、活动设计、选中家具、视图模式和本地模型列表的唯一所有者。
//! 活动设计只以ID保存，因此活动视图与设计集合不会出现分歧。
//!
//! 所有变更要么成功，要么返回 [`StoreError`] 且不修改任何状态。

use crate::error::{FileError, StoreError};
use crate::export;
use chrono::Utc;
use roomplan_core::catalog::LocalModel;
use roomplan_core::design::{
    FurnitureItem, FurniturePatch, NewFurnitureItem, NewRoomDesign, RoomDesign, ViewMode,
};
use roomplan_core::entity::{DesignId, FurnitureId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 持久化快照的格式版本
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// 存储的完整快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub format_version: u32,
    pub designs: Vec<RoomDesign>,
    pub active_design: Option<DesignId>,
    pub selected_furniture: Option<FurnitureId>,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub local_models: Vec<LocalModel>,
}

/// 房间设计存储
#[derive(Debug, Clone, Default)]
pub struct RoomStore {
    designs: Vec<RoomDesign>,
    active: Option<DesignId>,
    selected: Option<FurnitureId>,
    view_mode: ViewMode,
    local_models: Vec<LocalModel>,
    revision: u64,
}

/// 记录警告并返回错误
fn reject<T>(operation: &str, error: StoreError) -> Result<T, StoreError> {
    warn!("{} ignored: {}", operation, error);
    Err(error)
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- 查询 ----

    pub fn designs(&self) -> &[RoomDesign] {
        &self.designs
    }

    pub fn design(&self, id: DesignId) -> Option<&RoomDesign> {
        self.designs.iter().find(|d| d.id == id)
    }

    pub fn active_design_id(&self) -> Option<DesignId> {
        self.active
    }

    pub fn active_design(&self) -> Option<&RoomDesign> {
        self.active.and_then(|id| self.design(id))
    }

    pub fn selected_furniture(&self) -> Option<FurnitureId> {
        self.selected
    }

    /// 活动设计中被选中的家具
    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        let id = self.selected?;
        self.active_design()?.furniture(id)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn local_models(&self) -> &[LocalModel] {
        &self.local_models
    }

    /// 每次成功变更都会递增
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn design_index(&self, id: DesignId) -> Option<usize> {
        self.designs.iter().position(|d| d.id == id)
    }

    fn active_index(&self) -> Result<usize, StoreError> {
        self.active
            .and_then(|id| self.design_index(id))
            .ok_or(StoreError::NoActiveDesign)
    }

    /// 选中的家具不在活动设计中时清除选择
    fn retain_selection(&mut self) {
        if let Some(selected) = self.selected {
            let still_visible = self
                .active_design()
                .is_some_and(|d| d.contains_furniture(selected));
            if !still_visible {
                self.selected = None;
            }
        }
    }

    // ---- 设计 ----

    /// 新建设计并设为活动设计
    pub fn create_design(&mut self, input: NewRoomDesign) -> DesignId {
        let id = DesignId::new();
        let design = input.into_design(id, Utc::now());
        debug!("Created design {} ({})", design.name, id);

        self.designs.push(design);
        self.active = Some(id);
        self.retain_selection();
        self.bump();
        id
    }

    /// 按ID替换设计，刷新修改时间
    pub fn update_design(&mut self, mut design: RoomDesign) -> Result<(), StoreError> {
        let Some(index) = self.design_index(design.id) else {
            return reject("update_design", StoreError::DesignNotFound(design.id));
        };

        design.updated_at = self.designs[index].updated_at;
        design.touch(Utc::now());
        debug!("Updated design {}", design.id);

        self.designs[index] = design;
        self.retain_selection();
        self.bump();
        Ok(())
    }

    /// 删除设计；若为活动设计则同时清除活动设计
    pub fn delete_design(&mut self, id: DesignId) -> Result<RoomDesign, StoreError> {
        let Some(index) = self.design_index(id) else {
            return reject("delete_design", StoreError::DesignNotFound(id));
        };

        let removed = self.designs.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        self.retain_selection();
        debug!("Deleted design {}", id);
        self.bump();
        Ok(removed)
    }

    /// 设置活动设计；未知ID会清除活动设计并返回错误
    pub fn set_active_design(&mut self, id: Option<DesignId>) -> Result<(), StoreError> {
        let result = match id {
            Some(id) if self.design_index(id).is_none() => {
                self.active = None;
                warn!("set_active_design: {}", StoreError::DesignNotFound(id));
                Err(StoreError::DesignNotFound(id))
            }
            other => {
                self.active = other;
                Ok(())
            }
        };
        self.retain_selection();
        self.bump();
        result
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.bump();
        }
    }

    // ---- 家具 ----

    /// 向活动设计添加家具并选中
    pub fn add_furniture(&mut self, input: NewFurnitureItem) -> Result<FurnitureId, StoreError> {
        let index = match self.active_index() {
            Ok(index) => index,
            Err(e) => return reject("add_furniture", e),
        };

        let id = FurnitureId::new();
        let design = &mut self.designs[index];
        debug!("Added {} {} to design {}", input.furniture_type, id, design.id);
        design.furniture.push(input.into_item(id));
        design.touch(Utc::now());

        self.selected = Some(id);
        self.bump();
        Ok(id)
    }

    /// 合并部分字段到活动设计中的家具
    pub fn update_furniture(
        &mut self,
        id: FurnitureId,
        patch: FurniturePatch,
    ) -> Result<(), StoreError> {
        let index = match self.active_index() {
            Ok(index) => index,
            Err(e) => return reject("update_furniture", e),
        };

        let design = &mut self.designs[index];
        let Some(item) = design.furniture_mut(id) else {
            return reject("update_furniture", StoreError::FurnitureNotFound(id));
        };
        patch.apply_to(item);
        design.touch(Utc::now());
        self.bump();
        Ok(())
    }

    /// 从活动设计移除家具；若被选中则清除选择
    pub fn remove_furniture(&mut self, id: FurnitureId) -> Result<FurnitureItem, StoreError> {
        let index = match self.active_index() {
            Ok(index) => index,
            Err(e) => return reject("remove_furniture", e),
        };

        let design = &mut self.designs[index];
        let Some(position) = design.furniture.iter().position(|f| f.id == id) else {
            return reject("remove_furniture", StoreError::FurnitureNotFound(id));
        };
        let removed = design.furniture.remove(position);
        design.touch(Utc::now());

        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!("Removed furniture {}", id);
        self.bump();
        Ok(removed)
    }

    /// 设置选中家具（不校验）
    pub fn set_selected_furniture(&mut self, id: Option<FurnitureId>) {
        if self.selected != id {
            self.selected = id;
            self.bump();
        }
    }

    // ---- 导出与本地模型 ----

    /// 活动设计的 OBJ 文本；没有活动设计时返回空字符串
    pub fn export_design_as_obj(&self) -> String {
        self.active_design()
            .map(export::design_to_obj)
            .unwrap_or_default()
    }

    pub fn export_design_as_json(&self) -> Result<String, FileError> {
        let design = self.active_design().ok_or(StoreError::NoActiveDesign)?;
        export::design_to_json(design)
    }

    /// 替换本地模型列表
    pub fn import_local_models(&mut self, models: Vec<LocalModel>) {
        debug!("Imported {} local models", models.len());
        self.local_models = models;
        self.bump();
    }

    // ---- 快照 ----

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            designs: self.designs.clone(),
            active_design: self.active,
            selected_furniture: self.selected,
            view_mode: self.view_mode,
            local_models: self.local_models.clone(),
        }
    }

    /// 从快照恢复；活动设计必须仍然存在，选择必须属于活动设计
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self {
            designs: snapshot.designs,
            active: None,
            selected: snapshot.selected_furniture,
            view_mode: snapshot.view_mode,
            local_models: snapshot.local_models,
            revision: 0,
        };
        store.active = snapshot
            .active_design
            .filter(|id| store.design_index(*id).is_some());
        store.retain_selection();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::design::RoomShape;
    use roomplan_core::footprint::normalize_outline;
    use roomplan_core::math::Point2;

    fn store_with_design() -> (RoomStore, DesignId) {
        let mut store = RoomStore::new();
        let id = store.create_design(NewRoomDesign::named("Living"));
        (store, id)
    }

    fn chair() -> NewFurnitureItem {
        NewFurnitureItem::new("chair", "#8E9196")
    }

    #[test]
    fn test_create_design_becomes_active() {
        let mut store = RoomStore::new();
        let id = store.create_design(NewRoomDesign {
            name: "Living".into(),
            length: 5.0,
            width: 4.0,
            height: 2.5,
            ..Default::default()
        });

        assert_eq!(store.designs().len(), 1);
        assert_eq!(store.active_design_id(), Some(id));
        let active = store.active_design().unwrap();
        assert!(active.furniture.is_empty());
        assert_eq!(active.shape, RoomShape::Rectangular);
        assert_eq!(active.created_at, active.updated_at);
    }

    #[test]
    fn test_update_then_activate_yields_updated_design() {
        let (mut store, id) = store_with_design();
        let other = store.create_design(NewRoomDesign::named("Office"));
        assert_eq!(store.active_design_id(), Some(other));

        let before = store.design(id).unwrap().updated_at;
        let mut edited = store.design(id).unwrap().clone();
        edited.name = "Lounge".into();
        store.update_design(edited).unwrap();
        store.set_active_design(Some(id)).unwrap();

        let active = store.active_design().unwrap();
        assert_eq!(active.name, "Lounge");
        assert!(active.updated_at >= before);
    }

    #[test]
    fn test_update_active_design_is_visible_immediately() {
        let (mut store, id) = store_with_design();
        let mut edited = store.design(id).unwrap().clone();
        edited.height = 3.0;
        store.update_design(edited).unwrap();

        assert_eq!(store.active_design().unwrap().height, 3.0);
    }

    #[test]
    fn test_update_unknown_design_is_noop() {
        let (mut store, _) = store_with_design();
        let revision = store.revision();
        let ghost = NewRoomDesign::named("Ghost").into_design(DesignId::new(), Utc::now());
        let ghost_id = ghost.id;

        assert_eq!(
            store.update_design(ghost),
            Err(StoreError::DesignNotFound(ghost_id))
        );
        assert_eq!(store.designs().len(), 1);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_add_furniture() {
        let (mut store, _) = store_with_design();
        let first = store.add_furniture(chair()).unwrap();
        let second = store
            .add_furniture(chair().with_position([1.0, 0.0, 1.0]))
            .unwrap();

        let active = store.active_design().unwrap();
        assert_eq!(active.furniture.len(), 2);
        assert_ne!(first, second);
        assert_eq!(store.selected_furniture(), Some(second));
        assert_eq!(store.selected_item().unwrap().position, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_add_without_active_design_is_noop() {
        let mut store = RoomStore::new();
        assert_eq!(store.add_furniture(chair()), Err(StoreError::NoActiveDesign));
        assert!(store.selected_furniture().is_none());
    }

    #[test]
    fn test_update_furniture_position() {
        let (mut store, _) = store_with_design();
        let id = store.add_furniture(chair()).unwrap();
        store
            .update_furniture(id, FurniturePatch::position([1.0, 0.0, -1.0]))
            .unwrap();

        let item = store.active_design().unwrap().furniture(id).unwrap();
        assert_eq!(item.position, [1.0, 0.0, -1.0]);
        assert_eq!(item.scale, [1.0, 1.0, 1.0]);
        assert_eq!(item.color, "#8E9196");
    }

    #[test]
    fn test_update_missing_furniture_is_noop() {
        let (mut store, _) = store_with_design();
        let ghost = FurnitureId::new();
        let before = store.active_design().unwrap().clone();

        assert_eq!(
            store.update_furniture(ghost, FurniturePatch::color("#000000")),
            Err(StoreError::FurnitureNotFound(ghost))
        );
        assert_eq!(store.active_design().unwrap(), &before);
    }

    #[test]
    fn test_remove_selected_furniture_clears_selection() {
        let (mut store, _) = store_with_design();
        let id = store.add_furniture(chair()).unwrap();
        assert_eq!(store.selected_furniture(), Some(id));

        store.remove_furniture(id).unwrap();
        assert!(store.selected_furniture().is_none());
        assert!(store.active_design().unwrap().furniture.is_empty());
    }

    #[test]
    fn test_remove_other_furniture_keeps_selection() {
        let (mut store, _) = store_with_design();
        let a = store.add_furniture(chair()).unwrap();
        let b = store.add_furniture(chair()).unwrap();
        store.set_selected_furniture(Some(b));

        store.remove_furniture(a).unwrap();
        assert_eq!(store.selected_furniture(), Some(b));
    }

    #[test]
    fn test_delete_active_design() {
        let (mut store, id) = store_with_design();
        store.add_furniture(chair()).unwrap();

        store.delete_design(id).unwrap();
        assert!(store.active_design().is_none());
        assert!(store.selected_furniture().is_none());
        assert!(store.designs().is_empty());
    }

    #[test]
    fn test_delete_inactive_design_keeps_active() {
        let (mut store, first) = store_with_design();
        let second = store.create_design(NewRoomDesign::named("Office"));

        store.delete_design(first).unwrap();
        assert_eq!(store.active_design_id(), Some(second));
        assert_eq!(store.designs().len(), 1);
    }

    #[test]
    fn test_set_active_unknown_clears_active() {
        let (mut store, _) = store_with_design();
        let ghost = DesignId::new();

        assert_eq!(
            store.set_active_design(Some(ghost)),
            Err(StoreError::DesignNotFound(ghost))
        );
        assert!(store.active_design().is_none());
    }

    #[test]
    fn test_switching_design_clears_foreign_selection() {
        let (mut store, first) = store_with_design();
        let item = store.add_furniture(chair()).unwrap();
        store.create_design(NewRoomDesign::named("Office"));
        assert!(store.selected_furniture().is_none());

        store.set_active_design(Some(first)).unwrap();
        store.set_selected_furniture(Some(item));
        store.set_active_design(Some(first)).unwrap();
        assert_eq!(store.selected_furniture(), Some(item));
    }

    #[test]
    fn test_freehand_save_scenario() {
        let (mut store, id) = store_with_design();
        let scale = 20.0;
        let outline = normalize_outline(&[
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 100.0),
            Point2::new(200.0, 160.0),
        ])
        .unwrap();

        let mut design = store.active_design().unwrap().clone();
        design.length = outline.extent.x / scale;
        design.width = outline.extent.y / scale;
        design.shape = RoomShape::Custom;
        design.custom_points = Some(outline.points);
        store.update_design(design).unwrap();

        let saved = store.design(id).unwrap();
        assert_eq!(saved.shape, RoomShape::Custom);
        assert_eq!(saved.length, 5.0);
        assert_eq!(saved.width, 3.0);
        assert_eq!(saved.custom_points.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_export_without_active_design() {
        let store = RoomStore::new();
        assert_eq!(store.export_design_as_obj(), "");
        assert!(matches!(
            store.export_design_as_json(),
            Err(FileError::Store(StoreError::NoActiveDesign))
        ));
    }

    #[test]
    fn test_export_active_design() {
        let (mut store, _) = store_with_design();
        store.add_furniture(chair()).unwrap();

        let obj = store.export_design_as_obj();
        assert!(obj.starts_with("# Room Design OBJ Export\n# Name: Living\n"));

        let json = store.export_design_as_json().unwrap();
        assert!(json.contains("\"wallColor\""));
    }

    #[test]
    fn test_revision_tracks_successful_mutations() {
        let mut store = RoomStore::new();
        let r0 = store.revision();
        store.create_design(NewRoomDesign::named("A"));
        let r1 = store.revision();
        assert!(r1 > r0);

        store.remove_furniture(FurnitureId::new()).unwrap_err();
        assert_eq!(store.revision(), r1);

        store.set_view_mode(ViewMode::Plan2D);
        assert!(store.revision() > r1);
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut store, id) = store_with_design();
        let item = store.add_furniture(chair()).unwrap();
        store.set_view_mode(ViewMode::Plan2D);
        store.import_local_models(vec![LocalModel {
            id: "l1".into(),
            name: "Lamp".into(),
            path: "/tmp/lamp.obj".into(),
        }]);

        let restored = RoomStore::from_snapshot(store.snapshot());
        assert_eq!(restored.designs(), store.designs());
        assert_eq!(restored.active_design_id(), Some(id));
        assert_eq!(restored.selected_furniture(), Some(item));
        assert_eq!(restored.view_mode(), ViewMode::Plan2D);
        assert_eq!(restored.local_models().len(), 1);
    }

    #[test]
    fn test_snapshot_restore_drops_dangling_references() {
        let (store, _) = store_with_design();
        let mut snapshot = store.snapshot();
        snapshot.active_design = Some(DesignId::new());
        snapshot.selected_furniture = Some(FurnitureId::new());

        let restored = RoomStore::from_snapshot(snapshot);
        assert!(restored.active_design().is_none());
        assert!(restored.selected_furniture().is_none());
        assert_eq!(restored.designs().len(), 1);
    }
}
