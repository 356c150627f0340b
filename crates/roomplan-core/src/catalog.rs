//! 家具目录
//!
//! 把商品记录转换为可放置的目录条目，并提供内置目录与本地模型条目。

use crate::color::{defaults, Color};
use crate::design::NewFurnitureItem;
use crate::math::{Triple, UNIT_SCALE, ZERO};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 外部商品记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "modelUrl")]
    pub geometry_url: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// 可放置的家具目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureCatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub furniture_type: String,
    pub model: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub default_position: Triple,
    pub default_rotation: Triple,
    pub default_scale: Triple,
    pub default_color: String,
}

impl FurnitureCatalogEntry {
    /// 生成放置到房间中的新家具，其类型为目录条目ID
    pub fn to_new_item(&self) -> NewFurnitureItem {
        NewFurnitureItem {
            furniture_type: self.id.clone(),
            position: self.default_position,
            rotation: self.default_rotation,
            scale: self.default_scale,
            color: self.default_color.clone(),
            model: Some(self.model.clone()),
            name: Some(self.name.clone()),
            thumbnail: self.thumbnail.clone(),
        }
    }
}

/// 用户提供的本地模型文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalModel {
    pub id: String,
    pub name: String,
    pub path: String,
}

impl LocalModel {
    pub fn to_entry(&self) -> FurnitureCatalogEntry {
        FurnitureCatalogEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            furniture_type: "other".to_string(),
            model: self.path.clone(),
            thumbnail: None,
            default_position: ZERO,
            default_rotation: ZERO,
            default_scale: UNIT_SCALE,
            default_color: default_color_for(None, "other"),
        }
    }
}

/// 商品分类 → 家具类型标签
pub fn type_from_category(category: &str) -> &'static str {
    let category = category.trim();
    if category.is_empty() {
        return "furniture";
    }
    match category.to_lowercase().as_str() {
        "chairs" => "chair",
        "tables" => "table",
        "sofas" => "sofa",
        "storage" => "storage",
        "beds" => "bed",
        _ => "other",
    }
}

/// 木质类型使用木色，其余使用中性灰
pub fn palette_color(furniture_type: &str) -> &'static str {
    match furniture_type {
        "table" | "shelf" | "storage" | "desk" | "cabinet" => defaults::WOOD,
        _ => defaults::NEUTRAL,
    }
}

fn default_color_for(colors: Option<&[String]>, furniture_type: &str) -> String {
    colors
        .into_iter()
        .flatten()
        .find(|c| Color::parse(c).is_some())
        .cloned()
        .unwrap_or_else(|| palette_color(furniture_type).to_string())
}

/// 商品记录转换为目录条目，没有几何模型的记录返回 None
pub fn adapt_product(record: &ProductRecord) -> Option<FurnitureCatalogEntry> {
    let model = record
        .geometry_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())?;
    let furniture_type = type_from_category(&record.category);

    Some(FurnitureCatalogEntry {
        id: record.id.clone(),
        name: record.name.clone(),
        furniture_type: furniture_type.to_string(),
        model: model.to_string(),
        thumbnail: record.thumbnail.clone(),
        default_position: ZERO,
        default_rotation: ZERO,
        default_scale: UNIT_SCALE,
        default_color: default_color_for(Some(&record.colors), furniture_type),
    })
}

pub fn adapt_products(records: &[ProductRecord]) -> Vec<FurnitureCatalogEntry> {
    records.iter().filter_map(adapt_product).collect()
}

fn builtin(
    id: &str,
    name: &str,
    furniture_type: &str,
    model: &str,
    color: &str,
) -> FurnitureCatalogEntry {
    FurnitureCatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
        furniture_type: furniture_type.to_string(),
        model: format!("/furniture/models/{model}"),
        thumbnail: Some(format!("/furniture/thumbnails/{id}.png")),
        default_position: ZERO,
        default_rotation: ZERO,
        default_scale: UNIT_SCALE,
        default_color: color.to_string(),
    }
}

/// 内置目录
pub fn builtin_catalog() -> Vec<FurnitureCatalogEntry> {
    vec![
        builtin("sofa-1", "Modern Sofa", "sofa", "modern chair 11 obj.obj", defaults::NEUTRAL),
        builtin("chair-1", "Lounge Chair", "chair", "the chair modeling.obj", defaults::NEUTRAL),
        builtin("table-1", "Coffee Table", "table", "table-1.glb", defaults::WOOD),
        builtin("bed-1", "Queen Bed", "bed", "modern chair 11 obj.obj", defaults::NEUTRAL),
        builtin("shelf-1", "Bookshelf", "shelf", "shelf-1.glb", defaults::WOOD),
    ]
}

/// 合并多个目录：按ID去重，后出现的覆盖先出现的，保留首次出现的顺序
pub fn merge_catalogs<I>(sources: I) -> Vec<FurnitureCatalogEntry>
where
    I: IntoIterator<Item = Vec<FurnitureCatalogEntry>>,
{
    let mut merged: Vec<FurnitureCatalogEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in sources.into_iter().flatten() {
        match index.get(&entry.id) {
            Some(&i) => merged[i] = entry,
            None => {
                index.insert(entry.id.clone(), merged.len());
                merged.push(entry);
            }
        }
    }
    merged
}

pub fn lookup<'a>(
    catalog: &'a [FurnitureCatalogEntry],
    id: &str,
) -> Option<&'a FurnitureCatalogEntry> {
    catalog.iter().find(|e| e.id == id)
}

/// 家具类型（目录条目ID）对应的目录模型
pub fn model_for<'a>(catalog: &'a [FurnitureCatalogEntry], entry_id: &str) -> Option<&'a str> {
    lookup(catalog, entry_id).map(|e| e.model.as_str())
}

/// 目录中出现的类型标签（按首次出现顺序）
pub fn furniture_types(catalog: &[FurnitureCatalogEntry]) -> Vec<&str> {
    let mut types: Vec<&str> = Vec::new();
    for entry in catalog {
        if !types.contains(&entry.furniture_type.as_str()) {
            types.push(&entry.furniture_type);
        }
    }
    types
}
