//! Scene data model and the intent-driven store that owns it.

mod interceptor;
mod store;

pub use interceptor::{ActionLogger, Interceptor, TimingLogger};
pub use store::{Intent, SceneState, SceneStore};

use crate::geometry::ElementRect;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a time-based id unique for the process lifetime.
///
/// Matches the persisted id style (`slide-…`, `el-…`); the counter suffix
/// keeps ids distinct when several entities are created in the same
/// millisecond.
pub fn unique_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{millis}-{n}")
}

/// Kind of a positioned element. Only text boxes exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
}

/// Element-level typography style, applied where runs carry no override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub color: String,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            text_decoration: "none".to_string(),
            color: "#000000".to_string(),
        }
    }
}

/// A positioned, resizable element on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub style: ElementStyle,
    /// Serialized document snapshot, or plain text for fresh elements.
    pub content: String,
}

impl Element {
    /// Default placement and content of a new text box.
    pub fn new_text_box() -> Self {
        Self {
            id: unique_id("el"),
            element_type: ElementType::Text,
            x: 100.0,
            y: 100.0,
            width: 300.0,
            height: 50.0,
            style: ElementStyle::default(),
            content: "Double click to edit".to_string(),
        }
    }

    /// Position and size as a rect for the geometry engine.
    pub fn rect(&self) -> ElementRect {
        ElementRect::new(self.x, self.y, self.width, self.height)
    }

    /// Apply a partial update: shallow merge at the top level with a nested
    /// shallow merge for `style`. `content` is replaced wholesale.
    pub fn apply_update(&mut self, update: &ElementUpdate) {
        if let Some(x) = update.x {
            self.x = x;
        }
        if let Some(y) = update.y {
            self.y = y;
        }
        if let Some(width) = update.width {
            self.width = width;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(style) = &update.style {
            self.style.merge(style);
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
    }
}

impl ElementStyle {
    /// Merge set fields from a style update, keeping the rest.
    pub fn merge(&mut self, update: &StyleUpdate) {
        if let Some(v) = update.font_size {
            self.font_size = v;
        }
        if let Some(v) = &update.font_family {
            self.font_family = v.clone();
        }
        if let Some(v) = &update.font_weight {
            self.font_weight = v.clone();
        }
        if let Some(v) = &update.font_style {
            self.font_style = v.clone();
        }
        if let Some(v) = &update.text_decoration {
            self.text_decoration = v.clone();
        }
        if let Some(v) = &update.color {
            self.color = v.clone();
        }
    }
}

/// Partial element update carried by `Intent::UpdateElement`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ElementUpdate {
    /// Update carrying a new position only.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Update carrying the full rect of a resize result.
    pub fn from_rect(rect: ElementRect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }

    /// Update replacing the document snapshot.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Partial style update nested inside [`ElementUpdate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An ordered collection of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub elements: Vec<Element>,
}

impl Slide {
    /// A fresh empty slide with a generated id.
    pub fn new() -> Self {
        Self {
            id: unique_id("slide"),
            elements: Vec::new(),
        }
    }

    /// The well-known first slide of a new presentation.
    pub fn first() -> Self {
        Self {
            id: "slide-1".to_string(),
            elements: Vec::new(),
        }
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire shape of a presentation as exchanged with the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationData {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slides: Vec<Slide>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_do_not_collide() {
        let ids: Vec<String> = (0..100).map(|_| unique_id("el")).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_update_merges_style_shallowly() {
        let mut element = Element::new_text_box();
        element.apply_update(&ElementUpdate {
            style: Some(StyleUpdate {
                font_weight: Some("bold".into()),
                ..StyleUpdate::default()
            }),
            ..ElementUpdate::default()
        });
        assert_eq!(element.style.font_weight, "bold");
        // Untouched style keys keep their values.
        assert_eq!(element.style.font_family, "Arial");
        assert_eq!(element.style.font_size, 24.0);
    }

    #[test]
    fn test_update_replaces_content_wholesale() {
        let mut element = Element::new_text_box();
        element.apply_update(&ElementUpdate::content("{}"));
        assert_eq!(element.content, "{}");
    }

    #[test]
    fn test_element_wire_shape() {
        let element = Element::new_text_box();
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["style"]["fontSize"], 24.0);
        assert_eq!(value["style"]["textDecoration"], "none");
    }

    #[test]
    fn test_presentation_wire_shape_uses_mongo_id() {
        let data = PresentationData {
            id: "abc".into(),
            title: "Deck".into(),
            slides: vec![Slide::first()],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["_id"], "abc");
        assert_eq!(value["slides"][0]["id"], "slide-1");
    }
}
