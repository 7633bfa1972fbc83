//! Column widths: defaults, resize drags, auto-fit, and persistence.

use std::collections::HashMap;

use crate::types::{Column, DEFAULT_COLUMN_WIDTH, MIN_RESIZE_WIDTH};

/// Backing store for persisted width maps.
///
/// Natively an in-memory map (tests); `localStorage` on wasm32. Failures
/// are swallowed by the caller — persistence is best-effort.
pub trait LayoutStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl LayoutStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// An in-flight column resize drag, created on pointer-down over a column
/// boundary handle and destroyed on pointer-up.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub column_key: String,
    pub start_width: f32,
    pub start_x: f32,
}

/// Manages the `columnKey -> pixel width` map.
///
/// Seeded from column defaults, merged over the persisted map so newly
/// added columns always have a width, then overridden by resize/auto-fit.
pub struct ColumnLayout {
    widths: HashMap<String, f32>,
    persist_key: Option<String>,
    resize: Option<ResizeSession>,
}

impl ColumnLayout {
    /// Seed widths from column defaults, overlaying any persisted map.
    ///
    /// A stored value that fails to parse falls back to defaults without
    /// raising.
    pub fn new(columns: &[Column], persist_key: Option<String>, store: &dyn LayoutStore) -> Self {
        let mut widths: HashMap<String, f32> = columns
            .iter()
            .map(|c| (c.key.clone(), c.width))
            .collect();

        if let Some(ref key) = persist_key {
            if let Some(raw) = store.load(key) {
                if let Ok(stored) = serde_json::from_str::<HashMap<String, f32>>(&raw) {
                    for (k, w) in stored {
                        if widths.contains_key(&k) && w.is_finite() && w > 0.0 {
                            widths.insert(k, w);
                        }
                    }
                }
            }
        }

        ColumnLayout {
            widths,
            persist_key,
            resize: None,
        }
    }

    /// Re-seed after a column set change, keeping overrides for columns
    /// that survive.
    pub fn sync_columns(&mut self, columns: &[Column]) {
        let mut next: HashMap<String, f32> = columns
            .iter()
            .map(|c| (c.key.clone(), c.width))
            .collect();
        for (k, w) in &self.widths {
            if next.contains_key(k) {
                next.insert(k.clone(), *w);
            }
        }
        self.widths = next;
    }

    pub fn width_of(&self, key: &str) -> f32 {
        self.widths.get(key).copied().unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Total pixel width across `columns`, in render order.
    pub fn total_width(&self, columns: &[Column]) -> f32 {
        columns.iter().map(|c| self.width_of(&c.key)).sum()
    }

    /// Begin a resize drag from a boundary handle.
    pub fn begin_resize(&mut self, column_key: &str, pointer_x: f32) {
        self.resize = Some(ResizeSession {
            column_key: column_key.to_string(),
            start_width: self.width_of(column_key),
            start_x: pointer_x,
        });
    }

    /// Update the dragged column's width from the current pointer
    /// position. Returns true if the width changed.
    pub fn update_resize(&mut self, pointer_x: f32, store: &mut dyn LayoutStore) -> bool {
        let Some(session) = self.resize.clone() else {
            return false;
        };
        let next = (session.start_width + (pointer_x - session.start_x)).max(MIN_RESIZE_WIDTH);
        let current = self.width_of(&session.column_key);
        if (next - current).abs() < f32::EPSILON {
            return false;
        }
        self.widths.insert(session.column_key, next);
        self.persist(store);
        true
    }

    /// End the resize drag, if any.
    pub fn end_resize(&mut self) {
        self.resize = None;
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    /// Set a column's width directly (clamped to the resize floor).
    pub fn set_width(&mut self, key: &str, width: f32, store: &mut dyn LayoutStore) {
        self.widths
            .insert(key.to_string(), width.max(MIN_RESIZE_WIDTH));
        self.persist(store);
    }

    /// Auto-fit a column to its longest rendered content:
    /// `clamp(min, max, 8 * max(label, longest formatted value) + 32)`.
    pub fn auto_fit(
        &mut self,
        column: &Column,
        formatted_values: impl Iterator<Item = String>,
        store: &mut dyn LayoutStore,
    ) {
        let mut longest = column.label.chars().count();
        for value in formatted_values {
            longest = longest.max(value.chars().count());
        }
        let mut width = (longest as f32) * 8.0 + 32.0;
        if let Some(min) = column.min_width {
            width = width.max(min);
        }
        if let Some(max) = column.max_width {
            width = width.min(max);
        }
        self.widths.insert(column.key.clone(), width);
        self.persist(store);
    }

    /// Restore defaults and clear the stored entry.
    pub fn reset(&mut self, columns: &[Column], store: &mut dyn LayoutStore) {
        self.widths = columns
            .iter()
            .map(|c| (c.key.clone(), c.width))
            .collect();
        if let Some(ref key) = self.persist_key {
            store.remove(key);
        }
    }

    /// Serialize the full width map under the persist key.
    fn persist(&self, store: &mut dyn LayoutStore) {
        let Some(ref key) = self.persist_key else {
            return;
        };
        if let Ok(json) = serde_json::to_string(&self.widths) {
            store.save(key, &json);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").width(200.0),
            Column::new("qty", "Qty").width(100.0).min_width(80.0).max_width(400.0),
        ]
    }

    #[test]
    fn test_seed_from_defaults() {
        let store = MemoryStore::default();
        let layout = ColumnLayout::new(&columns(), None, &store);
        assert_eq!(layout.width_of("name"), 200.0);
        assert_eq!(layout.width_of("qty"), 100.0);
        assert_eq!(layout.width_of("missing"), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_persisted_overrides_merge() {
        let mut store = MemoryStore::default();
        store.save("grid-a", r#"{"name":320.0,"gone":50.0}"#);
        let layout = ColumnLayout::new(&columns(), Some("grid-a".into()), &store);
        assert_eq!(layout.width_of("name"), 320.0);
        // Stored column no longer present is ignored
        assert_eq!(layout.width_of("qty"), 100.0);
    }

    #[test]
    fn test_corrupt_store_falls_back() {
        let mut store = MemoryStore::default();
        store.save("grid-a", "not json at all {");
        let layout = ColumnLayout::new(&columns(), Some("grid-a".into()), &store);
        assert_eq!(layout.width_of("name"), 200.0);
    }

    #[test]
    fn test_resize_drag_floor() {
        let mut store = MemoryStore::default();
        let mut layout = ColumnLayout::new(&columns(), Some("grid-a".into()), &store);
        layout.begin_resize("name", 500.0);
        assert!(layout.update_resize(560.0, &mut store));
        assert_eq!(layout.width_of("name"), 260.0);
        // Dragging far left clamps at the 60px floor
        assert!(layout.update_resize(0.0, &mut store));
        assert_eq!(layout.width_of("name"), 60.0);
        layout.end_resize();
        assert!(!layout.is_resizing());
        // Width map was persisted
        let stored: HashMap<String, f32> =
            serde_json::from_str(&store.load("grid-a").unwrap()).unwrap();
        assert_eq!(stored.get("name"), Some(&60.0));
    }

    #[test]
    fn test_auto_fit_uses_longest_content() {
        let mut store = MemoryStore::default();
        let cols = columns();
        let mut layout = ColumnLayout::new(&cols, None, &store);
        let values = vec!["short".to_string(), "a much longer value here".to_string()];
        layout.auto_fit(&cols[0], values.into_iter(), &mut store);
        // 24 chars * 8 + 32 = 224
        assert_eq!(layout.width_of("name"), 224.0);
    }

    #[test]
    fn test_auto_fit_min_floor() {
        let mut store = MemoryStore::default();
        let cols = columns();
        let mut layout = ColumnLayout::new(&cols, None, &store);
        // Longest value is 3 chars; "Qty" label also 3: 3*8+32 = 56 < min 80
        layout.auto_fit(&cols[1], vec!["123".to_string()].into_iter(), &mut store);
        assert_eq!(layout.width_of("qty"), 80.0);
    }

    #[test]
    fn test_reset_clears_store() {
        let mut store = MemoryStore::default();
        let cols = columns();
        let mut layout = ColumnLayout::new(&cols, Some("grid-a".into()), &store);
        layout.set_width("name", 300.0, &mut store);
        assert!(store.load("grid-a").is_some());
        layout.reset(&cols, &mut store);
        assert_eq!(layout.width_of("name"), 200.0);
        assert!(store.load("grid-a").is_none());
    }
}
