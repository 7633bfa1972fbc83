//! Pre-computed row layout.
//!
//! Computes a prefix-sum offset table over per-row heights once per data
//! change, enabling O(log n) scroll-position lookups for the virtualizer.

use crate::types::Row;

/// Per-row height hook. A `None` or non-finite result falls back to the
/// default height; the render path never fails on a bad hook.
pub type RowHeightFn = std::sync::Arc<dyn Fn(&Row, usize) -> Option<f32>>;

/// Pre-computed vertical layout over the processed row view.
#[derive(Clone)]
pub struct RowLayout {
    /// Cumulative offsets (`offsets[i]` = y of row i's top edge).
    /// Has `len = row_count + 1`; the final entry is the content height.
    offsets: Vec<f32>,
    /// Individual row heights.
    heights: Vec<f32>,
    default_height: f32,
}

impl RowLayout {
    /// Build the offset table for `rows`, using `height_fn` when present.
    pub fn build(rows: &[&Row], default_height: f32, height_fn: Option<&RowHeightFn>) -> Self {
        let default_height = sanitize(default_height, 36.0);
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut heights = Vec::with_capacity(rows.len());
        let mut y: f32 = 0.0;

        for (index, row) in rows.iter().enumerate() {
            offsets.push(y);
            let h = height_fn
                .and_then(|f| f(row, index))
                .map(|h| sanitize(h, default_height))
                .unwrap_or(default_height);
            heights.push(h);
            y += h;
        }
        offsets.push(y);

        RowLayout {
            offsets,
            heights,
            default_height,
        }
    }

    /// Empty layout of a given default height.
    pub fn empty(default_height: f32) -> Self {
        RowLayout {
            offsets: vec![0.0],
            heights: Vec::new(),
            default_height: sanitize(default_height, 36.0),
        }
    }

    pub fn row_count(&self) -> usize {
        self.heights.len()
    }

    pub fn default_height(&self) -> f32 {
        self.default_height
    }

    /// Top edge of a row; rows past the end return the content height.
    pub fn offset_of(&self, row: usize) -> f32 {
        self.offsets
            .get(row)
            .or_else(|| self.offsets.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Height of a row, default for out-of-range indices.
    pub fn height_of(&self, row: usize) -> f32 {
        self.heights.get(row).copied().unwrap_or(self.default_height)
    }

    /// Total content height — sizes the scroll canvas so the native
    /// scrollbar behaves correctly.
    pub fn total_height(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Find the row whose span covers `y` (binary search over offsets).
    ///
    /// `y` below zero maps to row 0; `y` past the end maps to the last row.
    pub fn row_at_y(&self, y: f32) -> usize {
        if self.heights.is_empty() {
            return 0;
        }
        let last = self.heights.len() - 1;
        if y <= 0.0 {
            return 0;
        }
        match self
            .offsets
            .binary_search_by(|pos| pos.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i.min(last),
            Err(i) => i.saturating_sub(1).min(last),
        }
    }
}

fn sanitize(h: f32, fallback: f32) -> f32 {
    if h.is_finite() && h > 0.0 {
        h
    } else {
        fallback
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
    use crate::types::CellValue;
    use std::sync::Arc;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut r = Row::new();
                r.insert("id".into(), CellValue::Number(i as f64));
                r
            })
            .collect()
    }

    #[test]
    fn test_uniform_layout() {
        let data = rows(10);
        let refs: Vec<&Row> = data.iter().collect();
        let layout = RowLayout::build(&refs, 36.0, None);
        assert_eq!(layout.row_count(), 10);
        assert_eq!(layout.total_height(), 360.0);
        assert_eq!(layout.offset_of(3), 108.0);
        assert_eq!(layout.height_of(3), 36.0);
    }

    #[test]
    fn test_row_at_y() {
        let data = rows(10);
        let refs: Vec<&Row> = data.iter().collect();
        let layout = RowLayout::build(&refs, 36.0, None);
        assert_eq!(layout.row_at_y(-5.0), 0);
        assert_eq!(layout.row_at_y(0.0), 0);
        assert_eq!(layout.row_at_y(35.9), 0);
        assert_eq!(layout.row_at_y(36.0), 1);
        assert_eq!(layout.row_at_y(90.0), 2);
        assert_eq!(layout.row_at_y(10_000.0), 9);
    }

    #[test]
    fn test_variable_heights() {
        let data = rows(4);
        let refs: Vec<&Row> = data.iter().collect();
        let hook: RowHeightFn = Arc::new(|row, _| {
            row.get("id")
                .and_then(|v| v.as_number())
                .map(|n| if n as usize % 2 == 0 { 20.0 } else { 50.0 })
        });
        let layout = RowLayout::build(&refs, 36.0, Some(&hook));
        assert_eq!(layout.total_height(), 140.0);
        assert_eq!(layout.offset_of(2), 70.0);
        assert_eq!(layout.row_at_y(69.0), 1);
        assert_eq!(layout.row_at_y(70.0), 2);
    }

    #[test]
    fn test_bad_hook_defaults() {
        let data = rows(3);
        let refs: Vec<&Row> = data.iter().collect();
        let hook: RowHeightFn = Arc::new(|_, i| match i {
            0 => Some(f32::NAN),
            1 => None,
            _ => Some(-10.0),
        });
        let layout = RowLayout::build(&refs, 36.0, Some(&hook));
        assert_eq!(layout.total_height(), 108.0);
    }

    #[test]
    fn test_empty() {
        let layout = RowLayout::empty(36.0);
        assert_eq!(layout.row_count(), 0);
        assert_eq!(layout.total_height(), 0.0);
        assert_eq!(layout.row_at_y(100.0), 0);
    }
}
