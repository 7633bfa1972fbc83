//! Viewport state and the visible-row window computation.

use super::RowLayout;

/// Viewport state — the visible slice of the scrollable grid body.
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Vertical scroll position in content coordinates.
    pub scroll_y: f32,
    /// Viewport height in pixels.
    pub height: f32,
    /// Extra rows rendered beyond the viewport on each side.
    pub overscan: usize,
    /// Floor on rendered rows (placeholders fill the gap).
    pub min_render_rows: usize,
    /// Minimum rows kept in the window even when fewer fit.
    pub min_buffer_rows: usize,
}

/// The rows to render for the current scroll position.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VisibleWindow {
    /// First processed-row index to render (inclusive).
    pub start: usize,
    /// One past the last processed-row index to render.
    pub end: usize,
    /// Placeholder rows (no backing data) appended after `end` to honor
    /// the `min_render_rows` floor — they occupy default height so the
    /// canvas does not jump while filtering.
    pub placeholder_rows: usize,
    /// Content-space y of the first rendered row (positions the window).
    pub offset_y: f32,
    /// Total content height (sizes the scroll canvas).
    pub total_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            scroll_y: 0.0,
            height: 600.0,
            overscan: 5,
            min_render_rows: 8,
            min_buffer_rows: 10,
        }
    }
}

impl Viewport {
    /// Clamp the scroll position to the content range.
    pub fn clamp_scroll(&mut self, layout: &RowLayout) {
        let max_y = (layout.total_height() - self.height).max(0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Scroll by a delta, clamped.
    pub fn scroll_by(&mut self, delta_y: f32, layout: &RowLayout) {
        self.scroll_y += delta_y;
        self.clamp_scroll(layout);
    }

    /// Set an absolute scroll position, clamped.
    pub fn set_scroll(&mut self, y: f32, layout: &RowLayout) {
        self.scroll_y = y;
        self.clamp_scroll(layout);
    }

    /// Compute the window of rows intersecting
    /// `[scroll − overscan·h, scroll + height + overscan·h)`.
    ///
    /// A row renders iff its `[offset, offset + height)` interval
    /// intersects that range; placeholder rows pad the window up to the
    /// `min_render_rows` floor.
    pub fn visible_window(&self, layout: &RowLayout) -> VisibleWindow {
        let count = layout.row_count();
        let h = layout.default_height();
        let margin = h * self.overscan as f32;

        if count == 0 {
            return VisibleWindow {
                start: 0,
                end: 0,
                placeholder_rows: self.min_render_rows,
                offset_y: 0.0,
                total_height: layout.total_height(),
            };
        }

        let window_top = self.scroll_y - margin;
        let window_bottom = self.scroll_y + self.height + margin;

        let start = layout.row_at_y(window_top);
        // row_at_y returns the row covering the point; end is one past
        // the last row that actually intersects the window.
        let mut end = layout.row_at_y(window_bottom) + 1;
        if layout.offset_of(end - 1) >= window_bottom {
            end -= 1;
        }
        let mut end = end.min(count).max(start);

        // Keep a minimum buffer of rendered rows around small viewports.
        if end - start < self.min_buffer_rows {
            end = (start + self.min_buffer_rows).min(count);
        }

        // Placeholders only apply when the whole data set is smaller than
        // the floor; mid-scroll windows never need them.
        let placeholder_rows = if count < self.min_render_rows {
            self.min_render_rows - count
        } else {
            0
        };

        VisibleWindow {
            start,
            end,
            placeholder_rows,
            offset_y: layout.offset_of(start),
            total_height: layout.total_height(),
        }
    }

    /// Scroll the minimum distance needed to bring `row` fully into view.
    pub fn scroll_to_row(&mut self, row: usize, layout: &RowLayout) {
        let top = layout.offset_of(row);
        let bottom = top + layout.height_of(row);
        if top < self.scroll_y {
            self.scroll_y = top;
        } else if bottom > self.scroll_y + self.height {
            self.scroll_y = bottom - self.height;
        }
        self.clamp_scroll(layout);
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
    use crate::types::Row;

    fn layout(n: usize) -> RowLayout {
        let data: Vec<Row> = (0..n).map(|_| Row::new()).collect();
        let refs: Vec<&Row> = data.iter().collect();
        RowLayout::build(&refs, 40.0, None)
    }

    fn viewport() -> Viewport {
        Viewport {
            scroll_y: 0.0,
            height: 400.0,
            overscan: 2,
            min_render_rows: 8,
            min_buffer_rows: 4,
        }
    }

    #[test]
    fn test_window_at_top() {
        let layout = layout(1000);
        let vp = viewport();
        let w = vp.visible_window(&layout);
        assert_eq!(w.start, 0);
        // 400px viewport / 40px rows = 10 visible + 2 overscan below
        assert_eq!(w.end, 12);
        assert_eq!(w.placeholder_rows, 0);
        assert_eq!(w.offset_y, 0.0);
        assert_eq!(w.total_height, 40_000.0);
    }

    #[test]
    fn test_window_mid_scroll() {
        let layout = layout(1000);
        let mut vp = viewport();
        vp.scroll_y = 4000.0; // row 100 at top
        let w = vp.visible_window(&layout);
        assert_eq!(w.start, 98); // 2 rows of overscan above
        assert_eq!(w.end, 112); // 10 visible + 2 overscan below
        assert_eq!(w.offset_y, 98.0 * 40.0);
    }

    #[test]
    fn test_window_completeness() {
        // Property: a row renders iff its interval intersects the
        // overscan-extended window.
        let layout = layout(500);
        let vp = Viewport {
            scroll_y: 1234.0,
            height: 371.0,
            overscan: 3,
            min_render_rows: 0,
            min_buffer_rows: 0,
        };
        let w = vp.visible_window(&layout);
        let top = vp.scroll_y - 3.0 * 40.0;
        let bottom = vp.scroll_y + vp.height + 3.0 * 40.0;
        for row in 0..500 {
            let r_top = layout.offset_of(row);
            let r_bottom = r_top + layout.height_of(row);
            let intersects = r_bottom > top && r_top < bottom;
            let rendered = row >= w.start && row < w.end;
            assert_eq!(rendered, intersects, "row {row}");
        }
    }

    #[test]
    fn test_window_at_bottom_clamped() {
        let layout = layout(20);
        let mut vp = viewport();
        vp.set_scroll(100_000.0, &layout);
        assert_eq!(vp.scroll_y, 20.0 * 40.0 - 400.0);
        let w = vp.visible_window(&layout);
        assert_eq!(w.end, 20);
    }

    #[test]
    fn test_placeholders_for_small_data() {
        let layout = layout(3);
        let vp = viewport();
        let w = vp.visible_window(&layout);
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 3);
        assert_eq!(w.placeholder_rows, 5); // floor of 8 minus 3 data rows
    }

    #[test]
    fn test_placeholders_for_empty_data() {
        let layout = RowLayout::empty(40.0);
        let vp = viewport();
        let w = vp.visible_window(&layout);
        assert_eq!(w.start, 0);
        assert_eq!(w.end, 0);
        assert_eq!(w.placeholder_rows, 8);
        assert_eq!(w.total_height, 0.0);
    }

    #[test]
    fn test_min_buffer_rows() {
        let layout = layout(100);
        let vp = Viewport {
            scroll_y: 0.0,
            height: 50.0, // barely two rows visible
            overscan: 0,
            min_render_rows: 0,
            min_buffer_rows: 6,
        };
        let w = vp.visible_window(&layout);
        assert!(w.end - w.start >= 6);
    }

    #[test]
    fn test_scroll_to_row() {
        let layout = layout(100);
        let mut vp = viewport();
        vp.scroll_to_row(50, &layout);
        // Row 50 bottom edge (2040) just inside the 400px viewport
        assert_eq!(vp.scroll_y, 2040.0 - 400.0);
        vp.scroll_to_row(10, &layout);
        assert_eq!(vp.scroll_y, 400.0);
    }
}
