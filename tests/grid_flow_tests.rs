//! End-to-end grid interaction flows: select, navigate, edit, filter,
//! sort, and resize against one live `GridView`.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashSet;

use test_case::test_case;

use gridview::grid::{GridView, SelectOptions};
use gridview::types::{
    CellPosition, CellValue, Column, ColumnType, GridMode, GridOptions, Row,
};

fn row(pairs: &[(&str, CellValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn task_columns() -> Vec<Column> {
    vec![
        Column::new("id", "Id").kind(ColumnType::Number).editable(false),
        Column::new("title", "Title"),
        Column::new("priority", "Priority").kind(ColumnType::Number),
        Column::new("status", "Status"),
        Column::new("done", "Done").kind(ColumnType::Checkbox),
    ]
}

fn task_rows() -> Vec<Row> {
    vec![
        row(&[
            ("id", CellValue::Number(1.0)),
            ("title", "write report".into()),
            ("priority", CellValue::Number(3.0)),
            ("status", "open".into()),
            ("done", CellValue::Bool(false)),
        ]),
        row(&[
            ("id", CellValue::Number(2.0)),
            ("title", "review budget".into()),
            ("priority", CellValue::Number(1.0)),
            ("status", "open".into()),
            ("done", CellValue::Bool(false)),
        ]),
        row(&[
            ("id", CellValue::Number(3.0)),
            ("title", "archive files".into()),
            ("priority", CellValue::Number(2.0)),
            ("status", "closed".into()),
            ("done", CellValue::Bool(true)),
        ]),
    ]
}

fn grid() -> GridView {
    let options = GridOptions {
        mode: GridMode::Edit,
        ..GridOptions::default()
    };
    let mut g = GridView::new(task_columns(), options);
    g.set_rows(task_rows());
    g
}

#[test]
fn test_select_and_arrow_navigation_flow() {
    let mut g = grid();

    g.pointer_down(0, "title", false);
    g.pointer_up();
    assert_eq!(g.active_position(), Some(CellPosition::new(0, "title")));

    assert!(g.handle_key("ArrowDown", false));
    assert_eq!(g.active_position(), Some(CellPosition::new(1, "title")));

    assert!(g.handle_key("ArrowRight", false));
    assert_eq!(g.active_position(), Some(CellPosition::new(1, "priority")));
}

#[test]
fn test_edit_commit_under_active_sort() {
    let mut g = grid();
    g.toggle_sort("priority");
    // Ascending by priority: ids 2, 3, 1
    assert_eq!(g.row_id_at(0).unwrap(), "2");

    assert!(g.begin_edit(0, "priority"));
    g.set_draft("9");
    assert!(g.commit_edit());

    // The edit landed on source row id 2, which re-sorted to the bottom
    assert_eq!(g.row_id_at(2).unwrap(), "2");
    let edited = g
        .get_data()
        .iter()
        .find(|r| r.get("id") == Some(&CellValue::Number(2.0)))
        .unwrap();
    assert_eq!(edited.get("priority"), Some(&CellValue::Number(9.0)));
}

#[test]
fn test_filter_and_search_are_conjunctive() {
    let mut g = grid();
    let open: HashSet<String> = ["open".to_string()].into_iter().collect();
    g.set_filter("status", open);
    assert_eq!(g.processed_count(), 2);

    g.set_search("archive");
    // "archive files" is closed; conjunction leaves nothing
    assert_eq!(g.processed_count(), 0);

    g.set_search("");
    assert_eq!(g.processed_count(), 2);
    g.clear_all_filters();
    assert_eq!(g.processed_count(), 3);
}

#[test]
fn test_filter_reshape_cancels_edit() {
    let mut g = grid();
    assert!(g.begin_edit(1, "title"));
    g.set_draft("renamed");

    // A filter that removes the edited row cancels the session
    let closed: HashSet<String> = ["closed".to_string()].into_iter().collect();
    g.set_filter("status", closed);
    assert_eq!(g.processed_count(), 1);
    assert!(!g.is_editing());
    // The draft was not committed anywhere
    assert!(g
        .get_data()
        .iter()
        .all(|r| r.get("title") != Some(&"renamed".into())));
}

#[test]
fn test_click_to_edit_then_escape_flow() {
    let mut g = grid();
    g.pointer_down(0, "title", false);
    g.pointer_up();
    g.pointer_down(0, "title", false);
    g.pointer_up();
    assert!(g.is_editing());

    g.set_draft("scrapped");
    assert!(g.handle_key("Escape", false));
    assert!(!g.is_editing());
    assert_eq!(g.get_data()[0].get("title"), Some(&"write report".into()));
}

#[test]
fn test_tab_commits_and_moves() {
    let mut g = grid();
    g.pointer_down(0, "title", false);
    g.pointer_up();
    g.pointer_down(0, "title", false);
    g.pointer_up();
    g.set_draft("updated title");

    assert!(g.handle_key("Tab", false));
    assert_eq!(g.get_data()[0].get("title"), Some(&"updated title".into()));
    assert_eq!(g.active_position(), Some(CellPosition::new(0, "priority")));
}

#[test_case("ArrowUp", 0, 1 ; "up one row")]
#[test_case("ArrowDown", 2, 1 ; "down one row")]
#[test_case("ArrowLeft", 1, 0 ; "left one column")]
#[test_case("ArrowRight", 1, 2 ; "right one column")]
fn test_arrow_moves(key: &str, expect_row: usize, expect_col: usize) {
    let mut g = grid();
    g.begin_selection(1, "title", SelectOptions::default());
    g.handle_key(key, false);
    assert_eq!(g.active_cell().unwrap(), (expect_row, expect_col));
}

#[test]
fn test_shift_click_range_then_collapse() {
    let mut g = grid();
    g.pointer_down(0, "id", false);
    g.pointer_up();
    g.pointer_down(2, "status", true);
    g.pointer_up();
    assert_eq!(g.selection().unwrap().bounds(), (0, 0, 2, 3));

    // Plain arrow collapses to a single cell again
    g.handle_key("ArrowDown", false);
    let sel = g.selection().unwrap();
    assert_eq!(sel.anchor, sel.extent);
}

#[test]
fn test_column_resize_and_auto_fit() {
    let mut g = grid();
    assert_eq!(g.column_width("title"), 150.0);

    g.begin_column_resize("title", 300.0);
    assert!(g.update_column_resize(380.0));
    g.end_column_resize();
    assert_eq!(g.column_width("title"), 230.0);

    // Longest content "review budget" (13 chars): 13*8+32 = 136
    g.auto_fit_column("title");
    assert_eq!(g.column_width("title"), 136.0);

    g.reset_column_widths();
    assert_eq!(g.column_width("title"), 150.0);
}

#[test]
fn test_viewport_window_tracks_filtering() {
    let columns = vec![Column::new("n", "N").kind(ColumnType::Number)];
    let options = GridOptions {
        row_height: 40.0,
        max_height: 400.0,
        min_render_rows: 8,
        ..GridOptions::default()
    };
    let mut g = GridView::new(columns, options);
    g.set_rows(
        (0..1000)
            .map(|i| row(&[("n", CellValue::Number(f64::from(i)))]))
            .collect(),
    );

    g.set_scroll(4000.0);
    g.scroll_by(-500.0);
    assert_eq!(g.scroll_offset(), 3500.0);
    let w = g.visible_window();
    assert!(w.start < 90 && w.end > 90);
    assert_eq!(w.placeholder_rows, 0);

    // Narrow the data below the render floor: placeholders appear and
    // the scroll clamps back to the shrunken content
    g.set_search("999");
    assert_eq!(g.processed_count(), 1);
    let w = g.visible_window();
    assert_eq!(w.placeholder_rows, 7);
    assert_eq!(g.scroll_offset(), 0.0);
}

#[test]
fn test_checkbox_toggles_without_session() {
    let mut g = grid();
    assert!(g.toggle_checkbox(0, "done"));
    assert_eq!(g.get_data()[0].get("done"), Some(&CellValue::Bool(true)));
    assert!(!g.is_editing());
}

#[test]
fn test_view_mode_blocks_all_editing() {
    let mut g = grid();
    g.set_mode(GridMode::View);
    assert!(!g.begin_edit(0, "title"));
    assert!(!g.toggle_checkbox(0, "done"));
    g.double_click(0, "title");
    assert!(!g.is_editing());
}
