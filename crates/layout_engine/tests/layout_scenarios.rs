//! Integration tests for grid layout negotiation
//! Tests track sizing through the engine, suspension, re-entrancy and the
//! native load lifecycle
//!
//! Every test drives a `LayoutEngine` the way a platform binding would: nodes
//! are created and mutated through the engine, windows are loaded and resized
//! through the lifecycle hooks, and headless `FixedWidget`s stand in for native
//! widgets.

use layout_engine::{LayoutConfig, LayoutEngine};
use proptest::prelude::*;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use widget_tree::{FixedWidget, Insets, NodeId, Rect, Size, Spacing, UserSize, WidgetMonitor};

/// Test-local helper: right edge of a frame (`x + width`)
trait RectRight {
    fn right(&self) -> f32;
}

impl RectRight for Rect {
    fn right(&self) -> f32 {
        self.x + self.width
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A single top-level window and the engine that lays it out
struct Harness {
    engine: LayoutEngine,
    window: NodeId,
}

impl Harness {
    fn new(cols: usize, rows: usize, frame: Rect) -> Self {
        Self::with_config(LayoutConfig::default(), cols, rows, frame)
    }

    fn with_config(config: LayoutConfig, cols: usize, rows: usize, frame: Rect) -> Self {
        init_tracing();
        let mut engine = LayoutEngine::with_config(config).unwrap();
        let window = engine.create_container(cols, rows).unwrap();
        engine.native_resized(window, frame).unwrap();
        Self { engine, window }
    }

    fn leaf(&mut self, width: f32, height: f32) -> (NodeId, Rc<WidgetMonitor>) {
        let widget = FixedWidget::new(Size::new(width, height));
        let monitor = widget.monitor();
        (self.engine.create_leaf(widget), monitor)
    }

    fn add_leaf(&mut self, col: usize, row: usize, width: f32, height: f32) -> NodeId {
        let (id, _) = self.leaf(width, height);
        self.engine.add(self.window, id, col, row).unwrap();
        id
    }

    fn load(&mut self) {
        self.engine.on_load(self.window).unwrap();
        self.engine.on_load_complete(self.window).unwrap();
    }

    fn frame(&self, id: NodeId) -> Rect {
        self.engine.frame(id).expect("node was never placed")
    }

    fn passes(&self) -> u64 {
        self.engine.stats().arrange_passes
    }
}

// ========== Track sizing through the engine ==========

#[test]
fn test_implicit_last_column_absorbs_slack() {
    let mut h = Harness::new(3, 1, Rect::new(0.0, 0.0, 300.0, 20.0));
    let a = h.add_leaf(0, 0, 50.0, 20.0);
    let b = h.add_leaf(1, 0, 40.0, 20.0);
    let c = h.add_leaf(2, 0, 0.0, 20.0);

    h.load();

    assert_eq!(h.frame(a), Rect::new(0.0, 0.0, 50.0, 20.0));
    assert_eq!(h.frame(b), Rect::new(50.0, 0.0, 40.0, 20.0));
    assert_eq!(h.frame(c), Rect::new(90.0, 0.0, 210.0, 20.0));
    assert_eq!(h.passes(), 1);
}

#[test]
fn test_explicit_scaling_column_with_spacing() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 200.0, 20.0));
    h.engine
        .set_spacing(h.window, Spacing::new(10.0, 0.0))
        .unwrap();
    h.engine.set_column_scale(h.window, 0, true).unwrap();
    let a = h.add_leaf(0, 0, 0.0, 20.0);
    let b = h.add_leaf(1, 0, 60.0, 20.0);

    h.load();

    assert_eq!(h.frame(a), Rect::new(0.0, 0.0, 130.0, 20.0));
    assert_eq!(h.frame(b), Rect::new(140.0, 0.0, 60.0, 20.0));
}

#[test]
fn test_insufficient_space_overflows() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 150.0, 20.0));
    let a = h.add_leaf(0, 0, 100.0, 20.0);
    let b = h.add_leaf(1, 0, 100.0, 20.0);

    h.load();

    assert_eq!(h.frame(a).width, 100.0);
    assert_eq!(h.frame(b).width, 100.0);
    assert_eq!(h.frame(b).right(), 200.0);
}

#[test]
fn test_padding_offsets_children() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 60.0));
    h.engine
        .set_padding(h.window, Insets::new(5.0, 10.0, 15.0, 20.0))
        .unwrap();
    let a = h.add_leaf(0, 0, 10.0, 10.0);

    h.load();

    assert_eq!(h.frame(a), Rect::new(5.0, 10.0, 80.0, 30.0));
}

#[test]
fn test_flipped_container_mirrors_vertical_axis() {
    let config = LayoutConfig::default().flipped();
    let mut h = Harness::with_config(config, 1, 2, Rect::new(0.0, 0.0, 100.0, 100.0));
    let top = h.add_leaf(0, 0, 20.0, 20.0);
    let bottom = h.add_leaf(0, 1, 20.0, 20.0);

    h.load();

    assert_eq!(h.frame(top), Rect::new(0.0, 80.0, 100.0, 20.0));
    assert_eq!(h.frame(bottom), Rect::new(0.0, 0.0, 100.0, 80.0));
}

#[test]
fn test_native_resize_rearranges_children() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 100.0, 20.0));
    let a = h.add_leaf(0, 0, 30.0, 20.0);
    let b = h.add_leaf(1, 0, 10.0, 20.0);
    h.load();
    assert_eq!(h.frame(b), Rect::new(30.0, 0.0, 70.0, 20.0));

    h.engine
        .native_resized(h.window, Rect::new(0.0, 0.0, 300.0, 20.0))
        .unwrap();

    assert_eq!(h.frame(a), Rect::new(0.0, 0.0, 30.0, 20.0));
    assert_eq!(h.frame(b), Rect::new(30.0, 0.0, 270.0, 20.0));
    assert_eq!(h.passes(), 2);
}

// ========== Measurement ==========

#[test]
fn test_measurement_is_idempotent() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 100.0, 20.0));
    h.add_leaf(0, 0, 30.0, 12.0);
    h.add_leaf(1, 0, 25.0, 18.0);

    let first = h.engine.natural_size(h.window, Size::UNCONSTRAINED).unwrap();
    let hits = h.engine.stats().measure_hits;
    let second = h.engine.natural_size(h.window, Size::UNCONSTRAINED).unwrap();

    assert_eq!(first, Size::new(55.0, 18.0));
    assert_eq!(first, second);
    assert_eq!(h.engine.stats().measure_hits, hits + 1);
}

/// Unloaded 2x2 table with a cached natural size
struct Table {
    engine: LayoutEngine,
    table: NodeId,
    a: NodeId,
    b: NodeId,
    spare: NodeId,
}

/// Requests stay deferred on an unloaded table, so nothing re-fills the cache
/// behind the test's back
fn measured_table() -> Table {
    init_tracing();
    let mut engine = LayoutEngine::new();
    let table = engine.create_container(2, 2).unwrap();
    let a = engine.create_leaf(FixedWidget::new(Size::new(30.0, 10.0)));
    let b = engine.create_leaf(FixedWidget::new(Size::new(20.0, 10.0)));
    let spare = engine.create_leaf(FixedWidget::new(Size::new(5.0, 5.0)));
    engine.add(table, a, 0, 0).unwrap();
    engine.add(table, b, 1, 0).unwrap();
    engine.natural_size(table, Size::UNCONSTRAINED).unwrap();
    assert!(engine.node(table).unwrap().measure_cache().is_some());
    Table {
        engine,
        table,
        a,
        b,
        spare,
    }
}

fn assert_invalidates(name: &str, mutate: impl FnOnce(&mut Table) -> layout_engine::Result<()>) {
    let mut t = measured_table();
    mutate(&mut t).unwrap();
    assert!(
        t.engine.node(t.table).unwrap().measure_cache().is_none(),
        "{name} left a stale natural size on the container"
    );
}

#[test]
fn test_every_mutator_invalidates_the_container() {
    assert_invalidates("add", |t| t.engine.add(t.table, t.spare, 0, 1).map(|_| ()));
    assert_invalidates("remove", |t| t.engine.remove(t.table, t.a));
    assert_invalidates("move", |t| t.engine.move_child(t.table, t.a, 1, 1).map(|_| ()));
    assert_invalidates("column scale", |t| t.engine.set_column_scale(t.table, 0, true));
    assert_invalidates("row scale", |t| t.engine.set_row_scale(t.table, 1, true));
    assert_invalidates("visibility", |t| t.engine.set_visible(t.b, false));
    assert_invalidates("user size", |t| {
        t.engine.set_user_size(t.a, UserSize::fixed(90.0, 40.0))
    });
    assert_invalidates("min size", |t| t.engine.set_min_size(t.a, Size::new(60.0, 0.0)));
    assert_invalidates("max size", |t| t.engine.set_max_size(t.a, Size::new(10.0, 10.0)));
    assert_invalidates("content", |t| t.engine.content_changed(t.a));
    assert_invalidates("padding", |t| t.engine.set_padding(t.table, Insets::uniform(2.0)));
    assert_invalidates("spacing", |t| {
        t.engine.set_spacing(t.table, Spacing::new(4.0, 4.0))
    });
    assert_invalidates("resize grid", |t| t.engine.resize_grid(t.table, 1, 1).map(|_| ()));
}

#[test]
fn test_visibility_toggle_changes_natural_size() {
    let Table {
        mut engine,
        table,
        b,
        ..
    } = measured_table();
    assert_eq!(
        engine.natural_size(table, Size::UNCONSTRAINED).unwrap(),
        Size::new(50.0, 10.0)
    );

    engine.set_visible(b, false).unwrap();

    assert_eq!(
        engine.natural_size(table, Size::UNCONSTRAINED).unwrap(),
        Size::new(30.0, 10.0)
    );
}

// ========== Scheduling ==========

#[test]
fn test_suspended_adds_run_one_pass() {
    let mut h = Harness::new(10, 1, Rect::new(0.0, 0.0, 500.0, 20.0));
    h.load();
    h.engine.reset_stats();

    h.engine.suspend_layout(h.window).unwrap();
    let leaves: Vec<NodeId> = (0..10).map(|col| h.add_leaf(col, 0, 10.0, 10.0)).collect();
    assert_eq!(h.passes(), 0);
    assert_eq!(h.engine.stats().deferred_requests, 10);

    h.engine.resume_layout(h.window).unwrap();

    assert_eq!(h.passes(), 1);
    for leaf in leaves {
        assert!(h.engine.frame(leaf).is_some());
    }
}

#[test]
fn test_batch_runs_one_pass() {
    let mut h = Harness::new(4, 1, Rect::new(0.0, 0.0, 200.0, 20.0));
    h.load();
    h.engine.reset_stats();

    let leaves: Vec<NodeId> = (0..4)
        .map(|_| h.engine.create_leaf(FixedWidget::new(Size::new(10.0, 10.0))))
        .collect();
    let window = h.window;
    h.engine
        .batch(window, |engine| {
            for (col, leaf) in leaves.iter().enumerate() {
                engine.add(window, *leaf, col, 0)?;
            }
            engine.set_column_scale(window, 0, true)
        })
        .unwrap();

    assert_eq!(h.passes(), 1);
    assert_eq!(h.frame(leaves[0]).width, 170.0);
}

#[test]
fn test_nested_suspension_unwinds_in_both_places() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 100.0));
    let panel = h.engine.create_container(2, 1).unwrap();
    h.engine.add(h.window, panel, 0, 0).unwrap();
    h.load();
    h.engine.reset_stats();

    h.engine.suspend_layout(h.window).unwrap();
    h.engine.suspend_layout(panel).unwrap();
    let (leaf, _) = h.leaf(10.0, 10.0);
    h.engine.add(panel, leaf, 0, 0).unwrap();

    h.engine.resume_layout(h.window).unwrap();
    assert_eq!(h.passes(), 0);
    assert!(h.engine.context().has_pending(panel));

    h.engine.resume_layout(panel).unwrap();
    assert_eq!(h.passes(), 1);
    assert_eq!(h.frame(leaf), Rect::new(0.0, 0.0, 10.0, 100.0));
}

#[test]
fn test_reference_counted_suspend() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 100.0));
    h.load();
    h.engine.reset_stats();

    h.engine.suspend_layout(h.window).unwrap();
    h.engine.suspend_layout(h.window).unwrap();
    h.add_leaf(0, 0, 10.0, 10.0);
    h.engine.resume_layout(h.window).unwrap();
    assert_eq!(h.passes(), 0);

    h.engine.resume_layout(h.window).unwrap();
    assert_eq!(h.passes(), 1);
    assert!(h.engine.resume_layout(h.window).is_err());
}

#[test]
fn test_reentrant_resize_runs_one_followup() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 200.0, 20.0));
    let (label, monitor) = h.leaf(40.0, 20.0);
    monitor.report_resize_on_next_frames(1);
    h.engine.add(h.window, label, 0, 0).unwrap();

    h.load();

    let stats = h.engine.stats();
    assert_eq!(stats.arrange_passes, 2);
    assert_eq!(stats.followup_passes, 1);
    assert_eq!(stats.coalesced_requests, 1);
    assert_eq!(stats.containers_arranged, 2);
    assert!(h.engine.context().leftover().is_empty());
}

#[test]
fn test_followup_limit_carries_requests_over() {
    let config = LayoutConfig::default().with_max_followup_passes(0);
    let mut h = Harness::with_config(config, 2, 1, Rect::new(0.0, 0.0, 200.0, 20.0));
    let (label, monitor) = h.leaf(40.0, 20.0);
    monitor.report_resize_on_next_frames(1);
    h.engine.add(h.window, label, 0, 0).unwrap();

    h.load();
    assert_eq!(h.passes(), 1);
    assert_eq!(h.engine.context().leftover(), &[label]);

    h.engine.request_layout(h.window);
    assert_eq!(h.passes(), 2);
    assert!(h.engine.context().leftover().is_empty());
}

#[test]
fn test_one_pass_arranges_each_container_once() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 200.0, 50.0));
    let left = h.engine.create_container(1, 1).unwrap();
    let right = h.engine.create_container(1, 1).unwrap();
    h.engine.add(h.window, left, 0, 0).unwrap();
    h.engine.add(h.window, right, 1, 0).unwrap();
    let (a, _) = h.leaf(20.0, 20.0);
    let (b, _) = h.leaf(20.0, 20.0);
    h.engine.add(left, a, 0, 0).unwrap();
    h.engine.add(right, b, 0, 0).unwrap();
    h.load();
    h.engine.reset_stats();

    h.engine.request_layout_many(&[a, b, left, h.window]);

    assert_eq!(h.passes(), 1);
    assert_eq!(h.engine.stats().containers_arranged, 3);
}

#[test]
fn test_layout_boundary_limits_the_climb() {
    let mut h = Harness::new(1, 2, Rect::new(0.0, 0.0, 200.0, 100.0));
    let viewport = h.engine.create_container(1, 1).unwrap();
    h.engine.set_layout_boundary(viewport, true).unwrap();
    h.engine.add(h.window, viewport, 0, 0).unwrap();
    let (label, monitor) = h.leaf(40.0, 12.0);
    h.engine.add(viewport, label, 0, 0).unwrap();
    h.add_leaf(0, 1, 10.0, 10.0);
    h.load();
    h.engine.reset_stats();

    monitor.set_natural_size(Size::new(60.0, 12.0));
    h.engine.content_changed(label).unwrap();

    assert_eq!(h.passes(), 1);
    assert_eq!(h.engine.stats().containers_arranged, 1);
}

// ========== Load lifecycle ==========

#[test]
fn test_no_arrangement_before_load_complete() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 50.0));
    let leaf = h.add_leaf(0, 0, 10.0, 10.0);
    assert_eq!(h.passes(), 0);
    assert!(h.engine.frame(leaf).is_none());

    h.engine.on_load(h.window).unwrap();
    h.engine.request_layout(leaf);
    assert_eq!(h.passes(), 0);
    assert!(h.engine.context().has_pending(h.window));

    h.engine.on_load_complete(h.window).unwrap();
    assert_eq!(h.passes(), 1);
    assert_eq!(h.frame(leaf), Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn test_unload_defers_again() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 50.0));
    let leaf = h.add_leaf(0, 0, 10.0, 10.0);
    h.load();

    h.engine.on_unload(h.window).unwrap();
    h.engine.content_changed(leaf).unwrap();

    assert_eq!(h.passes(), 1);
    assert!(h.engine.context().has_pending(h.window));

    h.load();
    assert_eq!(h.passes(), 2);
    assert_eq!(h.engine.context().pending_count(), 0);
}

#[test]
fn test_auto_size_window_follows_content() {
    init_tracing();
    let mut engine = LayoutEngine::new();
    let window = engine.create_container(2, 1).unwrap();
    let panel = FixedWidget::new(Size::ZERO);
    let panel_monitor = panel.monitor();
    engine.set_native_panel(window, panel).unwrap();
    engine.set_auto_size(window, true).unwrap();

    let label = FixedWidget::new(Size::new(50.0, 20.0));
    let label_monitor = label.monitor();
    let a = engine.create_leaf(FixedWidget::new(Size::new(30.0, 10.0)));
    let b = engine.create_leaf(label);
    engine.add(window, a, 0, 0).unwrap();
    engine.add(window, b, 1, 0).unwrap();

    engine.on_load(window).unwrap();
    engine.on_load_complete(window).unwrap();
    assert_eq!(engine.frame(window), Some(Rect::new(0.0, 0.0, 80.0, 20.0)));
    assert_eq!(panel_monitor.last_frame(), Some(Rect::new(0.0, 0.0, 80.0, 20.0)));

    label_monitor.set_natural_size(Size::new(70.0, 25.0));
    engine.content_changed(b).unwrap();

    assert_eq!(engine.frame(window), Some(Rect::new(0.0, 0.0, 100.0, 25.0)));
    assert_eq!(panel_monitor.last_frame(), Some(Rect::new(0.0, 0.0, 100.0, 25.0)));
    assert_eq!(engine.frame(b), Some(Rect::new(30.0, 0.0, 70.0, 25.0)));
}

#[test]
fn test_native_resize_keeps_platform_frame_of_auto_size_window() {
    init_tracing();
    let mut engine = LayoutEngine::new();
    let window = engine.create_container(2, 1).unwrap();
    engine.set_auto_size(window, true).unwrap();
    let label = FixedWidget::new(Size::new(30.0, 10.0));
    let label_monitor = label.monitor();
    let a = engine.create_leaf(label);
    engine.add(window, a, 0, 0).unwrap();
    engine.on_load(window).unwrap();
    engine.on_load_complete(window).unwrap();
    assert_eq!(engine.frame(window), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));

    engine
        .native_resized(window, Rect::new(0.0, 0.0, 400.0, 300.0))
        .unwrap();

    assert_eq!(engine.frame(window), Some(Rect::new(0.0, 0.0, 400.0, 300.0)));
    assert_eq!(engine.frame(a), Some(Rect::new(0.0, 0.0, 30.0, 300.0)));
    assert!(!engine.node(window).unwrap().is_auto_size());

    // Content changes no longer resize the window
    label_monitor.set_natural_size(Size::new(60.0, 10.0));
    engine.content_changed(a).unwrap();
    assert_eq!(engine.frame(window), Some(Rect::new(0.0, 0.0, 400.0, 300.0)));
    assert_eq!(engine.frame(a), Some(Rect::new(0.0, 0.0, 60.0, 300.0)));
}

#[test]
fn test_unloaded_panel_is_skipped_until_it_loads_again() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 100.0, 100.0));
    let panel = h.engine.create_container(1, 1).unwrap();
    h.engine.add(h.window, panel, 0, 0).unwrap();
    let (leaf, monitor) = h.leaf(10.0, 10.0);
    h.engine.add(panel, leaf, 0, 0).unwrap();
    h.load();
    assert_eq!(monitor.frames().len(), 1);

    h.engine.on_unload(panel).unwrap();
    h.engine
        .native_resized(h.window, Rect::new(0.0, 0.0, 200.0, 200.0))
        .unwrap();

    assert_eq!(monitor.frames().len(), 1);
    assert_eq!(h.frame(leaf), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert!(h.engine.context().has_pending(panel));

    h.engine.on_load(panel).unwrap();
    h.engine.on_load_complete(panel).unwrap();

    assert_eq!(monitor.frames().len(), 2);
    assert_eq!(h.frame(panel), Rect::new(0.0, 0.0, 200.0, 200.0));
    assert_eq!(h.frame(leaf), Rect::new(0.0, 0.0, 200.0, 200.0));
}

#[test]
fn test_destroy_relays_out_parent() {
    let mut h = Harness::new(2, 1, Rect::new(0.0, 0.0, 100.0, 20.0));
    let a = h.add_leaf(0, 0, 30.0, 20.0);
    let b = h.add_leaf(1, 0, 10.0, 20.0);
    h.load();
    h.engine.set_column_scale(h.window, 0, true).unwrap();
    assert_eq!(h.frame(a).width, 90.0);

    h.engine.destroy(b).unwrap();

    assert_eq!(h.frame(a).width, 100.0);
    assert!(!h.engine.tree().is_alive(b));
}

#[test]
fn test_pass_timings_are_recorded() {
    let mut h = Harness::new(1, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
    h.add_leaf(0, 0, 5.0, 5.0);
    h.load();

    let summary = perf::global_metrics().lock().unwrap().summary();
    assert!(summary.total_arranges >= 1);
}

proptest! {
    #[test]
    fn prop_row_of_leaves_fills_window(widths in proptest::collection::vec(0u16..50, 1..6)) {
        let mut h = Harness::new(widths.len(), 1, Rect::new(0.0, 0.0, 400.0, 20.0));
        let leaves: Vec<NodeId> = widths
            .iter()
            .enumerate()
            .map(|(col, &w)| h.add_leaf(col, 0, w as f32, 20.0))
            .collect();
        h.load();

        let mut x = 0.0;
        for (leaf, &w) in leaves.iter().zip(&widths) {
            let frame = h.frame(*leaf);
            prop_assert_eq!(frame.x, x);
            if *leaf != leaves[leaves.len() - 1] {
                prop_assert_eq!(frame.width, w as f32);
            }
            x = frame.right();
        }
        prop_assert_eq!(x, 400.0);
    }
}
