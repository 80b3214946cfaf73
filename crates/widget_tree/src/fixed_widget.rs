//! Headless widget with a fixed natural size
//!
//! Stands in for a platform binding in tests and in hosts that lay out without
//! any native toolkit. The shared [`WidgetMonitor`] lets the owner change the
//! natural size after the widget moved into the tree and inspect what the
//! engine did with it.

use crate::{Arrangeable, Measurable, NativeEvents, Rect, Size};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Observable state shared between a [`FixedWidget`] and its owner
#[derive(Debug, Default)]
pub struct WidgetMonitor {
    natural: Cell<Size>,
    measure_count: Cell<usize>,
    frames: RefCell<Vec<Rect>>,
    /// How many upcoming `set_frame` calls report a natural size change
    pending_resize_reports: Cell<usize>,
}

impl WidgetMonitor {
    pub fn natural_size(&self) -> Size {
        self.natural.get()
    }

    /// Change the natural size. The owner must still call the tree's
    /// `content_changed` hook, exactly like a real binding would.
    pub fn set_natural_size(&self, size: Size) {
        self.natural.set(size);
    }

    /// Number of native measurements performed
    pub fn measure_count(&self) -> usize {
        self.measure_count.get()
    }

    /// Every frame applied, oldest first
    pub fn frames(&self) -> Vec<Rect> {
        self.frames.borrow().clone()
    }

    pub fn last_frame(&self) -> Option<Rect> {
        self.frames.borrow().last().copied()
    }

    /// Make the next `count` frame assignments report a natural size change,
    /// the way a wrapping label does when its width changes.
    pub fn report_resize_on_next_frames(&self, count: usize) {
        self.pending_resize_reports.set(count);
    }
}

/// Widget whose natural size does not depend on the available size
#[derive(Debug, Clone)]
pub struct FixedWidget {
    monitor: Rc<WidgetMonitor>,
}

impl FixedWidget {
    pub fn new(natural: Size) -> Self {
        let monitor = WidgetMonitor::default();
        monitor.natural.set(natural);
        Self {
            monitor: Rc::new(monitor),
        }
    }

    pub fn monitor(&self) -> Rc<WidgetMonitor> {
        Rc::clone(&self.monitor)
    }
}

impl Measurable for FixedWidget {
    fn measure(&self, _available: Size) -> Size {
        self.monitor.measure_count.set(self.monitor.measure_count.get() + 1);
        self.monitor.natural.get()
    }
}

impl Arrangeable for FixedWidget {
    fn set_frame(&mut self, frame: Rect, events: &mut NativeEvents) {
        self.monitor.frames.borrow_mut().push(frame);

        let reports = self.monitor.pending_resize_reports.get();
        if reports > 0 {
            self.monitor.pending_resize_reports.set(reports - 1);
            events.natural_size_changed();
        }
    }
}
