//! Grid containers: child slots, scaling flags, padding and spacing

use crate::{Axis, Insets, NativePanel, NodeId, Result, Scalable, Spacing, TreeError};
use serde::{Deserialize, Serialize};

/// Grid coordinate of a child slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub col: usize,
    pub row: usize,
}

impl CellPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Track index along an axis
    pub fn track(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.col,
            Axis::Vertical => self.row,
        }
    }
}

/// A 2-D grid of child slots
///
/// Position is the key: insertion order never matters. Slots are stored row-major.
#[derive(Debug)]
pub struct GridContainer {
    cols: usize,
    rows: usize,
    cells: Vec<Option<NodeId>>,
    column_scaling: Vec<bool>,
    row_scaling: Vec<bool>,
    /// Insets between the container edge and its tracks
    pub padding: Insets,
    /// Gap between adjacent tracks
    pub spacing: Spacing,
    /// Vertical axis grows upward from the bottom edge
    pub flipped: bool,
    /// Native panel that receives the container's own frame
    pub(crate) native: Option<Box<dyn NativePanel>>,
}

impl GridContainer {
    /// Create an empty grid
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![None; cols * rows],
            column_scaling: vec![false; cols],
            row_scaling: vec![false; rows],
            padding: Insets::ZERO,
            spacing: Spacing::ZERO,
            flipped: false,
            native: None,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Fail with `CellOutOfRange` unless `(col, row)` lies inside the grid
    pub fn check_cell(&self, col: usize, row: usize) -> Result<CellPos> {
        if col >= self.cols || row >= self.rows {
            return Err(TreeError::CellOutOfRange {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(CellPos::new(col, row))
    }

    /// Occupant of a slot
    pub fn get(&self, pos: CellPos) -> Option<NodeId> {
        if pos.col >= self.cols || pos.row >= self.rows {
            return None;
        }
        self.cells[self.slot(pos)]
    }

    /// Put `child` into a slot and return the previous occupant
    pub(crate) fn put(&mut self, pos: CellPos, child: Option<NodeId>) -> Option<NodeId> {
        let slot = self.slot(pos);
        std::mem::replace(&mut self.cells[slot], child)
    }

    /// Every occupied slot in row-major order
    pub fn occupants(&self) -> impl Iterator<Item = (CellPos, NodeId)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(slot, cell)| {
            cell.map(|id| (CellPos::new(slot % self.cols, slot / self.cols), id))
        })
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.occupants().map(|(_, id)| id).collect()
    }

    /// Reallocate to a new shape. Occupants and scaling flags inside the new
    /// bounds keep their position; occupants outside are returned.
    pub(crate) fn resize(&mut self, cols: usize, rows: usize) -> Vec<NodeId> {
        let mut cells = vec![None; cols * rows];
        let mut released = Vec::new();

        for (pos, id) in self.occupants() {
            if pos.col < cols && pos.row < rows {
                cells[pos.row * cols + pos.col] = Some(id);
            } else {
                released.push(id);
            }
        }

        self.column_scaling.resize(cols, false);
        self.row_scaling.resize(rows, false);
        self.cells = cells;
        self.cols = cols;
        self.rows = rows;
        released
    }

    fn slot(&self, pos: CellPos) -> usize {
        pos.row * self.cols + pos.col
    }

    fn scaling(&self, axis: Axis) -> &[bool] {
        match axis {
            Axis::Horizontal => &self.column_scaling,
            Axis::Vertical => &self.row_scaling,
        }
    }
}

impl Scalable for GridContainer {
    fn track_count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.cols,
            Axis::Vertical => self.rows,
        }
    }

    fn is_scaling(&self, axis: Axis, index: usize) -> bool {
        self.scaling(axis).get(index).copied().unwrap_or(false)
    }

    fn set_scaling(&mut self, axis: Axis, index: usize, scale: bool) -> Result<()> {
        let flags = match axis {
            Axis::Horizontal => &mut self.column_scaling,
            Axis::Vertical => &mut self.row_scaling,
        };
        let count = flags.len();
        let flag = flags
            .get_mut(index)
            .ok_or(TreeError::TrackOutOfRange { index, count })?;
        *flag = scale;
        Ok(())
    }
}
