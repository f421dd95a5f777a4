//! Grid placement for label sheets: labels fill a fixed rows×columns grid
//! row-major, one physical sheet per full grid.

use serde::{Deserialize, Serialize};

/// Rows and columns of one physical sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    /// 30-up letter label sheet.
    pub const SHEET_30: GridShape = GridShape { rows: 10, cols: 3 };

    pub fn slots_per_page(&self) -> u32 {
        self.rows * self.cols
    }

    /// Sheets needed for `labels` labels (at least one).
    pub fn pages_for(&self, labels: usize) -> u32 {
        let per_page = self.slots_per_page().max(1) as usize;
        labels.div_ceil(per_page).max(1) as u32
    }

    /// Slot of the `index`-th label (0-based).
    pub fn slot(&self, index: usize) -> GridSlot {
        let per_page = self.slots_per_page().max(1) as usize;
        let cols = self.cols.max(1) as usize;
        let within = index % per_page;
        GridSlot {
            page: (index / per_page) as u32 + 1,
            row: (within / cols) as u32,
            column: (within % cols) as u32,
        }
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::SHEET_30
    }
}

/// One position on one sheet. Pages are 1-based, rows and columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSlot {
    pub page: u32,
    pub row: u32,
    pub column: u32,
}

/// Assign slots to `label_count` labels in input order.
pub fn place(label_count: usize, shape: GridShape) -> Vec<GridSlot> {
    (0..label_count).map(|i| shape.slot(i)).collect()
}

/// Physical geometry of a sheet: where slot (0, 0) sits, the pitch between
/// cells, and per-column / per-row corrections for printer drift. The
/// corrections shift rendered positions only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub shape: GridShape,
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub pitch_x: f32,
    pub pitch_y: f32,
    /// Left, middle, right for a 3-column sheet. Missing entries are 0.
    #[serde(default)]
    pub column_corrections: Vec<f32>,
    #[serde(default)]
    pub row_corrections: Vec<f32>,
}

impl GridGeometry {
    /// Top-left corner of `slot`, corrections applied.
    pub fn origin_of(&self, slot: GridSlot) -> (f32, f32) {
        let dx = self.column_corrections.get(slot.column as usize).copied().unwrap_or(0.0);
        let dy = self.row_corrections.get(slot.row as usize).copied().unwrap_or(0.0);
        (
            self.origin_x + slot.column as f32 * self.pitch_x + dx,
            self.origin_y + slot.row as f32 * self.pitch_y + dy,
        )
    }
}

impl Default for GridGeometry {
    /// 2⅝" × 1" labels, 30 per letter sheet.
    fn default() -> Self {
        Self {
            shape: GridShape::SHEET_30,
            origin_x: 13.5,
            origin_y: 36.0,
            cell_width: 189.0,
            cell_height: 72.0,
            pitch_x: 198.0,
            pitch_y: 72.0,
            column_corrections: vec![0.0, -1.5, -3.0],
            row_corrections: Vec::new(),
        }
    }
}
