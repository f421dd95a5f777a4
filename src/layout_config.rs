//! Engine configuration – capacity tables, page geometry and label grid
//! constants. Every field has a default, so a partial JSON file only
//! overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTable;
use crate::error::PrintError;
use crate::grid::GridGeometry;
use crate::pagination::FlowLayout;

/// Page dimensions in PDF points (1 pt = 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width_pt: 612.0,
        height_pt: 792.0,
    };

    /// 2⅝" × 1" roll label.
    pub const ROLL_LABEL: PageSize = PageSize {
        width_pt: 189.0,
        height_pt: 72.0,
    };
}

/// Layout of one continuous (letter-page) document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub title: String,
    pub capacity: CapacityTable,
    pub flow: FlowLayout,
    pub page: PageSize,
    pub margin_x: f32,
}

impl DocumentLayout {
    fn letter(title: &str, capacity: CapacityTable, line_height: f32) -> Self {
        Self {
            title: title.to_string(),
            capacity,
            flow: FlowLayout {
                first_page_top: 300.0,
                continuation_top: 96.0,
                line_height,
                section_gap: line_height,
            },
            page: PageSize::LETTER,
            margin_x: 40.0,
        }
    }
}

/// Germination-sample roll label metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GermLayout {
    pub page: PageSize,
    pub font_family: String,
    pub font_size: f32,
    pub top: f32,
    pub line_height: f32,
    /// Barcode width as a fraction of the label width.
    pub barcode_width_ratio: f32,
    pub barcode_height: f32,
    pub barcode_gap: f32,
}

impl Default for GermLayout {
    fn default() -> Self {
        Self {
            page: PageSize::ROLL_LABEL,
            font_family: "Courier New".to_string(),
            font_size: 11.0,
            top: 4.0,
            line_height: 12.0,
            barcode_width_ratio: 0.9,
            barcode_height: 26.0,
            barcode_gap: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub packing_slip: DocumentLayout,
    pub store_invoice: DocumentLayout,
    pub pick_list: DocumentLayout,
    /// Page size of label sheets.
    pub sheet_page: PageSize,
    pub label_sheet: GridGeometry,
    pub roll_label: PageSize,
    pub germ_label: GermLayout,
    /// Image drawn in the top-left corner of first pages.
    pub logo_path: Option<String>,
    /// Store name and address printed in order-document headers.
    pub store_lines: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            packing_slip: DocumentLayout::letter("Packing Slip", CapacityTable::PACKING_SLIP, 14.0),
            store_invoice: DocumentLayout::letter("Store Invoice", CapacityTable::STORE_INVOICE, 16.0),
            pick_list: DocumentLayout::letter("Pick List", CapacityTable::PICK_LIST, 14.0),
            sheet_page: PageSize::LETTER,
            label_sheet: GridGeometry::default(),
            roll_label: PageSize::ROLL_LABEL,
            germ_label: GermLayout::default(),
            logo_path: None,
            store_lines: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engines cannot run with. Called once at
    /// startup, before any document is flowed.
    pub fn validate(&self) -> Result<(), PrintError> {
        for layout in [&self.packing_slip, &self.store_invoice, &self.pick_list] {
            layout.capacity.validate(&layout.title)?;
            if layout.flow.line_height <= 0.0 {
                return Err(PrintError::Config(format!(
                    "{}: line height must be positive",
                    layout.title
                )));
            }
        }
        let shape = self.label_sheet.shape;
        if shape.rows == 0 || shape.cols == 0 {
            return Err(PrintError::Config("label sheet grid must have rows and columns".to_string()));
        }
        for page in [self.sheet_page, self.roll_label, self.germ_label.page] {
            if page.width_pt <= 0.0 || page.height_pt <= 0.0 {
                return Err(PrintError::Config(format!(
                    "page size {}×{} is not positive",
                    page.width_pt, page.height_pt
                )));
            }
        }
        Ok(())
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, PrintError> {
        let config: Self = serde_json::from_str(json).map_err(|e| PrintError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PrintError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PrintError::Config(format!("reading '{}': {e}", path.display())))?;
        Self::from_json(&json)
    }
}
