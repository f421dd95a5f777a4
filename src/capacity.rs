//! Capacity policy – how many rows fit on each page of a document type and
//! how many pages a given row count needs.

use serde::{Deserialize, Serialize};

use crate::error::PrintError;
use crate::model::Order;

/// Rows available on the first page and on every later page.
///
/// Values are signed so that a bad configuration deserialises and is then
/// reported by [`CapacityTable::validate`] instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityTable {
    pub first_page_capacity: i64,
    pub subsequent_page_capacity: i64,
}

impl CapacityTable {
    pub const PACKING_SLIP: CapacityTable = CapacityTable {
        first_page_capacity: 27,
        subsequent_page_capacity: 43,
    };

    pub const STORE_INVOICE: CapacityTable = CapacityTable {
        first_page_capacity: 25,
        subsequent_page_capacity: 37,
    };

    pub const PICK_LIST: CapacityTable = CapacityTable {
        first_page_capacity: 27,
        subsequent_page_capacity: 43,
    };

    /// Build a table from untrusted values, rejecting non-positive ones.
    pub fn new(document: &str, first: i64, subsequent: i64) -> Result<Self, PrintError> {
        let table = Self {
            first_page_capacity: first,
            subsequent_page_capacity: subsequent,
        };
        table.validate(document)?;
        Ok(table)
    }

    pub fn validate(&self, document: &str) -> Result<(), PrintError> {
        if self.first_page_capacity <= 0 || self.subsequent_page_capacity <= 0 {
            return Err(PrintError::CapacityTableMisconfiguration {
                document: document.to_string(),
                first: self.first_page_capacity,
                subsequent: self.subsequent_page_capacity,
            });
        }
        Ok(())
    }

    fn first(&self) -> u64 {
        self.first_page_capacity.max(1) as u64
    }

    fn subsequent(&self) -> u64 {
        self.subsequent_page_capacity.max(1) as u64
    }

    /// Cumulative rows that fit by the end of page `page` (1-based).
    pub fn threshold(&self, page: u32) -> u64 {
        let page = u64::from(page.max(1));
        self.first() + (page - 1) * self.subsequent()
    }

    /// Unbounded sequence of cumulative thresholds: 27, 70, 113, …
    pub fn thresholds(&self) -> impl Iterator<Item = u64> + '_ {
        (1u32..).map(move |page| self.threshold(page))
    }

    /// Smallest page count whose cumulative capacity holds `rows` rows.
    /// Zero rows still print one page.
    pub fn pages_required(&self, rows: u64) -> u32 {
        if rows <= self.first() {
            return 1;
        }
        let extra = (rows - self.first()).div_ceil(self.subsequent());
        u32::try_from(extra + 1).unwrap_or(u32::MAX)
    }
}

/// Free-function form of [`CapacityTable::pages_required`].
pub fn pages_required(item_count: u64, table: &CapacityTable) -> u32 {
    table.pages_required(item_count)
}

/// Capacity slots an order consumes: one per item, plus one separator row
/// for every non-empty category after the first.
pub fn slots_required(order: &Order) -> u64 {
    let items = order.item_count() as u64;
    let separators = order.non_empty_categories().saturating_sub(1) as u64;
    items + separators
}
