use serde::{Deserialize, Serialize};

use super::enums::ColumnRole;

/// Positional cells of one table row. `None` marks a cell the layout left empty.
pub type RawTableRow = Vec<Option<String>>;

/// A candidate table: header row first, then data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<RawTableRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawTableRow>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&RawTableRow> {
        self.rows.first()
    }

    pub fn data_rows(&self) -> &[RawTableRow] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Column index per canonical role. Unmapped roles stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMapping {
    pub test_name: Option<usize>,
    pub value: Option<usize>,
    pub unit: Option<usize>,
    pub ref_range: Option<usize>,
}

impl HeaderMapping {
    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::TestName => self.test_name,
            ColumnRole::Value => self.value,
            ColumnRole::Unit => self.unit,
            ColumnRole::RefRange => self.ref_range,
        }
    }

    /// Assign `index` to `role` unless the role already has a column.
    /// Returns whether the assignment happened.
    pub fn assign_if_empty(&mut self, role: ColumnRole, index: usize) -> bool {
        let slot = match role {
            ColumnRole::TestName => &mut self.test_name,
            ColumnRole::Value => &mut self.value,
            ColumnRole::Unit => &mut self.unit,
            ColumnRole::RefRange => &mut self.ref_range,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(index);
        true
    }

    /// A table is usable once name, value and reference range are all located.
    pub fn is_usable(&self) -> bool {
        self.test_name.is_some() && self.value.is_some() && self.ref_range.is_some()
    }
}
