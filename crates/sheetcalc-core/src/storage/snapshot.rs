//! JSON snapshots: every stored field of every non-blank cell.
//!
//! Unlike .grd files, loading a snapshot does not re-evaluate anything. The
//! stored values, edges and cycle flags are restored as written, then the
//! edges are checked for consistency.

use crate::document::{GridDimensions, Workbook};
use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use sheetcalc_engine::engine::{Cell, blank_grid};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub dimensions: GridDimensions,
    /// Cells that differ from a blank cell, in row-major order
    pub cells: Vec<Cell>,
}

impl Snapshot {
    pub fn from_workbook(workbook: &Workbook) -> Snapshot {
        let cells = workbook
            .cells()
            .filter(|cell| **cell != Cell::new_blank(cell.location.clone()))
            .cloned()
            .collect();
        Snapshot {
            name: workbook.name.clone(),
            dimensions: workbook.dimensions(),
            cells,
        }
    }

    /// Rebuild a workbook from the snapshot, rejecting cells outside the
    /// grid, duplicate locations and one-sided dependency edges.
    pub fn into_workbook(self) -> Result<Workbook> {
        let dimensions = GridDimensions::new(self.dimensions.columns, self.dimensions.rows)?;
        let mut grid = blank_grid(dimensions.columns, dimensions.rows);
        let mut seen = HashSet::new();

        for cell in self.cells {
            if !seen.insert(cell.location.clone()) {
                return Err(SheetError::InvalidLocation(format!(
                    "{} appears twice",
                    cell.location
                )));
            }
            match grid.get_mut(&cell.location) {
                Some(slot) => *slot = cell,
                None => return Err(SheetError::UnknownLocation(cell.location.to_string())),
            }
        }

        let workbook = Workbook {
            grid,
            dimensions,
            name: self.name,
            file_path: None,
            modified: false,
        };
        workbook.verify_links()?;
        Ok(workbook)
    }
}

/// Write a workbook snapshot as pretty-printed JSON
pub fn write_snapshot(path: &Path, workbook: &Workbook) -> Result<()> {
    let json = serde_json::to_string_pretty(&Snapshot::from_workbook(workbook))?;
    fs::write(path, json + "\n")?;
    Ok(())
}

/// Read a workbook snapshot
pub fn read_snapshot(path: &Path) -> Result<Workbook> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    snapshot.into_workbook()
}
