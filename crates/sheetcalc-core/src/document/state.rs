use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use sheetcalc_engine::engine::{Cell, CellRef, Grid, blank_grid, format_value};
use std::path::PathBuf;

/// Name given to a workbook until it is renamed.
pub const DEFAULT_NAME: &str = "Untitled Workbook";

/// Upper bound on the number of cells in a grid.
pub(crate) const MAX_GRID_CELLS: usize = 1_000_000;

/// Column and row count of the grid. Fixed for the workbook's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub columns: usize,
    pub rows: usize,
}

impl GridDimensions {
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        let cells = columns.checked_mul(rows).unwrap_or(usize::MAX);
        if columns == 0 || rows == 0 || cells > MAX_GRID_CELLS {
            return Err(SheetError::InvalidDimensions { columns, rows });
        }
        Ok(GridDimensions { columns, rows })
    }

    /// Whether the location lies inside the grid.
    pub fn contains(&self, cell_ref: &CellRef) -> bool {
        cell_ref.col < self.columns && cell_ref.row < self.rows
    }
}

impl Default for GridDimensions {
    /// Columns A through Y, rows 1 through 100.
    fn default() -> Self {
        GridDimensions {
            columns: 25,
            rows: 100,
        }
    }
}

/// UI-agnostic workbook: the single owner of every cell.
///
/// All writes go through [`Workbook::set_formula`] and
/// [`Workbook::reset_cell`], which keep each cell's `inputs` mirrored in the
/// `outputs` of the cells it reads from.
pub struct Workbook {
    /// Every addressable cell, created up front and never removed
    pub(crate) grid: Grid,
    pub(crate) dimensions: GridDimensions,
    /// Display name (the workbook title)
    pub name: String,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the workbook has been modified since it was loaded or saved
    pub modified: bool,
}

impl Workbook {
    /// Create a workbook with a blank cell at every location.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new(dimensions: GridDimensions) -> Self {
        Workbook {
            grid: blank_grid(dimensions.columns, dimensions.rows),
            dimensions,
            name: DEFAULT_NAME.to_string(),
            file_path: None,
            modified: false,
        }
    }

    /// Create a workbook and load a file if provided.
    ///
    /// A path that does not exist yet becomes the save target of an empty
    /// workbook.
    pub fn with_file(path: Option<PathBuf>, dimensions: GridDimensions) -> Result<Self> {
        let mut workbook = Self::new(dimensions);
        if let Some(p) = path {
            if p.exists() {
                workbook.load_file(&p)?;
            } else {
                workbook.file_path = Some(p);
            }
        }
        Ok(workbook)
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Read-only view of the whole grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.values()
    }

    /// Look up a cell.
    pub fn get_cell(&self, cell_ref: &CellRef) -> Result<&Cell> {
        self.grid
            .get(cell_ref)
            .ok_or_else(|| SheetError::UnknownLocation(cell_ref.to_string()))
    }

    /// Look up a cell by its A1 name.
    pub fn get_cell_by_name(&self, name: &str) -> Result<&Cell> {
        let cell_ref =
            CellRef::from_str(name).ok_or_else(|| SheetError::InvalidLocation(name.to_string()))?;
        self.get_cell(&cell_ref)
    }

    /// Whether the cell is free of circular references.
    pub fn is_valid(&self, cell_ref: &CellRef) -> Result<bool> {
        Ok(self.get_cell(cell_ref)?.valid)
    }

    /// Text to show for a cell: the cycle marker when invalid, otherwise its value.
    pub fn display_value(&self, cell_ref: &CellRef) -> Result<String> {
        let cell = self.get_cell(cell_ref)?;
        if cell.valid {
            Ok(format_value(&cell.value))
        } else {
            Ok(sheetcalc_engine::engine::CellError::Cycle.marker().to_string())
        }
    }

    pub fn rename(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
            self.modified = true;
        }
    }

    /// Check that every dependency edge is recorded on both of its ends.
    pub fn verify_links(&self) -> Result<()> {
        for (cell_ref, cell) in &self.grid {
            if &cell.location != cell_ref {
                return Err(SheetError::BrokenLink {
                    from: cell_ref.to_string(),
                    to: cell.location.to_string(),
                });
            }
            for input in &cell.inputs {
                let upstream = self
                    .grid
                    .get(input)
                    .ok_or_else(|| SheetError::UnknownLocation(input.to_string()))?;
                if !upstream.outputs.contains(cell_ref) {
                    return Err(SheetError::BrokenLink {
                        from: input.to_string(),
                        to: cell_ref.to_string(),
                    });
                }
            }
            for output in &cell.outputs {
                let downstream = self
                    .grid
                    .get(output)
                    .ok_or_else(|| SheetError::UnknownLocation(output.to_string()))?;
                if !downstream.inputs.contains(cell_ref) {
                    return Err(SheetError::BrokenLink {
                        from: cell_ref.to_string(),
                        to: output.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new(GridDimensions::default())
    }
}
