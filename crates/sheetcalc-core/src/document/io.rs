use super::{GridDimensions, Workbook};
use crate::error::{Result, SheetError};
use crate::storage::{Format, parse_grd, read_snapshot, write_grd, write_snapshot};
use log::{debug, info};
use std::path::{Path, PathBuf};

const MAX_WORKBOOK_FILE_BYTES: u64 = 64 * 1_048_576; // 64 MiB

fn check_file_size(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_WORKBOOK_FILE_BYTES {
        return Err(SheetError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: workbook file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_WORKBOOK_FILE_BYTES
            ),
        )));
    }
    Ok(())
}

impl Workbook {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SheetError::NoFilePath);
        };
        self.write_to(&path)?;
        Ok(path)
    }

    /// Save to a new path, which becomes the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.write_to(path)?;
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        match Format::from_path(path) {
            Format::Grd => write_grd(path, self)?,
            Format::Json => write_snapshot(path, self)?,
        }
        info!("saved {}", path.display());
        self.modified = false;
        Ok(())
    }

    /// Load from file, replacing every cell.
    ///
    /// A .grd file keeps this workbook's dimensions and replays each entry
    /// through [`Workbook::set_formula`]; a snapshot brings its own. On
    /// error the workbook is left unchanged.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        check_file_size(path)?;

        let mut loaded = match Format::from_path(path) {
            Format::Grd => Self::replay_grd(path, self.dimensions)?,
            Format::Json => read_snapshot(path)?,
        };

        loaded.file_path = Some(path.to_path_buf());
        loaded.modified = false;
        *self = loaded;
        info!("loaded {}", path.display());
        Ok(())
    }

    fn replay_grd(path: &Path, dimensions: GridDimensions) -> Result<Workbook> {
        let entries = parse_grd(path)?;
        let mut workbook = Workbook::new(dimensions);
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            workbook.name = stem.to_string();
        }

        for entry in &entries {
            if !dimensions.contains(&entry.cell_ref) {
                return Err(SheetError::Parse {
                    line: entry.line,
                    message: format!("{} is outside the grid", entry.cell_ref),
                });
            }
            workbook.set_formula(&entry.cell_ref, &entry.text)?;
        }
        debug!("replayed {} entries from {}", entries.len(), path.display());
        Ok(workbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcalc_engine::engine::{CellRef, Value};
    use std::fs;

    fn temp_path(label: &str, ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "sheetcalc_{}_{}_{}_{:?}.{}",
            label,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::thread::current().id(),
            ext,
        ))
    }

    struct Cleanup(PathBuf);
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn sample() -> Workbook {
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("A1", "10").unwrap();
        workbook.set_formula_by_name("A2", "=A1+5").unwrap();
        workbook.set_formula_by_name("B1", "=B2").unwrap();
        workbook.set_formula_by_name("B2", "=B1").unwrap();
        workbook.set_formula_by_name("C1", "note \"quoted\"").unwrap();
        workbook
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut workbook = sample();
        assert!(matches!(workbook.save_file(), Err(SheetError::NoFilePath)));
        assert!(workbook.modified);
    }

    #[test]
    fn test_grd_save_and_load_rebuilds_state() {
        let path = temp_path("roundtrip", "grd");
        let _cleanup = Cleanup(path.clone());

        let mut workbook = sample();
        workbook.save_as(&path).unwrap();
        assert!(!workbook.modified);
        assert_eq!(workbook.save_file().unwrap(), path);

        let loaded = Workbook::with_file(Some(path.clone()), GridDimensions::default()).unwrap();
        assert!(!loaded.modified);
        assert_eq!(loaded.file_path, Some(path.clone()));
        assert_eq!(loaded.name, path.file_stem().unwrap().to_str().unwrap());
        for cell in workbook.cells() {
            let other = loaded.get_cell(&cell.location).unwrap();
            assert_eq!(other.formula, cell.formula);
            assert_eq!(other.value, cell.value);
            assert_eq!(other.inputs, cell.inputs);
            assert_eq!(other.valid, cell.valid);
        }
        assert_eq!(loaded.get_cell(&r("A2")).unwrap().value, Value::Number(15.0));
        assert!(!loaded.is_valid(&r("B1")).unwrap());
        loaded.verify_links().unwrap();
    }

    #[test]
    fn test_json_save_and_load_is_exact() {
        let path = temp_path("snapshot", "json");
        let _cleanup = Cleanup(path.clone());

        let mut workbook = sample();
        workbook.rename("Snapshot");
        workbook.save_as(&path).unwrap();

        let mut loaded = Workbook::default();
        loaded.load_file(&path).unwrap();
        assert_eq!(loaded.name, "Snapshot");
        for cell in workbook.cells() {
            assert_eq!(loaded.get_cell(&cell.location).unwrap(), cell);
        }
    }

    #[test]
    fn test_grd_entry_outside_grid_reports_line() {
        let path = temp_path("outside", "grd");
        let _cleanup = Cleanup(path.clone());
        fs::write(&path, "# header\nA1: 1\nZ1: 2\n").unwrap();

        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("A5", "kept").unwrap();
        let err = workbook.load_file(&path).unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 3, .. }));
        // Failed loads leave the workbook untouched.
        assert_eq!(workbook.get_cell_by_name("A5").unwrap().formula, "kept");
        assert!(workbook.file_path.is_none());
    }

    #[test]
    fn test_grd_reload_keeps_flag_of_cell_feeding_cycle() {
        let path = temp_path("feeder", "grd");
        let _cleanup = Cleanup(path.clone());

        // A2 is entered before the cycle closes; the file replays it last.
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("A2", "=B1").unwrap();
        workbook.set_formula_by_name("B1", "=C1").unwrap();
        workbook.set_formula_by_name("C1", "=B1").unwrap();
        assert!(!workbook.is_valid(&r("A2")).unwrap());
        workbook.save_as(&path).unwrap();

        let mut loaded = Workbook::default();
        loaded.load_file(&path).unwrap();
        for name in ["A2", "B1", "C1"] {
            assert_eq!(
                loaded.get_cell(&r(name)).unwrap(),
                workbook.get_cell(&r(name)).unwrap(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_grd_replays_in_file_order() {
        let path = temp_path("order", "grd");
        let _cleanup = Cleanup(path.clone());
        fs::write(&path, "B1: \"=A1*2\"\nA1: \"4\"\n").unwrap();

        let mut workbook = Workbook::default();
        workbook.load_file(&path).unwrap();
        assert_eq!(workbook.display_value(&r("B1")).unwrap(), "8");
    }
}
