//! User configuration loaded from `config.toml`.

use directories::ProjectDirs;
use serde::Deserialize;
use sheetcalc_core::GridDimensions;
use sheetcalc_core::document::DEFAULT_NAME;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    grid: Option<GridSection>,
    workbook: Option<WorkbookSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    columns: Option<usize>,
    rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkbookSection {
    name: Option<String>,
}

/// Settings resolved from the config file, falling back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub dimensions: GridDimensions,
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dimensions: GridDimensions::default(),
            name: DEFAULT_NAME.to_string(),
        }
    }
}

/// Load the config from `explicit`, or the user config directory.
///
/// Never fails: problems are reported as warnings and the affected
/// settings keep their defaults.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);
    let Some(path) = path else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let file = match read_config_file(&path) {
        Ok(file) => file,
        Err(warning) => {
            warnings.push(warning);
            return (Config::default(), warnings);
        }
    };

    let mut config = Config::default();
    if let Some(grid) = file.grid {
        let columns = grid.columns.unwrap_or(config.dimensions.columns);
        let rows = grid.rows.unwrap_or(config.dimensions.rows);
        match GridDimensions::new(columns, rows) {
            Ok(dimensions) => config.dimensions = dimensions,
            Err(err) => warnings.push(format!("{} in {}", err, path.display())),
        }
    }
    if let Some(name) = file.workbook.and_then(|w| w.name) {
        let name = name.trim();
        if name.is_empty() {
            warnings.push(format!("Ignoring empty workbook name in {}", path.display()));
        } else {
            config.name = name.to_string();
        }
    }

    (config, warnings)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<ConfigFile>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcalc")?;
    Some(proj.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(label: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sheetcalc_config_{}_{}.toml",
            label,
            std::process::id()
        ));
        std::fs::write(&path, content).expect("write temp config");
        path
    }

    #[test]
    fn load_config_reads_all_sections() {
        let path = temp_config(
            "full",
            r#"
[grid]
columns = 10
rows = 20

[workbook]
name = "Budget"
"#,
        );
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(config.dimensions, GridDimensions::new(10, 20).unwrap());
        assert_eq!(config.name, "Budget");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_partial_grid_keeps_defaults() {
        let path = temp_config("partial", "[grid]\nrows = 5\n");
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(config.dimensions.columns, 25);
        assert_eq!(config.dimensions.rows, 5);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_rejects_unknown_fields() {
        let path = temp_config("unknown", "[grid]\ncolour = \"red\"\n");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert!(warnings.iter().any(|w| w.contains("Failed to parse")));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_warns_on_invalid_dimensions() {
        let path = temp_config("zero", "[grid]\ncolumns = 0\n");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config.dimensions, GridDimensions::default());
        assert_eq!(warnings.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_rejects_oversized_file() {
        let oversized = "#".repeat(MAX_CONFIG_FILE_BYTES as usize + 1);
        let path = temp_config("large", &oversized);
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert!(
            warnings
                .iter()
                .any(|w| w.contains("file too large") && w.contains("Refusing to read"))
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_missing_explicit_file_warns() {
        let path = std::env::temp_dir().join("sheetcalc_config_missing_7c2e.toml");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert!(warnings[0].contains("not found"));
    }
}
