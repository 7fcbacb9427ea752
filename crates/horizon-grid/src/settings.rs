//! Grid configuration.
//!
//! [`GridSettings`] collects the tunables of the data core. Every field has a
//! default, so a settings file only needs to name what it changes:
//!
//! ```
//! use horizon_grid::settings::GridSettings;
//!
//! let settings = GridSettings::from_toml_str(
//!     r#"
//!     page_size = 500
//!
//!     [csv]
//!     value_separator = ";"
//!     has_header = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.page_size, 500);
//! assert_eq!(settings.csv.value_separator, ';');
//! assert_eq!(settings.type_sample_size, 200);
//! ```

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::nested::DEFAULT_CACHE_CAPACITY;
use crate::text::CsvFormat;
use crate::value::DEFAULT_TYPE_SAMPLE_SIZE;

/// Tunables of the grid data core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Values sampled per column when inferring its type.
    pub type_sample_size: usize,
    /// Nested tables whose rows and columns stay materialized.
    pub nested_cache_capacity: usize,
    /// Whether table-valued cells can be entered.
    pub nested_tables_enabled: bool,
    /// Rows per page; `0` shows everything on a single page.
    pub page_size: usize,
    /// Format of text-backed tables.
    pub csv: CsvFormat,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            type_sample_size: DEFAULT_TYPE_SAMPLE_SIZE,
            nested_cache_capacity: DEFAULT_CACHE_CAPACITY,
            nested_tables_enabled: true,
            page_size: 0,
            csv: CsvFormat::default(),
        }
    }
}

/// File formats understood by [`GridSettings::load`] and [`GridSettings::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(GridError::settings(format!(
                "unsupported settings file '{}': expected a .toml or .json extension",
                path.display()
            ))),
        }
    }
}

impl GridSettings {
    /// Parse settings from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| GridError::settings(format!("TOML: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(text).map_err(|e| GridError::settings(format!("JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GridError::settings(format!("TOML: {e}")))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GridError::settings(format!("JSON: {e}")))
    }

    /// Load settings from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SettingsFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        let settings = match format {
            SettingsFormat::Toml => Self::from_toml_str(&text)?,
            SettingsFormat::Json => Self::from_json_str(&text)?,
        };
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Write settings to a `.toml` or `.json` file.
    ///
    /// The text goes to a temporary file in the target directory first, which
    /// then replaces the target, so readers never see a partial file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = match SettingsFormat::from_path(path)? {
            SettingsFormat::Toml => self.to_toml_string()?,
            SettingsFormat::Json => self.to_json_string()?,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| GridError::io(path, e))?;
        temp.write_all(text.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|e| GridError::io(path, e))?;
        temp.persist(path).map_err(|e| GridError::io(path, e.error))?;

        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "settings saved");
        Ok(())
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.type_sample_size == 0 {
            return Err(GridError::settings("type_sample_size must be at least 1"));
        }
        if self.nested_cache_capacity == 0 {
            return Err(GridError::settings("nested_cache_capacity must be at least 1"));
        }
        self.csv.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = GridSettings::default();
        assert_eq!(settings.type_sample_size, 200);
        assert_eq!(settings.nested_cache_capacity, 3);
        assert!(settings.nested_tables_enabled);
        assert_eq!(settings.page_size, 0);
        assert_eq!(settings.csv, CsvFormat::default());
    }

    #[test]
    fn test_empty_documents_give_defaults() {
        assert_eq!(GridSettings::from_toml_str("").unwrap(), GridSettings::default());
        assert_eq!(GridSettings::from_json_str("{}").unwrap(), GridSettings::default());
    }

    #[test]
    fn test_json_overrides() {
        let settings = GridSettings::from_json_str(
            r#"{"nested_tables_enabled": false, "csv": {"null_text": "NULL", "row_id_column": "id"}}"#,
        )
        .unwrap();
        assert!(!settings.nested_tables_enabled);
        assert_eq!(settings.csv.null_text, "NULL");
        assert_eq!(settings.csv.row_id_column.as_deref(), Some("id"));
        assert_eq!(settings.csv.value_separator, ',');
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            GridSettings::from_toml_str("type_sample_size = 0"),
            Err(GridError::Settings { .. })
        ));
        assert!(matches!(
            GridSettings::from_toml_str("page_size = \"many\""),
            Err(GridError::Settings { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = GridSettings::default();
        settings.page_size = 100;
        settings.csv = CsvFormat::tsv().with_header(true);
        let text = settings.to_toml_string().unwrap();
        assert_eq!(GridSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = GridSettings::default();
        settings.nested_cache_capacity = 8;

        for name in ["grid.toml", "grid.json"] {
            let path = dir.path().join(name);
            settings.save(&path).unwrap();
            assert_eq!(GridSettings::load(&path).unwrap(), settings);
        }
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.ini");
        assert!(matches!(
            GridSettings::default().save(&path),
            Err(GridError::Settings { .. })
        ));
        assert!(matches!(
            GridSettings::load(dir.path().join("missing.toml")),
            Err(GridError::Io { .. })
        ));
    }
}
