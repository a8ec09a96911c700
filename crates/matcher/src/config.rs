use std::borrow::Cow;
use std::path::Path;

use rowmatch_core::ConversionMode;
use serde::Deserialize;

use crate::error::MatchError;

pub const DEFAULT_PERMUTATION_LIMIT: usize = 10_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default)]
    pub column_mode: ColumnMode,
    #[serde(default)]
    pub row_mode: RowMode,
    /// Dead ends the unordered search may hit before giving up.
    #[serde(default = "default_permutation_limit")]
    pub permutation_limit: usize,
    #[serde(default)]
    pub conversion: ConversionMode,
    #[serde(default)]
    pub name_case: NameCase,
}

fn default_permutation_limit() -> usize {
    DEFAULT_PERMUTATION_LIMIT
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            column_mode: ColumnMode::default(),
            row_mode: RowMode::default(),
            permutation_limit: DEFAULT_PERMUTATION_LIMIT,
            conversion: ConversionMode::default(),
            name_case: NameCase::default(),
        }
    }
}

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, MatchError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| MatchError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.permutation_limit == 0 {
            return Err(MatchError::ConfigValidation(
                "permutation_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn with_column_mode(mut self, mode: ColumnMode) -> Self {
        self.column_mode = mode;
        self
    }

    pub fn with_row_mode(mut self, mode: RowMode) -> Self {
        self.row_mode = mode;
        self
    }

    pub fn with_permutation_limit(mut self, limit: usize) -> Self {
        self.permutation_limit = limit;
        self
    }

    pub fn with_conversion(mut self, conversion: ConversionMode) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = name_case;
        self
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// How expected columns are lined up with actual columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMode {
    #[default]
    Positional,
    ByName,
}

/// How expected rows are lined up with actual rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    /// Same rows, same order.
    #[default]
    Ordered,
    /// Same rows, any order.
    AnyOrder,
    /// Rows grouped by key-column values; any order within a group.
    ByKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    #[default]
    Sensitive,
    Insensitive,
}

impl NameCase {
    pub fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameCase::Sensitive => Cow::Borrowed(name),
            NameCase::Insensitive => Cow::Owned(name.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_uses_defaults() {
        let config = CompareConfig::from_toml("").unwrap();
        assert_eq!(config, CompareConfig::default());
        assert_eq!(config.permutation_limit, DEFAULT_PERMUTATION_LIMIT);
        assert_eq!(config.column_mode, ColumnMode::Positional);
        assert_eq!(config.row_mode, RowMode::Ordered);
    }

    #[test]
    fn parse_all_fields() {
        let config = CompareConfig::from_toml(
            r#"
column_mode = "by_name"
row_mode = "by_key"
permutation_limit = 25
conversion = "relaxed"
name_case = "insensitive"
"#,
        )
        .unwrap();
        assert_eq!(config.column_mode, ColumnMode::ByName);
        assert_eq!(config.row_mode, RowMode::ByKey);
        assert_eq!(config.permutation_limit, 25);
        assert_eq!(config.conversion, ConversionMode::Relaxed);
        assert_eq!(config.name_case, NameCase::Insensitive);
    }

    #[test]
    fn rejects_zero_limit() {
        let err = CompareConfig::from_toml("permutation_limit = 0").unwrap_err();
        assert!(matches!(err, MatchError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = CompareConfig::from_toml(r#"row_mode = "sideways""#).unwrap_err();
        assert!(matches!(err, MatchError::ConfigParse(_)));
    }

    #[test]
    fn rejects_unknown_field() {
        assert!(CompareConfig::from_toml("tolerance = 3").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.toml");
        std::fs::write(&path, "row_mode = \"any_order\"\n").unwrap();
        let config = CompareConfig::load(&path).unwrap();
        assert_eq!(config.row_mode, RowMode::AnyOrder);

        let missing = CompareConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, MatchError::Io(_)));
    }

    #[test]
    fn name_case_normalize() {
        assert_eq!(NameCase::Sensitive.normalize("Amount"), "Amount");
        assert_eq!(NameCase::Insensitive.normalize("Amount"), "amount");
    }
}
