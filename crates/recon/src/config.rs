use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub columns: ColumnNames,
    /// Declaration order is the query scan order.
    pub countries: Vec<CountryConfig>,
}

// ---------------------------------------------------------------------------
// Country
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    /// Resolved one-to-one table: served by queries, written by resolution.
    pub resolved: String,
    /// Raw one-to-many candidate table consumed by resolution.
    #[serde(default)]
    pub candidates: Option<String>,
    /// Header of this country's foreign code column (e.g. `HS_Code_US`).
    pub foreign_code_column: String,
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Headers shared by every country's table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub product: String,
    pub domestic_code: String,
    pub domestic_description: String,
    pub foreign_description: String,
    pub translated_description: String,
    pub selection_method: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            product: "Product".into(),
            domestic_code: "HS_Code_China".into(),
            domestic_description: "商品名称".into(),
            foreign_description: "Desc".into(),
            translated_description: "描述".into(),
            selection_method: "选择方式".into(),
        }
    }
}

impl ColumnNames {
    fn all(&self) -> [(&'static str, &str); 6] {
        [
            ("product", &self.product),
            ("domestic_code", &self.domestic_code),
            ("domestic_description", &self.domestic_description),
            ("foreign_description", &self.foreign_description),
            ("translated_description", &self.translated_description),
            ("selection_method", &self.selection_method),
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.countries.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one country is required".into(),
            ));
        }

        for (field, value) in self.columns.all() {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be blank"
                )));
            }
        }

        let mut seen = HashSet::new();
        for country in &self.countries {
            let name = country.name.trim();
            if name.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "country name must not be blank".into(),
                ));
            }
            if !seen.insert(name) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate country '{name}'"
                )));
            }
            if country.foreign_code_column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "country '{name}': foreign_code_column must not be blank"
                )));
            }
            if country.resolved.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "country '{name}': resolved path must not be blank"
                )));
            }
        }

        Ok(())
    }

    pub fn country(&self, name: &str) -> Result<&CountryConfig, ReconError> {
        self.countries
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReconError::UnknownCountry(name.into()))
    }
}
