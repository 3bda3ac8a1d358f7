use serde::{Deserialize, Serialize};

use crate::eap::MIN_ROLE_COLUMNS;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Label vocabulary
// ---------------------------------------------------------------------------

/// Header marker searched for in the FAC sheet.
pub const MARKER: &str = "DESCRIÇÃO";
/// Accent-free marker used for the promoted EAP description role.
pub const MARKER_ASCII: &str = "DESCRICAO";
pub const ITEM: &str = "ITEM";
pub const QUANTITY: &str = "QTDE";
pub const TOTAL: &str = "TOTAL";

pub const SUBSECTION: &str = "SUBESTACAO";
pub const TAG_CODE: &str = "TAG_CODE";
pub const TAG_DESCRIPTION: &str = "TAG_DESCRICAO";
pub const TAG_RAW: &str = "TAG_RAW";

pub const FUNCTION_ALLOW_LIST: &[&str] = &[
    "QTDE",
    "MAT. ESPEC.",
    "MAT. GERAL",
    "COOR ENG DTFD",
    "CONS ENG DTFD",
    "PROJ DTFD",
    "APOIO DTFD",
    "FAB MEC",
    "MONT MEC",
    "MONT ELET",
];

pub const DENY_SUBSTRINGS: &[&str] = &["%", "VALOR", "PREÇO", "SOMA", "DATA BASE"];
pub const LABEL_COLUMNS: &[&str] = &["ITEM", "DESCRIÇÃO"];
pub const NON_ITEM_PATTERNS: &[&str] = &["Proposta", "Cliente", "SUBESTA", "TOTAL", "EAP", "nan"];
pub const QUANTITY_MARKERS: &[&str] = &["QTDE", "QTY"];
pub const CURRENCY_TOKEN: &str = "R$";

// ---------------------------------------------------------------------------
// Column policy
// ---------------------------------------------------------------------------

/// How FAC columns are classified as function (discipline) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Only labels on the fixed discipline list qualify.
    #[default]
    AllowList,
    /// Everything qualifies except label columns and denied substrings.
    DenyList,
}

impl std::fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllowList => write!(f, "allow-list"),
            Self::DenyList => write!(f, "deny-list"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every literal the pipeline matches against.
///
/// The defaults are the wire contract with the RD workbooks; overriding them
/// is only useful for sheets that deviate from the standard template.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub marker: String,
    pub column_policy: ColumnPolicy,
    pub function_allow_list: Vec<String>,
    pub deny_substrings: Vec<String>,
    pub label_columns: Vec<String>,
    pub non_item_patterns: Vec<String>,
    pub currency_token: String,
    pub quantity_markers: Vec<String>,
    /// A column needs strictly more non-null numbers than this to be a
    /// quantity/total candidate.
    pub min_numeric_values: usize,
    pub min_eap_columns: usize,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            marker: MARKER.into(),
            column_policy: ColumnPolicy::AllowList,
            function_allow_list: owned(FUNCTION_ALLOW_LIST),
            deny_substrings: owned(DENY_SUBSTRINGS),
            label_columns: owned(LABEL_COLUMNS),
            non_item_patterns: owned(NON_ITEM_PATTERNS),
            currency_token: CURRENCY_TOKEN.into(),
            quantity_markers: owned(QUANTITY_MARKERS),
            min_numeric_values: 5,
            min_eap_columns: 5,
        }
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

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let required = [
            ("marker", &self.marker),
            ("currency_token", &self.currency_token),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        if self.column_policy == ColumnPolicy::AllowList && self.function_allow_list.is_empty() {
            return Err(ReconError::ConfigValidation(
                "function_allow_list must not be empty under the allow_list policy".into(),
            ));
        }

        if self.quantity_markers.iter().any(|m| m.trim().is_empty()) {
            // An empty marker would prefix-match every column.
            return Err(ReconError::ConfigValidation(
                "quantity_markers must not contain empty entries".into(),
            ));
        }

        if self.min_eap_columns < MIN_ROLE_COLUMNS {
            return Err(ReconError::ConfigValidation(format!(
                "min_eap_columns must be at least {MIN_ROLE_COLUMNS} (ITEM, DESCRICAO and two numeric columns), got {}",
                self.min_eap_columns
            )));
        }

        Ok(())
    }

    /// True if `label` starts with one of the quantity markers (case-insensitive).
    pub fn is_quantity_label(&self, label: &str) -> bool {
        let upper = label.trim().to_uppercase();
        self.quantity_markers
            .iter()
            .any(|m| upper.starts_with(&m.to_uppercase()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_wire_contract() {
        let config = ReconConfig::default();
        assert_eq!(config.marker, "DESCRIÇÃO");
        assert_eq!(config.function_allow_list.len(), 10);
        assert_eq!(config.currency_token, "R$");
        assert_eq!(config.column_policy, ColumnPolicy::AllowList);
        config.validate().unwrap();
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = ReconConfig::from_toml(
            r#"
column_policy = "deny_list"
min_numeric_values = 2
deny_substrings = ["%", "VALOR"]
"#,
        )
        .unwrap();
        assert_eq!(config.column_policy, ColumnPolicy::DenyList);
        assert_eq!(config.min_numeric_values, 2);
        assert_eq!(config.deny_substrings, vec!["%", "VALOR"]);
        // untouched fields keep their defaults
        assert_eq!(config.marker, MARKER);
    }

    #[test]
    fn reject_unknown_field() {
        let err = ReconConfig::from_toml("markr = \"X\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_invalid_policy() {
        let err = ReconConfig::from_toml("column_policy = \"allowlist\"");
        assert!(err.is_err(), "typo in policy should fail deserialization");
    }

    #[test]
    fn reject_empty_allow_list() {
        let err = ReconConfig::from_toml("function_allow_list = []").unwrap_err();
        assert!(err.to_string().contains("function_allow_list"));
    }

    #[test]
    fn empty_allow_list_is_fine_under_deny_policy() {
        let config = ReconConfig::from_toml(
            "column_policy = \"deny_list\"\nfunction_allow_list = []",
        )
        .unwrap();
        assert!(config.function_allow_list.is_empty());
    }

    #[test]
    fn reject_empty_quantity_marker() {
        let err = ReconConfig::from_toml("quantity_markers = [\"QTDE\", \"\"]").unwrap_err();
        assert!(err.to_string().contains("quantity_markers"));
    }

    #[test]
    fn reject_narrow_eap() {
        let err = ReconConfig::from_toml("min_eap_columns = 3").unwrap_err();
        assert!(err.to_string().contains("min_eap_columns"));
    }

    #[test]
    fn reject_blank_marker() {
        let err = ReconConfig::from_toml("marker = \"  \"").unwrap_err();
        assert!(err.to_string().contains("marker must not be empty"));
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = ReconConfig::default().to_toml().unwrap();
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), ReconConfig::default());
    }

    #[test]
    fn quantity_label_prefix_match() {
        let config = ReconConfig::default();
        assert!(config.is_quantity_label("QTDE"));
        assert!(config.is_quantity_label("qtde_fac"));
        assert!(config.is_quantity_label("QTY."));
        assert!(!config.is_quantity_label("TOTAL"));
    }
}
