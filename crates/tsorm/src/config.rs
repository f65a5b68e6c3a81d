use serde::Deserialize;

use crate::error::OrmResult;

/// Statement generation settings shared by the fluent builders and the script generator.
///
/// Loadable from TOML:
///
/// ```toml
/// soft_delete_column = "IsDeleted"
/// read_hint = "NOLOCK"
/// log_statements = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    /// Column set to `1` by soft deletes.
    pub soft_delete_column: String,
    /// Table hint rendered as `WITH (<hint>)` on read-side table references.
    ///
    /// `None` or an empty string disables it.
    pub read_hint: Option<String>,
    /// Emit every built statement through `tracing` (target `tsorm::sql`).
    pub log_statements: bool,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            soft_delete_column: "IsDeleted".to_string(),
            read_hint: Some("NOLOCK".to_string()),
            log_statements: true,
        }
    }
}

impl SqlConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override the soft-delete column name.
    pub fn with_soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.soft_delete_column = column.into();
        self
    }

    /// Override the read-side table hint.
    pub fn with_read_hint(mut self, hint: impl Into<String>) -> Self {
        self.read_hint = Some(hint.into());
        self
    }

    /// Render read-side table references without a table hint.
    pub fn without_read_hint(mut self) -> Self {
        self.read_hint = None;
        self
    }

    /// Enable or disable statement logging.
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Suffix appended after a read-side table reference (` WITH (NOLOCK)` by default).
    pub(crate) fn read_hint_suffix(&self) -> String {
        match &self.read_hint {
            Some(hint) if !hint.trim().is_empty() => format!(" WITH ({hint})"),
            _ => String::new(),
        }
    }

    /// Emit a built statement at DEBUG level when logging is enabled.
    pub(crate) fn trace_statement(&self, kind: &'static str, sql: &str) {
        if self.log_statements {
            tracing::debug!(target: "tsorm::sql", statement = kind, sql, "built statement");
        }
    }
}
