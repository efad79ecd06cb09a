//! Error types for mindboard-core
//!
//! Load-time problems are collected in a `LoadReport` (graceful degradation);
//! only an unreadable or unparseable source is a hard `CoreError`.

use crate::scene::SceneError;
use crate::widgets::WidgetId;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mindboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse CSV in {path}: {message}")]
    CsvParse {
        path: PathBuf,
        message: String,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of a single widget's update cycle.
///
/// Local to the widget: the controller logs it and the previous render stays.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Scene rejected update for {widget}")]
    Scene {
        widget: WidgetId,
        #[source]
        source: SceneError,
    },

    #[error("Dataset not loaded, {widget} has nothing to render")]
    NotLoaded { widget: WidgetId },
}

/// How bad a load problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// A record was dropped; the rest of the survey is usable
    Warning,
    /// The survey could not be loaded at all
    Fatal,
}

/// One problem found while loading the survey
#[derive(Debug, Clone)]
pub struct LoadError {
    /// `line N` for record problems, the file path for fatal ones
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// How to fix the input, when we can tell
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    /// Fatal entry for a failed load, with a hint about the survey file
    pub fn from_core_error(error: &CoreError) -> Self {
        let (source, suggestion) = match error {
            CoreError::FileNotFound { path } => (
                path.display().to_string(),
                Some("Pass the path of the survey CSV, e.g. `mindboard summary students.csv`".to_string()),
            ),
            CoreError::FileRead { path, .. } => (
                path.display().to_string(),
                Some("The survey must be a readable UTF-8 text file".to_string()),
            ),
            CoreError::CsvParse { path, .. } => (
                path.display().to_string(),
                Some("Expected comma-separated values with a single header row".to_string()),
            ),
            CoreError::MissingColumn { path, column } => (
                path.display().to_string(),
                Some(format!("Add a '{}' column to the header row", column)),
            ),
            CoreError::ConfigParse { path, .. } => (
                path.display().to_string(),
                Some("Fix or delete the config file to use the defaults".to_string()),
            ),
            CoreError::InvalidConfig { .. } => ("config".to_string(), None),
        };

        Self {
            source,
            message: error.to_string(),
            severity: ErrorSeverity::Fatal,
            suggestion,
        }
    }
}

/// What happened while loading the survey: row counts plus dropped-row notes
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    /// Data records read from the source
    pub rows_read: usize,
    /// Rows that passed coercion and the load-time filter
    pub rows_kept: usize,
    /// Rows dropped because a field could not be coerced
    pub rows_malformed: usize,
    /// Rows dropped by the age / CGPA filter
    pub rows_out_of_range: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for a load that failed outright
    pub fn failed(error: &CoreError) -> Self {
        Self {
            errors: vec![LoadError::from_core_error(error)],
            ..Self::default()
        }
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Any note at all, warnings included
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors.iter().filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Rows dropped for any reason
    pub fn rows_dropped(&self) -> usize {
        self.rows_malformed + self.rows_out_of_range
    }

    /// `kept 3 of 4 rows (1 malformed, 0 out of range)`
    pub fn summary_line(&self) -> String {
        format!(
            "kept {} of {} rows ({} malformed, {} out of range)",
            self.rows_kept, self.rows_read, self.rows_malformed, self.rows_out_of_range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_not_fatal() {
        let mut report = LoadReport::new();
        report.rows_read = 4;
        report.rows_kept = 3;
        report.rows_malformed = 1;
        report.add_warning("line 3", "Sleep_Quality: unrecognized level 'Excellent'");

        assert!(report.has_errors());
        assert!(!report.has_fatal_errors());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.rows_dropped(), 1);
        assert_eq!(report.summary_line(), "kept 3 of 4 rows (1 malformed, 0 out of range)");
    }

    #[test]
    fn test_failed_report_names_the_file() {
        let err = CoreError::MissingColumn {
            path: PathBuf::from("/tmp/survey.csv"),
            column: "CGPA".to_string(),
        };
        let report = LoadReport::failed(&err);

        assert!(report.has_fatal_errors());
        assert_eq!(report.warnings().count(), 0);
        let entry = &report.errors[0];
        assert_eq!(entry.source, "/tmp/survey.csv");
        assert!(entry.suggestion.as_deref().unwrap().contains("'CGPA'"));
    }

    #[test]
    fn test_invalid_config_has_no_hint() {
        let entry = LoadError::from_core_error(&CoreError::InvalidConfig {
            message: "min_age 30 exceeds max_age 24".to_string(),
        });
        assert_eq!(entry.source, "config");
        assert!(entry.suggestion.is_none());
        assert_eq!(entry.message, "Invalid configuration: min_age 30 exceeds max_age 24");
    }
}
