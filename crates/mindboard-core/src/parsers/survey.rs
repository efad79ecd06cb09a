//! Survey CSV parser
//!
//! Reads the student mental-health survey, coerces text fields into typed
//! rows and applies the load-time filter (age range, non-zero CGPA).
//! Columns outside the row schema are ignored and never reach a widget.

use crate::config::DashboardConfig;
use crate::error::{CoreError, LoadReport};
use crate::models::{CounselingUse, Course, Level, Row, RowId};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns the parser requires in the header row
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "Age",
    "Course",
    "CGPA",
    "Stress_Level",
    "Depression_Score",
    "Anxiety_Score",
    "Sleep_Quality",
    "Physical_Activity",
    "Diet_Quality",
    "Social_Support",
    "Counseling_Service_Use",
    "Financial_Stress",
    "Extracurricular_Involvement",
];

/// Per-row warnings recorded before summarising the rest
const MAX_ROW_WARNINGS: usize = 25;

/// Raw text record, one field per schema column
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Course")]
    course: String,
    #[serde(rename = "CGPA")]
    cgpa: String,
    #[serde(rename = "Stress_Level")]
    stress_level: String,
    #[serde(rename = "Depression_Score")]
    depression_score: String,
    #[serde(rename = "Anxiety_Score")]
    anxiety_score: String,
    #[serde(rename = "Sleep_Quality")]
    sleep_quality: String,
    #[serde(rename = "Physical_Activity")]
    physical_activity: String,
    #[serde(rename = "Diet_Quality")]
    diet_quality: String,
    #[serde(rename = "Social_Support")]
    social_support: String,
    #[serde(rename = "Counseling_Service_Use")]
    counseling_service_use: String,
    #[serde(rename = "Financial_Stress")]
    financial_stress: String,
    #[serde(rename = "Extracurricular_Involvement")]
    extracurricular_involvement: String,
}

/// Why a record was not turned into a row
#[derive(Debug, Clone, PartialEq)]
enum Rejection {
    Malformed(String),
    OutOfRange(String),
}

/// Parser for the survey CSV
pub struct SurveyParser {
    min_age: u8,
    max_age: u8,
}

impl Default for SurveyParser {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl SurveyParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            min_age: config.min_age,
            max_age: config.max_age,
        }
    }

    /// Read and parse a survey file.
    ///
    /// An unreadable file or an unusable header is a hard error; individual
    /// bad records are dropped and recorded in the report.
    pub async fn load(&self, path: &Path) -> Result<(Vec<Row>, LoadReport), CoreError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let result = self.parse_str(&content, path)?;
        info!(
            path = %path.display(),
            kept = result.1.rows_kept,
            dropped = result.1.rows_dropped(),
            "Survey loaded"
        );
        Ok(result)
    }

    /// Load with graceful degradation: a failed load yields no rows and a fatal report entry
    pub async fn load_graceful(&self, path: &Path) -> (Vec<Row>, LoadReport) {
        match self.load(path).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Survey load failed");
                (Vec::new(), LoadReport::failed(&e))
            }
        }
    }

    /// Parse CSV text. `origin` is only used in error messages.
    pub fn parse_str(&self, content: &str, origin: &Path) -> Result<(Vec<Row>, LoadReport), CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers = reader.headers().map_err(|e| CoreError::CsvParse {
            path: origin.to_path_buf(),
            message: "unreadable header row".to_string(),
            source: e,
        })?;
        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(CoreError::MissingColumn {
                path: origin.to_path_buf(),
                column: column.to_string(),
            });
        }

        let mut report = LoadReport::new();
        let mut rows = Vec::new();

        for (index, record) in reader.deserialize::<RawRecord>().enumerate() {
            // Header is line 1
            let line = index + 2;
            report.rows_read += 1;

            let outcome = match record {
                Ok(raw) => self.coerce(raw, RowId(rows.len() as u32)),
                Err(e) => Err(Rejection::Malformed(e.to_string())),
            };

            match outcome {
                Ok(row) => rows.push(row),
                Err(Rejection::Malformed(reason)) => {
                    report.rows_malformed += 1;
                    note_dropped(&mut report, line, &reason);
                }
                Err(Rejection::OutOfRange(reason)) => {
                    report.rows_out_of_range += 1;
                    debug!(line, reason = %reason, "Row outside load filter");
                }
            }
        }

        let suppressed = report.rows_malformed.saturating_sub(MAX_ROW_WARNINGS);
        if suppressed > 0 {
            report.add_warning("survey", format!("{} more malformed rows not listed", suppressed));
        }

        report.rows_kept = rows.len();
        Ok((rows, report))
    }

    fn coerce(&self, raw: RawRecord, id: RowId) -> Result<Row, Rejection> {
        let age = parse_whole("Age", blank_as_zero(&raw.age))?;
        let cgpa = parse_number("CGPA", blank_as_zero(&raw.cgpa))?;

        let row = Row {
            id,
            age,
            course: Course::parse(&raw.course)
                .ok_or_else(|| Rejection::Malformed(format!("unknown course '{}'", raw.course)))?,
            cgpa,
            stress_level: parse_whole("Stress_Level", &raw.stress_level)?,
            depression_score: parse_whole("Depression_Score", &raw.depression_score)?,
            anxiety_score: parse_whole("Anxiety_Score", &raw.anxiety_score)?,
            financial_stress: parse_whole("Financial_Stress", &raw.financial_stress)?,
            sleep_quality: parse_level("Sleep_Quality", &raw.sleep_quality)?,
            physical_activity: parse_level("Physical_Activity", &raw.physical_activity)?,
            diet_quality: parse_level("Diet_Quality", &raw.diet_quality)?,
            social_support: parse_level("Social_Support", &raw.social_support)?,
            extracurricular_involvement: parse_level(
                "Extracurricular_Involvement",
                &raw.extracurricular_involvement,
            )?,
            counseling: CounselingUse::parse(&raw.counseling_service_use).ok_or_else(|| {
                Rejection::Malformed(format!(
                    "unknown counseling use '{}'",
                    raw.counseling_service_use
                ))
            })?,
        };

        if !(self.min_age..=self.max_age).contains(&row.age) {
            return Err(Rejection::OutOfRange(format!("age {}", row.age)));
        }
        if row.cgpa == 0.0 {
            return Err(Rejection::OutOfRange("CGPA 0".to_string()));
        }
        Ok(row)
    }
}

fn note_dropped(report: &mut LoadReport, line: usize, reason: &str) {
    if report.rows_malformed <= MAX_ROW_WARNINGS {
        warn!(line, reason, "Dropping malformed survey row");
        report.add_warning(format!("line {}", line), reason.to_string());
    }
}

/// Blank Age/CGPA reads as 0 and falls to the load filter
fn blank_as_zero(value: &str) -> &str {
    if value.trim().is_empty() {
        "0"
    } else {
        value
    }
}

fn parse_number(column: &str, value: &str) -> Result<f64, Rejection> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Rejection::Malformed(format!("{} is not a number: '{}'", column, value)))
}

/// Whole number in `0..=255` (accepts "3" and "3.0")
fn parse_whole(column: &str, value: &str) -> Result<u8, Rejection> {
    let number = parse_number(column, value)?;
    if number.fract() != 0.0 || !(0.0..=255.0).contains(&number) {
        return Err(Rejection::Malformed(format!(
            "{} is not a whole number: '{}'",
            column, value
        )));
    }
    Ok(number as u8)
}

fn parse_level(column: &str, value: &str) -> Result<Level, Rejection> {
    Level::normalize(value)
        .ok_or_else(|| Rejection::Malformed(format!("{} has unrecognized level '{}'", column, value)))
}
