//! Survey respondent model
//!
//! One `Row` per respondent, with typed categorical and ordinal attributes.
//! Categorical axes carry their own fixed display order (never alphabetic).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field of study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Course {
    Business,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Engineering,
    Law,
    Medical,
    Others,
}

impl Course {
    /// All courses in canonical (alphabetical) order
    pub const ALL: [Course; 6] = [
        Course::Business,
        Course::ComputerScience,
        Course::Engineering,
        Course::Law,
        Course::Medical,
        Course::Others,
    ];

    /// Row order of the course/age heat map
    pub const HEAT_MAP_ORDER: [Course; 6] = [
        Course::Engineering,
        Course::Business,
        Course::ComputerScience,
        Course::Medical,
        Course::Law,
        Course::Others,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Course::Business => "Business",
            Course::ComputerScience => "Computer Science",
            Course::Engineering => "Engineering",
            Course::Law => "Law",
            Course::Medical => "Medical",
            Course::Others => "Others",
        }
    }

    /// Axis label; "Computer Science" does not fit under a mini bar
    pub fn short_label(&self) -> &'static str {
        match self {
            Course::ComputerScience => "Computer",
            other => other.name(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Course::Business => 0,
            Course::ComputerScience => 1,
            Course::Engineering => 2,
            Course::Law => 3,
            Course::Medical => 4,
            Course::Others => 5,
        }
    }

    /// Parse the CSV spelling (exact course name, surrounding whitespace ignored)
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|c| c.name() == value)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordinal well-being level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Moderate, Level::High];

    pub fn name(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Level::Low => 0,
            Level::Moderate => 1,
            Level::High => 2,
        }
    }

    /// Normalize a raw survey answer onto the Low/Moderate/High scale.
    ///
    /// The value is first-letter capitalized (rest lowercased) before
    /// matching, so `"GOOD"`, `"good"` and `"Good"` all map to `High`.
    /// `Good/Average/Poor` map to `High/Moderate/Low`; the target scale
    /// passes through. Anything else is unrecognized.
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut chars = raw.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(|c| c.to_lowercase()))
                .collect(),
            None => return None,
        };

        match capitalized.as_str() {
            "Good" | "High" => Some(Level::High),
            "Average" | "Moderate" => Some(Level::Moderate),
            "Poor" | "Low" => Some(Level::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How often a respondent used counseling services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounselingUse {
    Never,
    Occasionally,
    Frequently,
}

impl CounselingUse {
    /// Bar chart axis order
    pub const ORDER: [CounselingUse; 3] = [
        CounselingUse::Never,
        CounselingUse::Occasionally,
        CounselingUse::Frequently,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CounselingUse::Never => "Never",
            CounselingUse::Occasionally => "Occasionally",
            CounselingUse::Frequently => "Frequently",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ORDER.into_iter().find(|c| c.name().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for CounselingUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The five ordinal well-being attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    SleepQuality,
    PhysicalActivity,
    DietQuality,
    SocialSupport,
    ExtracurricularInvolvement,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::SleepQuality,
        Indicator::PhysicalActivity,
        Indicator::DietQuality,
        Indicator::SocialSupport,
        Indicator::ExtracurricularInvolvement,
    ];

    /// Column name in the survey CSV
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::SleepQuality => "Sleep_Quality",
            Indicator::PhysicalActivity => "Physical_Activity",
            Indicator::DietQuality => "Diet_Quality",
            Indicator::SocialSupport => "Social_Support",
            Indicator::ExtracurricularInvolvement => "Extracurricular_Involvement",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::SleepQuality => "Sleep Quality",
            Indicator::PhysicalActivity => "Physical Activity",
            Indicator::DietQuality => "Diet Quality",
            Indicator::SocialSupport => "Social Support",
            Indicator::ExtracurricularInvolvement => "Extracurricular Involvement",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Indicator::SleepQuality => "sleep",
            Indicator::PhysicalActivity => "physical",
            Indicator::DietQuality => "diet",
            Indicator::SocialSupport => "social",
            Indicator::ExtracurricularInvolvement => "extra",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Indicator::SleepQuality => 0,
            Indicator::PhysicalActivity => 1,
            Indicator::DietQuality => 2,
            Indicator::SocialSupport => 3,
            Indicator::ExtracurricularInvolvement => 4,
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.column() == column)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of a row in the loaded dataset (stable for the session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// Composite identity over every attribute of a row.
///
/// Two rows with identical answers share a key; this is the single notion of
/// "same respondent" used by every highlight comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(String);

impl RowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One survey respondent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub age: u8,
    pub course: Course,
    pub cgpa: f64,
    pub stress_level: u8,
    pub depression_score: u8,
    pub anxiety_score: u8,
    pub financial_stress: u8,
    pub sleep_quality: Level,
    pub physical_activity: Level,
    pub diet_quality: Level,
    pub social_support: Level,
    pub extracurricular_involvement: Level,
    pub counseling: CounselingUse,
}

impl Row {
    /// Level of a well-being indicator
    pub fn level(&self, indicator: Indicator) -> Level {
        match indicator {
            Indicator::SleepQuality => self.sleep_quality,
            Indicator::PhysicalActivity => self.physical_activity,
            Indicator::DietQuality => self.diet_quality,
            Indicator::SocialSupport => self.social_support,
            Indicator::ExtracurricularInvolvement => self.extracurricular_involvement,
        }
    }

    pub fn identity(&self) -> RowKey {
        row_identity(self)
    }

    /// Multi-line tooltip body shown on hover
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Age: {}", self.age),
            format!("Major: {}", self.course),
            format!("CGPA: {}", self.cgpa),
            format!("Stress Level: {}", self.stress_level),
            format!("Depression Score: {}", self.depression_score),
            format!("Anxiety Score: {}", self.anxiety_score),
            format!("Sleep Quality: {}", self.sleep_quality),
            format!("Physical Activity: {}", self.physical_activity),
            format!("Diet Quality: {}", self.diet_quality),
            format!("Social Support: {}", self.social_support),
            format!(
                "Extracurricular Involvement: {}",
                self.extracurricular_involvement
            ),
            format!("Counseling Service Use: {}", self.counseling),
        ]
    }
}

/// Stable identity of a row, built from every attribute field (not the load id)
pub fn row_identity(row: &Row) -> RowKey {
    RowKey(format!(
        "{}|{}|{:.4}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        row.age,
        row.course.name(),
        row.cgpa,
        row.stress_level,
        row.depression_score,
        row.anxiety_score,
        row.financial_stress,
        row.sleep_quality.name(),
        row.physical_activity.name(),
        row.diet_quality.name(),
        row.social_support.name(),
        row.extracurricular_involvement.name(),
        row.counseling.name(),
    ))
}


#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;

    #[test]
    fn test_level_normalize_maps_legacy_scale() {
        assert_eq!(Level::normalize("Good"), Some(Level::High));
        assert_eq!(Level::normalize("average"), Some(Level::Moderate));
        assert_eq!(Level::normalize("POOR"), Some(Level::Low));
    }

    #[test]
    fn test_level_normalize_passes_target_scale() {
        assert_eq!(Level::normalize("high"), Some(Level::High));
        assert_eq!(Level::normalize(" Moderate "), Some(Level::Moderate));
        assert_eq!(Level::normalize("LOW"), Some(Level::Low));
    }

    #[test]
    fn test_level_normalize_rejects_unknown() {
        assert_eq!(Level::normalize(""), None);
        assert_eq!(Level::normalize("Excellent"), None);
    }

    #[test]
    fn test_course_parse_round_trips_names() {
        for course in Course::ALL {
            assert_eq!(Course::parse(course.name()), Some(course));
        }
        assert_eq!(Course::parse("Art"), None);
    }

    #[test]
    fn test_row_identity_ignores_load_id() {
        let a = row(1, Course::Law, 20);
        let b = row(2, Course::Law, 20);
        assert_eq!(row_identity(&a), row_identity(&b));
    }

    #[test]
    fn test_row_identity_distinguishes_any_field() {
        let a = row(1, Course::Law, 20);
        let mut b = a.clone();
        b.diet_quality = Level::High;
        assert_ne!(a.identity(), b.identity());

        let mut c = a.clone();
        c.cgpa = 3.5;
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn test_row_level_lookup() {
        let mut r = row(1, Course::Medical, 22);
        r.social_support = Level::High;
        assert_eq!(r.level(Indicator::SocialSupport), Level::High);
        assert_eq!(r.level(Indicator::SleepQuality), Level::Moderate);
    }
}
