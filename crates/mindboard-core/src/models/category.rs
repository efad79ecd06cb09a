//! Combined mental-health categories (tree map leaves)

use super::survey::Row;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of stress, depression and anxiety reach the severity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MentalHealthCategory {
    None,
    All,
    StressDepression,
    StressAnxiety,
    DepressionAnxiety,
    OnlyStress,
    OnlyDepression,
    OnlyAnxiety,
}

/// Display group of a category; leaves are ordered by group first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CategoryGroup {
    All,
    None,
    OneOfThree,
    TwoOfThree,
}

impl MentalHealthCategory {
    pub const ALL: [MentalHealthCategory; 8] = [
        MentalHealthCategory::None,
        MentalHealthCategory::All,
        MentalHealthCategory::StressDepression,
        MentalHealthCategory::StressAnxiety,
        MentalHealthCategory::DepressionAnxiety,
        MentalHealthCategory::OnlyStress,
        MentalHealthCategory::OnlyDepression,
        MentalHealthCategory::OnlyAnxiety,
    ];

    /// Classify a row against a severity threshold (score >= threshold counts)
    pub fn classify(row: &Row, threshold: u8) -> Self {
        let stress = row.stress_level >= threshold;
        let depression = row.depression_score >= threshold;
        let anxiety = row.anxiety_score >= threshold;

        match (stress, depression, anxiety) {
            (false, false, false) => Self::None,
            (true, true, true) => Self::All,
            (true, true, false) => Self::StressDepression,
            (true, false, true) => Self::StressAnxiety,
            (false, true, true) => Self::DepressionAnxiety,
            (true, false, false) => Self::OnlyStress,
            (false, true, false) => Self::OnlyDepression,
            (false, false, true) => Self::OnlyAnxiety,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::All => "all",
            Self::StressDepression => "stressDepression",
            Self::StressAnxiety => "stressAnxiety",
            Self::DepressionAnxiety => "depressionAnxiety",
            Self::OnlyStress => "onlyStress",
            Self::OnlyDepression => "onlyDepression",
            Self::OnlyAnxiety => "onlyAnxiety",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::All => "All",
            Self::StressDepression => "S&D",
            Self::StressAnxiety => "S&A",
            Self::DepressionAnxiety => "D&A",
            Self::OnlyStress => "S",
            Self::OnlyDepression => "D",
            Self::OnlyAnxiety => "A",
        }
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            Self::All => CategoryGroup::All,
            Self::None => CategoryGroup::None,
            Self::OnlyStress | Self::OnlyDepression | Self::OnlyAnxiety => {
                CategoryGroup::OneOfThree
            }
            Self::StressDepression | Self::StressAnxiety | Self::DepressionAnxiety => {
                CategoryGroup::TwoOfThree
            }
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for MentalHealthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
