//! Parsers for survey data files

pub mod survey;

pub use survey::{SurveyParser, REQUIRED_COLUMNS};
