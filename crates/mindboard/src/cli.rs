//! Terminal output for the `summary` command

use comfy_table::{Cell, Color, ContentArrangement, Table};
use mindboard_core::analytics::CategoryShare;
use mindboard_core::models::{AggregateTable, Course, Indicator, Level, TableRow};
use mindboard_core::{LoadReport, SurveySummary};

/// One-paragraph account of the load
pub fn format_load_report(report: &LoadReport) -> String {
    let mut out = format!("Survey: {}\n", report.summary_line());
    for warning in report.warnings() {
        out.push_str(&format!("  {}: {}\n", warning.source, warning.message));
    }
    out
}

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(columns.iter().map(|c| Cell::new(c).fg(Color::Cyan)));
    }
}

/// Course x indicator table; each cell is `low/moderate/high`
pub fn format_aggregate_table(table: &AggregateTable, no_color: bool) -> String {
    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);

    let mut columns = vec!["Course"];
    columns.extend(Indicator::ALL.iter().map(|i| i.label()));
    columns.push("Students");
    header(&mut out, &columns, no_color);

    let rows = Course::ALL
        .iter()
        .map(|c| (TableRow::Course(*c), c.name(), table.course_rows(*c)))
        .chain(std::iter::once((TableRow::Total, "Total", table.rows())));

    for (row, name, students) in rows {
        let mut cells = vec![Cell::new(name)];
        for indicator in Indicator::ALL {
            let counts: Vec<String> = Level::ALL
                .iter()
                .map(|level| table.get(row, indicator, *level).to_string())
                .collect();
            cells.push(Cell::new(counts.join("/")));
        }
        cells.push(Cell::new(students));
        out.add_row(cells);
    }

    out.to_string()
}

pub fn format_counseling(summary: &SurveySummary, no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Counseling", "Students", "Mean CGPA"], no_color);

    for count in &summary.counseling {
        let mean = summary
            .cgpa_by_counseling
            .iter()
            .find(|m| m.key == count.key)
            .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m.mean));
        table.add_row(vec![
            Cell::new(count.key.name()),
            Cell::new(count.count),
            Cell::new(mean),
        ]);
    }

    table.to_string()
}

pub fn format_categories(categories: &[CategoryShare], no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Category", "Students", "Share"], no_color);

    for share in categories {
        table.add_row(vec![
            Cell::new(share.category.key()),
            Cell::new(share.count),
            Cell::new(format!("{:.2}%", share.percent)),
        ]);
    }

    table.to_string()
}

/// Every table of the summary, separated by section titles
pub fn format_summary(summary: &SurveySummary, no_color: bool) -> String {
    format!(
        "Well-being by course (low/moderate/high), counts {}..{}\n{}\n\nCounseling\n{}\n\nMental health categories\n{}",
        summary.range.min,
        summary.range.max,
        format_aggregate_table(&summary.table, no_color),
        format_counseling(summary, no_color),
        format_categories(&summary.categories, no_color),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindboard_core::{DashboardConfig, SurveyParser};
    use std::path::Path;

    const CSV: &str = "Age,Course,Gender,CGPA,Stress_Level,Depression_Score,Anxiety_Score,Sleep_Quality,Physical_Activity,Diet_Quality,Social_Support,Relationship_Status,Substance_Use,Counseling_Service_Use,Family_History,Chronic_Illness,Financial_Stress,Extracurricular_Involvement,Semester_Credit_Load,Residence_Type
20,Law,Female,3.2,1,1,1,Good,Average,Poor,High,Single,Never,Never,No,No,2,Moderate,17,On-Campus
21,Medical,Male,3.6,4,4,4,Poor,Low,Good,Low,Single,Never,Frequently,No,No,4,High,20,Off-Campus
22,Law,Male,3.0,4,4,4,Good,High,Average,Moderate,Single,Never,Never,No,No,1,Low,18,On-Campus
19,Law,Female,not-a-number,1,1,1,Good,High,Average,Moderate,Single,Never,Never,No,No,1,Low,18,On-Campus";

    fn summary() -> (SurveySummary, LoadReport) {
        let (rows, report) = SurveyParser::new().parse_str(CSV, Path::new("survey.csv")).unwrap();
        (SurveySummary::compute(&rows, &DashboardConfig::default()), report)
    }

    #[test]
    fn test_load_report_lists_dropped_rows() {
        let (_, report) = summary();
        let text = format_load_report(&report);
        assert!(text.starts_with("Survey: kept 3 of 4 rows (1 malformed, 0 out of range)"));
        assert!(text.contains("line 5: CGPA is not a number"));
    }

    #[test]
    fn test_aggregate_table_has_every_course_and_total() {
        let (summary, _) = summary();
        let text = format_aggregate_table(&summary.table, true);
        for course in Course::ALL {
            assert!(text.contains(course.name()), "missing {}", course);
        }
        assert!(text.contains("Total"));
        // Law sleep: two Good answers
        assert!(text.contains("0/0/2"));
    }

    #[test]
    fn test_counseling_means() {
        let (summary, _) = summary();
        let text = format_counseling(&summary, true);
        assert!(text.contains("Never"));
        assert!(text.contains("3.10"));
        assert!(text.contains("3.60"));
    }

    #[test]
    fn test_categories_table() {
        let (summary, _) = summary();
        let text = format_categories(&summary.categories, true);
        assert!(text.contains("all"));
        assert!(text.contains("none"));
        assert!(text.contains("66.67%"));
    }

    #[test]
    fn test_summary_sections() {
        let (summary, _) = summary();
        let text = format_summary(&summary, false);
        assert!(text.starts_with("Well-being by course"));
        assert!(text.contains("Counseling"));
        assert!(text.contains("Mental health categories"));
    }
}
