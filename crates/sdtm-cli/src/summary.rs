//! Terminal summary of a study run.

use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use sdtm_model::{Severity, ValidationIssue};
use sdtm_validate::StudyValidationReport;

/// Issues listed under the summary table.
const ISSUE_ROW_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub domain: String,
    pub description: String,
    pub records: Option<usize>,
    pub errors: usize,
    pub warnings: usize,
    pub status: String,
}

/// One row per validated domain, then one per domain that failed processing.
pub fn summary_rows(
    report: &StudyValidationReport,
    descriptions: &BTreeMap<String, String>,
) -> Vec<SummaryRow> {
    let description = |code: &str| descriptions.get(code).cloned().unwrap_or_default();
    let mut rows: Vec<SummaryRow> = report
        .domains
        .iter()
        .map(|domain| SummaryRow {
            domain: domain.domain_code.clone(),
            description: description(&domain.domain_code),
            records: Some(domain.records),
            errors: domain.error_count,
            warnings: domain.warning_count,
            status: if domain.error_count > 0 {
                "review".to_string()
            } else {
                "ok".to_string()
            },
        })
        .collect();
    rows.extend(report.failures.iter().map(|failure| SummaryRow {
        domain: failure.domain_code.clone(),
        description: description(&failure.domain_code),
        records: None,
        errors: 0,
        warnings: 0,
        status: format!("failed: {}", failure.kind),
    }));
    rows.sort_by(|left, right| left.domain.cmp(&right.domain));
    rows
}

pub fn summary_table(rows: &[SummaryRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("Domain"),
            header_cell("Description"),
            header_cell("Records"),
            header_cell("Errors"),
            header_cell("Warnings"),
            header_cell("Status"),
        ]);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let (mut records, mut errors, mut warnings) = (0usize, 0usize, 0usize);
    for row in rows {
        records += row.records.unwrap_or(0);
        errors += row.errors;
        warnings += row.warnings;
        table.add_row(vec![
            Cell::new(&row.domain)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&row.description),
            match row.records {
                Some(count) => Cell::new(count),
                None => dim_cell("-"),
            },
            count_cell(row.errors, Color::Red),
            count_cell(row.warnings, Color::Yellow),
            status_cell(&row.status),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(""),
        Cell::new(records).add_attribute(Attribute::Bold),
        count_cell(errors, Color::Red).add_attribute(Attribute::Bold),
        count_cell(warnings, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell(""),
    ]);
    table
}

/// Errors first, then warnings; Info issues stay in the JSON report.
pub fn issue_table(report: &StudyValidationReport) -> Option<Table> {
    let mut issues: Vec<&ValidationIssue> = report
        .issues()
        .filter(|issue| issue.severity != Severity::Info)
        .collect();
    if issues.is_empty() {
        return None;
    }
    issues.sort_by(|left, right| {
        (left.severity, &left.domain, &left.rule_id).cmp(&(
            right.severity,
            &right.domain,
            &right.rule_id,
        ))
    });

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header_cell("Domain"),
            header_cell("Severity"),
            header_cell("Rule"),
            header_cell("Variable"),
            header_cell("Count"),
            header_cell("Message"),
        ]);
    align_column(&mut table, 4, CellAlignment::Right);
    for issue in issues.iter().take(ISSUE_ROW_LIMIT) {
        table.add_row(vec![
            Cell::new(issue.domain.as_deref().unwrap_or("-")),
            severity_cell(issue.severity),
            Cell::new(&issue.rule_id),
            Cell::new(issue.variable.as_deref().unwrap_or("-")),
            match issue.count() {
                Some(count) => Cell::new(count),
                None => dim_cell("-"),
            },
            Cell::new(&issue.message),
        ]);
    }
    if issues.len() > ISSUE_ROW_LIMIT {
        table.add_row(vec![
            dim_cell("..."),
            dim_cell(""),
            dim_cell(format!("{} more in the JSON report", issues.len() - ISSUE_ROW_LIMIT)),
        ]);
    }
    Some(table)
}

pub fn print_summary(report: &StudyValidationReport, descriptions: &BTreeMap<String, String>) {
    println!("Study: {}", report.study_id);
    println!("{}", summary_table(&summary_rows(report, descriptions)));
    if let Some(table) = issue_table(report) {
        println!();
        println!("Issues:");
        println!("{table}");
    }
    for failure in &report.failures {
        eprintln!("error: {} failed ({}): {}", failure.domain_code, failure.kind, failure.message);
    }
}

pub fn domain_table(domains: &[(String, String)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![header_cell("Domain"), header_cell("Description")]);
    for (code, description) in domains {
        table.add_row(vec![Cell::new(code), Cell::new(description)]);
    }
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn status_cell(status: &str) -> Cell {
    match status {
        "ok" => Cell::new(status).fg(Color::Green),
        "review" => Cell::new(status).fg(Color::Yellow),
        _ => Cell::new(status).fg(Color::Red).add_attribute(Attribute::Bold),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::DarkGrey),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use sdtm_model::IssueCategory;
    use sdtm_validate::{DomainReport, FailureEntry};

    use super::*;

    fn report() -> StudyValidationReport {
        let seq = ValidationIssue::new(
            "CONSISTENCY.SEQ_UNIQUE",
            Severity::Error,
            IssueCategory::Consistency,
            "AESEQ is not unique within USUBJID for 1 subject(s)",
        )
        .in_domain("AE")
        .with_detail("count", 1);
        StudyValidationReport::new(
            "STUDY1",
            vec![
                DomainReport::new("AE", 12, vec![seq]),
                DomainReport::new("DM", 4, Vec::new()),
            ],
            vec![FailureEntry {
                domain_code: "LB".to_string(),
                kind: "paired term mismatch".to_string(),
                message: "LBTESTCD GLUC has 2 LBTEST values".to_string(),
            }],
        )
    }

    fn descriptions() -> BTreeMap<String, String> {
        [("AE", "Adverse Events"), ("DM", "Demographics"), ("LB", "Laboratory Test Results")]
            .into_iter()
            .map(|(code, label)| (code.to_string(), label.to_string()))
            .collect()
    }

    #[test]
    fn rows_cover_validated_and_failed_domains() {
        let rows = summary_rows(&report(), &descriptions());
        insta::assert_json_snapshot!(rows, @r#"
        [
          {
            "domain": "AE",
            "description": "Adverse Events",
            "records": 12,
            "errors": 1,
            "warnings": 0,
            "status": "review"
          },
          {
            "domain": "DM",
            "description": "Demographics",
            "records": 4,
            "errors": 0,
            "warnings": 0,
            "status": "ok"
          },
          {
            "domain": "LB",
            "description": "Laboratory Test Results",
            "records": null,
            "errors": 0,
            "warnings": 0,
            "status": "failed: paired term mismatch"
          }
        ]
        "#);
    }

    #[test]
    fn table_ends_with_totals() {
        let mut table = summary_table(&summary_rows(&report(), &descriptions()));
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("TOTAL"));
        assert!(rendered.contains("16"));
        assert!(rendered.contains("failed: paired term mismatch"));
    }

    #[test]
    fn issue_table_skips_clean_reports() {
        let clean = StudyValidationReport::new(
            "STUDY1",
            vec![DomainReport::new("DM", 4, Vec::new())],
            Vec::new(),
        );
        assert!(issue_table(&clean).is_none());
        assert!(issue_table(&report()).is_some());
    }
}
