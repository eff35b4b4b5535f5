mod common;

use std::collections::BTreeMap;

use serde_json::json;

use sdtm_core::ProcessedDomain;
use sdtm_model::{CtRegistry, IssueCategory, Severity, ValidationIssue};
use sdtm_validate::rules::{
    ArmInTa, CodelistValues, DateOrder, DateTimeFormat, DmUniqueSubject, DomainCode, PairedTest,
    RangeOrder, RecordReference, RequiredValues, SequenceUnique, StudyDayZero, SubjectInDm,
    VisitInSv,
};
use sdtm_validate::{
    RULE_FAILED_ID, RuleEngine, RuleError, ValidationContext, ValidationOptions, ValidationRule,
};

use common::{
    ae_domain, ct_registry, dm_domain, dm_frame, frame, ny_codelist, processed, relrec_domain,
    study, sv_domain, ta_domain, vs_domain,
};

fn run_with(
    rule: impl ValidationRule + 'static,
    study: &BTreeMap<String, ProcessedDomain>,
    ct: &CtRegistry,
    code: &str,
) -> Vec<ValidationIssue> {
    let mut engine = RuleEngine::new(ValidationOptions::default());
    engine.register(Box::new(rule));
    engine
        .validate_study("STUDY1", study, ct, &BTreeMap::new())
        .remove(code)
        .unwrap_or_default()
}

fn run(
    rule: impl ValidationRule + 'static,
    study: &BTreeMap<String, ProcessedDomain>,
    code: &str,
) -> Vec<ValidationIssue> {
    run_with(rule, study, &ct_registry(), code)
}

fn ae(subjects: &[&str], seqs: &[&str]) -> ProcessedDomain {
    let study = vec!["STUDY1"; subjects.len()];
    let domain = vec!["AE"; subjects.len()];
    let terms = vec!["HEADACHE"; subjects.len()];
    processed(
        ae_domain(),
        frame(&[
            ("STUDYID", study.as_slice()),
            ("DOMAIN", domain.as_slice()),
            ("USUBJID", subjects),
            ("AESEQ", seqs),
            ("AETERM", terms.as_slice()),
        ]),
    )
}

#[test]
fn duplicate_sequence_reports_one_subject() {
    let study = study(vec![ae(&["001", "001"], &["1", "1"])]);
    let issues = run(SequenceUnique, &study, "AE");
    assert_eq!(issues.len(), 1);
    let issue = &issues[0];
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.category, IssueCategory::Consistency);
    assert_eq!(issue.variable.as_deref(), Some("AESEQ"));
    assert_eq!(issue.details["subject_count"], json!(1));
    assert_eq!(issue.details["subjects"], json!(["001"]));
}

#[test]
fn exempt_domains_skip_sequence_check() {
    let study = study(vec![ae(&["001", "001"], &["1", "1"])]);
    let mut options = ValidationOptions::default();
    options.sequence_exempt_domains.insert("AE".to_string());
    let mut engine = RuleEngine::new(options);
    engine.register(Box::new(SequenceUnique));
    let issues = engine.validate_study("STUDY1", &study, &ct_registry(), &BTreeMap::new());
    assert!(issues["AE"].is_empty());
}

#[test]
fn subject_missing_from_dm_is_reported_once() {
    let study = study(vec![
        processed(dm_domain(), dm_frame(&["001"])),
        ae(&["001", "002", "002"], &["1", "1", "2"]),
    ]);
    let issues = run(SubjectInDm, &study, "AE");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].category, IssueCategory::CrossReference);
    assert_eq!(issues[0].count(), Some(1));
    assert_eq!(issues[0].details["record_count"], json!(2));
}

struct BrokenRule;

impl ValidationRule for BrokenRule {
    fn id(&self) -> &'static str {
        "TEST.BROKEN"
    }

    fn category(&self) -> IssueCategory {
        IssueCategory::Consistency
    }

    fn evaluate(
        &self,
        _context: &ValidationContext<'_>,
    ) -> Result<Vec<ValidationIssue>, RuleError> {
        Err(RuleError::Data("lookup table unavailable".to_string()))
    }
}

#[test]
fn failing_rule_does_not_hide_other_rules() {
    let study = study(vec![ae(&["001", "001"], &["1", "1"])]);
    let options = ValidationOptions::default();
    let mut engine = RuleEngine::new(options.clone());
    engine.register(Box::new(SequenceUnique));
    engine.register(Box::new(BrokenRule));
    engine.register(Box::new(DomainCode));

    let ct = ct_registry();
    let reference_starts = BTreeMap::new();
    let ae = &study["AE"];
    let context = ValidationContext {
        study_id: "STUDY1",
        domain: &ae.domain,
        data: &ae.data,
        study: &study,
        ct: &ct,
        reference_starts: &reference_starts,
        options: &options,
    };
    let issues = engine.validate_domain(&context);

    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].rule_id, "CONSISTENCY.SEQ_UNIQUE");
    let failed = &issues[1];
    assert_eq!(failed.rule_id, RULE_FAILED_ID);
    assert_eq!(failed.severity, Severity::Warning);
    assert_eq!(failed.category, IssueCategory::Structure);
    assert_eq!(failed.domain.as_deref(), Some("AE"));
    assert_eq!(failed.details["rule"], json!("TEST.BROKEN"));
}

#[test]
fn blank_required_values_name_the_subjects() {
    let mut ae = ae(&["001", "002"], &["1", "1"]);
    ae.data = frame(&[
        ("STUDYID", &["STUDY1", "STUDY1"]),
        ("DOMAIN", &["AE", "AE"]),
        ("USUBJID", &["001", "002"]),
        ("AESEQ", &["1", "1"]),
        ("AETERM", &["HEADACHE", ""]),
    ]);
    let issues = run(RequiredValues, &study(vec![ae]), "AE");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].variable.as_deref(), Some("AETERM"));
    assert_eq!(issues[0].count(), Some(1));
    assert_eq!(issues[0].details["subjects"], json!(["002"]));
}

#[test]
fn missing_required_column_is_an_error() {
    let dm = processed(
        dm_domain(),
        frame(&[("STUDYID", &["STUDY1"]), ("USUBJID", &["001"])]),
    );
    let issues = run(RequiredValues, &study(vec![dm]), "DM");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].variable.as_deref(), Some("DOMAIN"));
    assert_eq!(issues[0].details["missing_column"], json!(true));
}

#[test]
fn wrong_domain_code_is_reported() {
    let mut ae = ae(&["001", "002"], &["1", "1"]);
    ae.data = frame(&[
        ("DOMAIN", &["AE", "CM"]),
        ("USUBJID", &["001", "002"]),
    ]);
    let issues = run(DomainCode, &study(vec![ae]), "AE");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details["values"], json!(["CM"]));
}

#[test]
fn dates_and_days_out_of_order() {
    let ae = processed(
        ae_domain(),
        frame(&[
            ("USUBJID", &["001", "001", "001"]),
            ("AESTDTC", &["2023-02-01", "2023-01-01", "2023-03"]),
            ("AEENDTC", &["2023-01-01", "2023-01-05", "2023-03-15"]),
            ("AESTDY", &["5", "1", ""]),
            ("AEENDY", &["3", "2", ""]),
        ]),
    );
    let issues = run(DateOrder, &study(vec![ae]), "AE");
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].variable.as_deref(), Some("AESTDTC"));
    assert_eq!(issues[0].count(), Some(1));
    assert_eq!(issues[1].variable.as_deref(), Some("AESTDY"));
}

#[test]
fn study_day_zero_is_rejected() {
    let ae = processed(
        ae_domain(),
        frame(&[
            ("USUBJID", &["001", "001"]),
            ("AESTDY", &["0", "-1"]),
        ]),
    );
    let issues = run(StudyDayZero, &study(vec![ae]), "AE");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].variable.as_deref(), Some("AESTDY"));
}

#[test]
fn invalid_date_format_samples_values() {
    let ae = processed(
        ae_domain(),
        frame(&[
            ("USUBJID", &["001", "001"]),
            ("AESTDTC", &["2023-01-15", "15/01/2023"]),
        ]),
    );
    let issues = run(DateTimeFormat, &study(vec![ae]), "AE");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].category, IssueCategory::Format);
    assert_eq!(issues[0].details["values"], json!(["15/01/2023"]));
}

/// Rows of `[VSTESTCD, VSTEST, VISITNUM, VSSTAT]` for subject 001.
fn vs(rows: &[[&str; 4]]) -> ProcessedDomain {
    let column = |idx: usize| rows.iter().map(|row| row[idx]).collect::<Vec<_>>();
    let subjects = vec!["001"; rows.len()];
    let (testcd, test, visitnum, stat) = (column(0), column(1), column(2), column(3));
    processed(
        vs_domain(),
        frame(&[
            ("USUBJID", subjects.as_slice()),
            ("VSTESTCD", testcd.as_slice()),
            ("VSTEST", test.as_slice()),
            ("VISITNUM", visitnum.as_slice()),
            ("VSSTAT", stat.as_slice()),
        ]),
    )
}

#[test]
fn test_code_with_two_names() {
    let study = study(vec![vs(&[
        ["SYSBP", "Systolic Blood Pressure", "1", ""],
        ["SYSBP", "Systolic BP", "1", ""],
        ["PULSE", "Pulse Rate", "1", ""],
    ])]);
    let issues = run(PairedTest, &study, "VS");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details["code"], json!("SYSBP"));
    assert_eq!(issues[0].count(), Some(2));
}

#[test]
fn reference_range_low_above_high() {
    let vs = processed(
        vs_domain(),
        frame(&[
            ("USUBJID", &["001", "001"]),
            ("VSSTNRLO", &["140", "60"]),
            ("VSSTNRHI", &["90", "100"]),
        ]),
    );
    let issues = run(RangeOrder, &study(vec![vs]), "VS");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].count(), Some(1));
}

#[test]
fn visits_need_sv_records_unless_not_done() {
    let sv = processed(
        sv_domain(),
        frame(&[("USUBJID", &["001"]), ("VISITNUM", &["1"])]),
    );
    let study = study(vec![
        sv,
        vs(&[
            ["SYSBP", "Systolic Blood Pressure", "1", ""],
            ["SYSBP", "Systolic Blood Pressure", "2", ""],
            ["SYSBP", "Systolic Blood Pressure", "3", "NOT DONE"],
        ]),
    ]);
    let issues = run(VisitInSv, &study, "VS");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[0].count(), Some(1));
    assert_eq!(issues[0].details["visits"], json!(["001 2"]));
}

#[test]
fn visit_numbers_match_by_value() {
    let sv = processed(
        sv_domain(),
        frame(&[("USUBJID", &["001", "001"]), ("VISITNUM", &["1", "2.50"])]),
    );
    let study = study(vec![
        sv,
        vs(&[
            ["SYSBP", "Systolic Blood Pressure", "1.0", ""],
            ["SYSBP", "Systolic Blood Pressure", "2.5", ""],
            ["SYSBP", "Systolic Blood Pressure", "UNSCHED", ""],
        ]),
    ]);
    let issues = run(VisitInSv, &study, "VS");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].count(), Some(1));
    assert_eq!(issues[0].details["visits"], json!(["001 UNSCHED"]));
}

#[test]
fn arm_codes_resolve_against_ta_with_exemptions() {
    let ta = processed(ta_domain(), frame(&[("ARMCD", &["A"])]));
    let dm = processed(
        dm_domain(),
        frame(&[
            ("USUBJID", &["001", "002", "003", "004"]),
            ("ARMCD", &["A", "SCRNFAIL", "B", ""]),
            ("ACTARMCD", &["A", "NOTASSGN", "A", ""]),
        ]),
    );
    let issues = run(ArmInTa, &study(vec![ta, dm]), "DM");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].variable.as_deref(), Some("ARMCD"));
    assert_eq!(issues[0].details["values"], json!(["B"]));
}

#[test]
fn record_references_must_resolve() {
    let relrec = processed(
        relrec_domain(),
        frame(&[
            ("RDOMAIN", &["AE", "AE", "XX"]),
            ("USUBJID", &["001", "001", "001"]),
            ("IDVAR", &["AESEQ", "AESEQ", "XXSEQ"]),
            ("IDVARVAL", &["1", "9", "1"]),
            ("RELID", &["R1", "R1", "R2"]),
        ]),
    );
    let study = study(vec![ae(&["001"], &["1"]), relrec]);
    let issues = run(RecordReference, &study, "RELREC");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].count(), Some(2));
    assert_eq!(
        issues[0].details["references"],
        json!(["AE.AESEQ=9", "XX.XXSEQ=1"])
    );
}

#[test]
fn duplicate_dm_subjects() {
    let dm = processed(dm_domain(), dm_frame(&["001", "002", "001"]));
    let issues = run(DmUniqueSubject, &study(vec![dm]), "DM");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details["subjects"], json!(["001"]));
}

#[test]
fn codelist_severity_follows_extensibility() {
    let mut ae = ae(&["001", "002"], &["1", "1"]);
    ae.data = frame(&[
        ("USUBJID", &["001", "002"]),
        ("AESER", &["Y", "MAYBE"]),
    ]);
    let study = study(vec![ae]);

    let strict = run(CodelistValues, &study, "AE");
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].severity, Severity::Error);
    assert_eq!(strict[0].details["values"], json!(["MAYBE"]));

    let mut extensible = ny_codelist();
    extensible.extensible = true;
    let tolerant = run_with(
        CodelistValues,
        &study,
        &CtRegistry::from_codelists([extensible]),
        "AE",
    );
    assert_eq!(tolerant.len(), 1);
    assert_eq!(tolerant[0].severity, Severity::Warning);
}

#[test]
fn clean_study_passes_every_default_rule() {
    let mut ae = ae(&["001"], &["1"]);
    ae.data = frame(&[
        ("STUDYID", &["STUDY1"]),
        ("DOMAIN", &["AE"]),
        ("USUBJID", &["001"]),
        ("AESEQ", &["1"]),
        ("AETERM", &["HEADACHE"]),
        ("AESER", &["N"]),
        ("AESTDTC", &["2023-01-15"]),
        ("AEENDTC", &["2023-01-20"]),
    ]);
    let study = study(vec![processed(dm_domain(), dm_frame(&["001"])), ae]);
    let engine = RuleEngine::with_default_rules(ValidationOptions::default());
    let issues = engine.validate_study("STUDY1", &study, &ct_registry(), &BTreeMap::new());
    assert_eq!(issues.len(), 2);
    assert!(issues.values().all(Vec::is_empty), "{issues:#?}");
}
