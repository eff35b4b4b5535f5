mod common;

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use sdtm_core::{PipelineContext, default_registry, process_domain};
use sdtm_model::{
    CtMatchingMode, Domain, ProcessingOptions, SdtmError, SequenceAssignmentMode, Variable,
    VariableRole, VariableType,
};

use common::{ae_domain, dm_domain, frame, lb_domain, numbers, registry, strings};

fn starts(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(subject, start)| (subject.to_string(), start.to_string()))
        .collect()
}

fn ae_frame() -> DataFrame {
    frame(&[
        ("STUDYID", &["S1", "S1", "S1", ""]),
        ("USUBJID", &["001", "001", "002", "USUBJID"]),
        ("AETERM", &["Headache", "Nausea", "Rash", "AETERM"]),
        ("AEOUT", &["recovered", "DEATH", "Not Recovered", ""]),
        ("AESEV", &["GRADE 3", "mild", "2", ""]),
        ("AESER", &["Yes", "N", "0", ""]),
        ("AESTDTC", &["2023-01-20", "2023-01-10", "2023/02/01", ""]),
        ("AEENDTC", &["2023-01-18", "", "UNK", ""]),
        ("AESEQ", &["5", "5", "9", ""]),
    ])
}

#[test]
fn adverse_events_are_normalized() {
    let registry = registry();
    let domain = ae_domain();
    let context = PipelineContext::new("S1", &registry)
        .with_reference_starts(starts(&[("S1-001", "2023-01-15"), ("S1-002", "2023-02-01")]));
    let mut df = ae_frame();

    process_domain(&domain, &mut df, &context).expect("process AE");

    assert_eq!(df.height(), 3);
    assert_eq!(strings(&df, "USUBJID"), ["S1-001", "S1-001", "S1-002"]);
    assert_eq!(
        strings(&df, "AEOUT"),
        ["RECOVERED/RESOLVED", "FATAL", "NOT RECOVERED/NOT RESOLVED"]
    );
    // "mild" is neither a lookup key nor a registered synonym
    assert_eq!(strings(&df, "AESEV"), ["SEVERE", "mild", "MODERATE"]);
    assert_eq!(strings(&df, "AESER"), ["Y", "N", "N"]);
    assert_eq!(strings(&df, "AESTDTC"), ["2023-01-20", "2023-01-10", "2023-02-01"]);
    assert_eq!(strings(&df, "AEENDTC"), ["2023-01-20", "2023-01-10", "2023-02-01"]);
    assert_eq!(numbers(&df, "AESTDY"), [Some(6.0), Some(-5.0), Some(1.0)]);
    assert_eq!(numbers(&df, "AEENDY"), [Some(6.0), Some(-5.0), Some(1.0)]);
    assert_eq!(numbers(&df, "AESEQ"), [Some(1.0), Some(2.0), Some(1.0)]);
    assert_eq!(strings(&df, "DOMAIN"), ["AE", "AE", "AE"]);
}

/// Schema with identifiers taken from the names; `nums` are numeric variables.
fn schema(code: &str, chars: &[&str], nums: &[&str]) -> Domain {
    let role = |name: &str| {
        if matches!(name, "STUDYID" | "DOMAIN" | "USUBJID") || name.ends_with("SEQ") {
            VariableRole::Identifier
        } else {
            VariableRole::Qualifier
        }
    };
    let variables = chars
        .iter()
        .map(|name| (name, VariableType::Char))
        .chain(nums.iter().map(|name| (name, VariableType::Num)))
        .map(|(name, data_type)| Variable::new(*name, data_type).with_role(role(*name)))
        .collect();
    Domain::new(code, variables)
}

fn demographics_frame() -> DataFrame {
    frame(&[
        ("USUBJID", &["001", "002", "003"]),
        ("SUBJID", &["001", "002", "003"]),
        ("BRTHDTC", &["1980-06-15", "", "1975/03/01"]),
        ("RFSTDTC", &["2023-01-15", "2023-01-12", ""]),
        ("RFICDTC", &["2023-01-10", "2023-01-14", ""]),
        ("AGE", &["", "51", ""]),
        ("SEX", &["Male", "f", ""]),
        ("COUNTRY", &["", "can", "UNK"]),
        ("DTHDTC", &["", "", "2023-03-01"]),
        ("ARMCD", &["a", "", ""]),
        ("ARM", &["Drug", "", "Placebo"]),
    ])
}

/// One fixture per registered processor plus one for the default rules.
fn every_processor_fixture() -> Vec<(Domain, DataFrame)> {
    vec![
        (ae_domain(), ae_frame()),
        (
            schema(
                "CM",
                &["USUBJID", "CMTRT", "CMDECOD", "CMSTAT", "CMDOSU", "CMSTDTC", "CMENDTC", "CMDUR"],
                &["CMSEQ", "CMDOSE", "CMSTDY", "CMENDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("CMTRT", &["Aspirin", "Ibuprofen"]),
                ("CMDECOD", &["", "IBUPROFEN"]),
                ("CMSTAT", &["ND", ""]),
                ("CMDOSE", &["100", "200.5"]),
                ("CMDOSU", &["mg", "UNK"]),
                ("CMSTDTC", &["2023-01-16", "2023/01/20"]),
                ("CMENDTC", &["", "2023-01-18"]),
                ("CMDUR", &["2 days", "01:30"]),
            ]),
        ),
        (
            schema(
                "DA",
                &[
                    "USUBJID", "DATESTCD", "DATEST", "DAORRES", "DAORRESU", "DASTRESC",
                    "DASTRESU", "DASTAT", "DAREASND", "DADTC",
                ],
                &["DASEQ", "DASTRESN", "DADY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("DATESTCD", &["DISPAMT", "RETAMT"]),
                ("DATEST", &["Dispensed Amount", "Returned Amount"]),
                ("DAORRES", &["30", ""]),
                ("DAORRESU", &["TABLET", "TABLET"]),
                ("DASTAT", &["", ""]),
                ("DAREASND", &["", "Bottle lost"]),
                ("DADTC", &["2023-01-15", "2023-02-15"]),
            ]),
        ),
        (dm_domain(), demographics_frame()),
        (
            schema(
                "DS",
                &["USUBJID", "DSTERM", "DSDECOD", "DSCAT", "DSSTDTC"],
                &["DSSEQ", "DSSTDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("DSTERM", &["Subject withdrew consent", "Moved away"]),
                ("DSDECOD", &["", ""]),
                ("DSSTDTC", &["2023-03-01", "03/02/2023"]),
            ]),
        ),
        (
            schema(
                "EX",
                &["USUBJID", "EXTRT", "EXDOSU", "EXSTDTC", "EXENDTC", "EXDUR"],
                &["EXSEQ", "EXDOSE", "EXSTDY", "EXENDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("EXTRT", &["Drug", "Drug"]),
                ("EXDOSE", &["10", "abc"]),
                ("EXDOSU", &["mg", "mg"]),
                ("EXSTDTC", &["2023-01-15", "2023-01-22"]),
                ("EXENDTC", &["2023-01-21", ""]),
                ("EXDUR", &["1 week", "P2W"]),
            ]),
        ),
        (
            schema(
                "IE",
                &["USUBJID", "IETESTCD", "IETEST", "IEORRES", "IESTRESC", "IECAT", "IEDTC"],
                &["IESEQ", "IEDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("IETESTCD", &["IN01", "EX02"]),
                ("IETEST", &["Age 18 or older", "Prior therapy"]),
                ("IEORRES", &["No", "yes"]),
                ("IECAT", &["INCLUSION", "EXCLUSION"]),
                ("IEDTC", &["2023-01-10", "2023-01-10"]),
            ]),
        ),
        (lb_domain(), lab_frame()),
        (
            schema(
                "MH",
                &["USUBJID", "MHTERM", "MHDECOD", "MHOCCUR", "MHENRF", "MHSTDTC", "MHENDTC"],
                &["MHSEQ", "MHSTDY", "MHENDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("MHTERM", &["Asthma", "Migraine"]),
                ("MHDECOD", &["", ""]),
                ("MHOCCUR", &["yes", "N"]),
                ("MHENRF", &["Y", "PRIOR"]),
                ("MHSTDTC", &["2010", "2015-06"]),
                ("MHENDTC", &["", "2016-UN-UN"]),
            ]),
        ),
        (
            schema(
                "PE",
                &[
                    "USUBJID", "PETESTCD", "PETEST", "PEORRES", "PESTRESC", "PESTAT", "PECLSIG",
                    "PEDTC",
                ],
                &["PESEQ", "PEDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("PETESTCD", &["HEART", "SKIN"]),
                ("PETEST", &["Heart", "Skin"]),
                ("PEORRES", &["WNL", "abn"]),
                ("PESTAT", &["", "DONE"]),
                ("PECLSIG", &["", "Yes"]),
                ("PEDTC", &["2023-01-15", "2023-01-15"]),
            ]),
        ),
        (
            schema(
                "PR",
                &["USUBJID", "PRTRT", "PRDECOD", "PRSTDTC", "PRENDTC", "PRDUR"],
                &["PRSEQ", "PRSTDY", "PRENDY"],
            ),
            frame(&[
                ("USUBJID", &["001"]),
                ("PRTRT", &["Appendectomy"]),
                ("PRDECOD", &[""]),
                ("PRSTDTC", &["2023-01-20T08:00"]),
                ("PRENDTC", &["2023-01-20T09:30"]),
                ("PRDUR", &["90 minutes"]),
            ]),
        ),
        (
            schema(
                "QS",
                &[
                    "USUBJID", "QSTESTCD", "QSTEST", "QSORRES", "QSSTRESC", "QSCAT", "QSSTAT",
                    "QSDTC", "QSELTM", "QSLOBXFL",
                ],
                &["QSSEQ", "QSSTRESN", "QSDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("QSTESTCD", &["PAIN", "PAIN"]),
                ("QSTEST", &["Pain Score", "Pain Score"]),
                ("QSORRES", &["4", "2"]),
                ("QSSTAT", &["", ""]),
                ("QSDTC", &["2023-01-15", "2023-01-22"]),
                ("QSELTM", &["", "1 week"]),
            ]),
        ),
        (
            schema(
                "SE",
                &["USUBJID", "ETCD", "SESTDTC", "SEENDTC"],
                &["SESEQ", "SESTDY", "SEENDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("ETCD", &["scrn", "trt"]),
                ("SESTDTC", &["2023-01-10", "2023-01-15"]),
                ("SEENDTC", &["2023-01-15", ""]),
            ]),
        ),
        (
            schema("TA", &["STUDYID", "DOMAIN", "ARMCD", "ARM", "ETCD"], &["TAETORD"]),
            frame(&[
                ("ARMCD", &["a", "a"]),
                ("ARM", &["Drug", "Drug"]),
                ("ETCD", &["scrn", "trt"]),
                ("TAETORD", &["1", "2"]),
            ]),
        ),
        (
            schema("TE", &["STUDYID", "DOMAIN", "ETCD", "ELEMENT", "TEDUR"], &[]),
            frame(&[
                ("ETCD", &["scrn", "TRT"]),
                ("ELEMENT", &["Screening", "Treatment"]),
                ("TEDUR", &["2 weeks", "p28d"]),
            ]),
        ),
        (
            schema("TS", &["STUDYID", "DOMAIN", "TSPARMCD", "TSPARM", "TSVAL"], &["TSSEQ"]),
            frame(&[
                ("TSPARMCD", &["agemin", "SEXPOP", "SEXPOP"]),
                ("TSPARM", &["Planned Minimum Age of Subjects", "Sex of Participants", ""]),
                ("TSVAL", &["P18Y", "F", "M"]),
            ]),
        ),
        (
            schema(
                "VS",
                &[
                    "USUBJID", "VSTESTCD", "VSTEST", "VSORRES", "VSORRESU", "VSSTRESC",
                    "VSSTRESU", "VSPOS", "VSSTAT", "VSDTC", "VSELTM", "VSLOBXFL",
                ],
                &["VSSEQ", "VSSTRESN", "VSDY"],
            ),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("VSTESTCD", &["SYSBP", "SYSBP"]),
                ("VSTEST", &["Systolic Blood Pressure", "Systolic Blood Pressure"]),
                ("VSORRES", &["120", ""]),
                ("VSORRESU", &["mmHg", "mmHg"]),
                ("VSPOS", &["sitting", "standing"]),
                ("VSSTAT", &["", "ND"]),
                ("VSDTC", &["2023-01-15", "2023-01-16"]),
                ("VSELTM", &["PT90M", ""]),
            ]),
        ),
        (
            schema("XY", &["USUBJID", "XYDTC", "XYDUR"], &["XYSEQ", "XYDY"]),
            frame(&[
                ("USUBJID", &["001", "001"]),
                ("XYDTC", &["2023/01/20", "20230121"]),
                ("XYDUR", &["1 hour 30 min", "45"]),
            ]),
        ),
    ]
}

#[test]
fn fixtures_cover_every_registered_processor() {
    let registry = default_registry();
    let codes: Vec<String> = every_processor_fixture()
        .into_iter()
        .map(|(domain, _)| domain.code)
        .collect();
    for code in &codes {
        let expected = if registry.contains(code) { code.as_str() } else { "*" };
        assert_eq!(registry.get(code).domain_code(), expected);
    }
    assert_eq!(
        codes.iter().filter(|code| registry.contains(code)).count(),
        registry.len()
    );
    assert!(codes.iter().any(|code| !registry.contains(code)));
}

#[test]
fn processing_twice_changes_nothing() {
    let registry = registry();
    let options = ProcessingOptions {
        default_country: Some("usa".to_string()),
        ..ProcessingOptions::default()
    };
    let context = PipelineContext::new("S1", &registry)
        .with_options(options)
        .with_reference_starts(starts(&[("S1-001", "2023-01-15")]));

    for (domain, mut df) in every_processor_fixture() {
        process_domain(&domain, &mut df, &context)
            .unwrap_or_else(|err| panic!("{} first pass: {err:#}", domain.code));
        let first = df.clone();
        process_domain(&domain, &mut df, &context)
            .unwrap_or_else(|err| panic!("{} second pass: {err:#}", domain.code));
        assert!(first.equals_missing(&df), "{} changed on second pass", domain.code);
    }
}

#[test]
fn lenient_codelist_matching_is_opt_in() {
    let registry = registry();
    let domain = ae_domain();
    let df = frame(&[
        ("USUBJID", &["001", "001"]),
        ("AETERM", &["Headache", "Rash"]),
        ("AESEV", &["mild", " Moderate "]),
    ]);

    let mut strict = df.clone();
    process_domain(&domain, &mut strict, &PipelineContext::new("S1", &registry))
        .expect("process AE");
    assert_eq!(strings(&strict, "AESEV"), ["mild", "Moderate"]);

    let lenient = ProcessingOptions {
        ct_matching: CtMatchingMode::Lenient,
        ..ProcessingOptions::default()
    };
    let mut df = df;
    process_domain(
        &domain,
        &mut df,
        &PipelineContext::new("S1", &registry).with_options(lenient),
    )
    .expect("process AE");
    assert_eq!(strings(&df, "AESEV"), ["MILD", "MODERATE"]);
}

#[test]
fn unmatched_codelist_values_are_left_for_validation() {
    let registry = registry();
    let domain = dm_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[("USUBJID", &["001", "002"]), ("SEX", &["female", "Fem"])]);

    process_domain(&domain, &mut df, &context).expect("process DM");

    // Synonyms ignore case; anything else is kept as written
    assert_eq!(strings(&df, "SEX"), ["F", "Fem"]);
}

#[test]
fn blank_usubjid_is_rebuilt_from_subject_id() {
    let registry = registry();
    let domain = dm_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[
        ("STUDYID", &["S1", "", "S1", "S1"]),
        ("USUBJID", &["", "NA", "", "SUBJID"]),
        ("SUBJID", &["101", "102", "", "SUBJID"]),
    ]);

    process_domain(&domain, &mut df, &context).expect("process DM");

    assert_eq!(df.height(), 2);
    assert_eq!(strings(&df, "USUBJID"), ["S1-101", "S1-102"]);
    assert_eq!(strings(&df, "STUDYID"), ["S1", "S1"]);
}

#[test]
fn usubjid_prefix_follows_each_rows_study() {
    let registry = registry();
    let domain = ae_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[
        ("STUDYID", &["S2", "S1", ""]),
        ("USUBJID", &["001", "002", "003"]),
        ("AETERM", &["Headache", "Rash", "Fever"]),
    ]);

    process_domain(&domain, &mut df, &context).expect("process AE");

    assert_eq!(strings(&df, "USUBJID"), ["S2-001", "S1-002", "S1-003"]);
    assert_eq!(strings(&df, "STUDYID"), ["S2", "S1", "S1"]);
}

#[test]
fn sequence_is_kept_when_assignment_is_skipped() {
    let registry = registry();
    let options = ProcessingOptions {
        sequence_assignment: SequenceAssignmentMode::Skip,
        ..ProcessingOptions::default()
    };
    let context = PipelineContext::new("S1", &registry).with_options(options);
    let domain = lb_domain();
    let mut df = lab_frame();

    process_domain(&domain, &mut df, &context).expect("process LB");

    assert_eq!(strings(&df, "LBSEQ"), ["7", "8", "9"]);
}

#[test]
fn demographics_defaults_and_reference_dates() {
    let registry = registry();
    let domain = dm_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[
        ("USUBJID", &["001", "002", "003"]),
        ("RFICDTC", &["2023-01-05", "2023-01-10", ""]),
        ("RFSTDTC", &["2023-01-03", "2023-01-12", ""]),
        ("RFXSTDTC", &["2023-01-04", "2023-01-12", "2023-01-20"]),
        ("SEX", &["Male", "", "unk"]),
        ("RACE", &["", "ASIAN", "NA"]),
        ("AGE", &["45", "", ""]),
        ("AGEU", &["", "", ""]),
        ("DTHDTC", &["", "2023-03-01", ""]),
        ("DTHFL", &["N", "", "Y"]),
        ("ARMCD", &["A", "", ""]),
        ("ACTARMCD", &["A", "B", ""]),
        ("ARM", &["Drug", "", "Placebo"]),
        ("COUNTRY", &["usa", "can", "usa"]),
    ]);

    process_domain(&domain, &mut df, &context).expect("process DM");

    assert_eq!(strings(&df, "USUBJID"), ["S1-001", "S1-002", "S1-003"]);
    assert_eq!(strings(&df, "SEX"), ["M", "U", "U"]);
    assert_eq!(strings(&df, "RACE"), ["UNKNOWN", "ASIAN", "UNKNOWN"]);
    assert_eq!(numbers(&df, "AGE"), [Some(45.0), None, None]);
    assert_eq!(strings(&df, "AGEU"), ["YEARS", "", ""]);
    assert_eq!(strings(&df, "DTHFL"), ["", "Y", "Y"]);
    assert_eq!(strings(&df, "COUNTRY"), ["USA", "CAN", "USA"]);

    // consent <= study start <= first exposure
    assert_eq!(strings(&df, "RFSTDTC"), ["2023-01-05", "2023-01-12", ""]);
    assert_eq!(strings(&df, "RFXSTDTC"), ["2023-01-05", "2023-01-12", ""]);

    assert_eq!(strings(&df, "ARM"), ["Drug", "", ""]);
    assert_eq!(strings(&df, "ARMNRS"), ["", "", "NOT ASSIGNED"]);
}

#[test]
fn demographics_country_default_and_derived_age() {
    let registry = registry();
    let domain = dm_domain();
    let options = ProcessingOptions {
        default_country: Some(" usa ".to_string()),
        ..ProcessingOptions::default()
    };
    let context = PipelineContext::new("S1", &registry).with_options(options);
    let mut df = demographics_frame();

    process_domain(&domain, &mut df, &context).expect("process DM");

    assert_eq!(strings(&df, "COUNTRY"), ["USA", "CAN", "USA"]);
    // Birthday not yet reached on RFSTDTC
    assert_eq!(numbers(&df, "AGE"), [Some(42.0), Some(51.0), None]);
    assert_eq!(strings(&df, "AGEU"), ["YEARS", "YEARS", ""]);
    assert_eq!(strings(&df, "SEX"), ["M", "f", "U"]);

    let mut df = demographics_frame();
    process_domain(&domain, &mut df, &PipelineContext::new("S1", &registry))
        .expect("process DM");
    assert_eq!(strings(&df, "COUNTRY"), ["", "CAN", "UNK"]);
}

fn lab_frame() -> DataFrame {
    frame(&[
        ("USUBJID", &["001", "001", "001"]),
        ("LBTESTCD", &["GLUC", "GLUC", "ALT"]),
        ("LBTEST", &["", "GLUC", "Alanine Aminotransferase"]),
        ("LBORRES", &["5.5", "6.1", ""]),
        ("LBORRESU", &["mmol/L", "mmol/L", "U/L"]),
        ("LBSTRESC", &["", "6.1", ""]),
        ("LBSTRESU", &["", "", ""]),
        ("LBDTC", &["2023-01-15", "2023-01-16", "2023-01-16"]),
        ("LBSEQ", &["7", "8", "9"]),
    ])
}

#[test]
fn findings_results_units_and_last_observation() {
    let registry = registry();
    let domain = lb_domain();
    let context = PipelineContext::new("S1", &registry)
        .with_reference_starts(starts(&[("S1-001", "2023-01-15")]));
    let mut df = lab_frame();

    process_domain(&domain, &mut df, &context).expect("process LB");

    assert_eq!(
        strings(&df, "LBTEST"),
        ["Glucose", "Glucose", "Alanine Aminotransferase"]
    );
    assert_eq!(strings(&df, "LBSTRESC"), ["5.5", "6.1", ""]);
    assert_eq!(strings(&df, "LBORRESU"), ["mmol/L", "mmol/L", ""]);
    assert_eq!(strings(&df, "LBSTRESU"), ["mmol/L", "mmol/L", ""]);
    assert_eq!(numbers(&df, "LBSTRESN"), [Some(5.5), Some(6.1), None]);
    assert_eq!(strings(&df, "LBLOBXFL"), ["", "Y", "Y"]);
    assert_eq!(numbers(&df, "LBDY"), [Some(1.0), Some(2.0), Some(2.0)]);
    assert_eq!(numbers(&df, "LBSEQ"), [Some(1.0), Some(2.0), Some(3.0)]);
}

#[test]
fn conflicting_test_names_fail_the_domain() {
    let registry = registry();
    let domain = lb_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[
        ("USUBJID", &["001", "002"]),
        ("LBTESTCD", &["ALT", "ALT"]),
        ("LBTEST", &["Alanine Aminotransferase", "Glucose"]),
    ]);

    let err = process_domain(&domain, &mut df, &context).expect_err("mismatch");

    match err.downcast_ref::<SdtmError>() {
        Some(SdtmError::PairedTermMismatch { code, decodes, .. }) => {
            assert_eq!(code, "ALT");
            assert_eq!(decodes.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn lowercase_headers_are_aligned_with_the_schema() {
    let registry = registry();
    let domain = ae_domain();
    let context = PipelineContext::new("S1", &registry);
    let mut df = frame(&[("usubjid", &["001"]), ("aeterm", &["Headache"])]);

    process_domain(&domain, &mut df, &context).expect("process AE");

    assert_eq!(strings(&df, "USUBJID"), ["S1-001"]);
    assert_eq!(strings(&df, "AETERM"), ["Headache"]);
}

#[test]
fn unlisted_domains_use_schema_driven_defaults() {
    let registry = registry();
    let domain = Domain::new(
        "XY",
        vec![
            Variable::new("USUBJID", VariableType::Char),
            Variable::new("XYDTC", VariableType::Char),
            Variable::new("XYDY", VariableType::Num),
            Variable::new("XYDUR", VariableType::Char),
        ],
    );
    assert_eq!(default_registry().get("XY").domain_code(), "*");
    let context = PipelineContext::new("", &registry)
        .with_reference_starts(starts(&[("001", "2023-01-15")]));
    let mut df = frame(&[
        ("USUBJID", &["001"]),
        ("XYDTC", &["2023/01/20"]),
        ("XYDUR", &["1 hour 30 min"]),
    ]);

    process_domain(&domain, &mut df, &context).expect("process XY");

    assert_eq!(strings(&df, "XYDTC"), ["2023-01-20"]);
    assert_eq!(strings(&df, "XYDUR"), ["PT1H30M"]);
    assert_eq!(numbers(&df, "XYDY"), [Some(6.0)]);
}
