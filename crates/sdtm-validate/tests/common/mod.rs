#![allow(dead_code)]

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};

use sdtm_core::{ProcessedDomain, StudyOutcome};
use sdtm_model::{
    ControlledTerminology, CoreDesignation, CtRegistry, DatasetClass, Domain, Variable,
    VariableType,
};

fn char_var(name: &str) -> Variable {
    Variable::new(name, VariableType::Char)
}

fn num_var(name: &str) -> Variable {
    Variable::new(name, VariableType::Num)
}

fn required(variable: Variable) -> Variable {
    variable.with_core(CoreDesignation::Required)
}

pub fn dm_domain() -> Domain {
    Domain::new(
        "DM",
        vec![
            required(char_var("STUDYID")),
            required(char_var("DOMAIN")),
            required(char_var("USUBJID")),
            char_var("ARMCD"),
            char_var("ACTARMCD"),
        ],
    )
    .with_class(DatasetClass::SpecialPurpose)
}

pub fn ae_domain() -> Domain {
    Domain::new(
        "AE",
        vec![
            required(char_var("STUDYID")),
            required(char_var("DOMAIN")),
            required(char_var("USUBJID")),
            required(num_var("AESEQ")),
            required(char_var("AETERM")),
            char_var("AESER").with_codelist("C66742"),
            char_var("AESTDTC"),
            char_var("AEENDTC"),
            num_var("AESTDY"),
            num_var("AEENDY"),
        ],
    )
    .with_class(DatasetClass::Events)
}

pub fn vs_domain() -> Domain {
    Domain::new(
        "VS",
        vec![
            required(char_var("STUDYID")),
            required(char_var("DOMAIN")),
            required(char_var("USUBJID")),
            required(num_var("VSSEQ")),
            required(char_var("VSTESTCD")),
            required(char_var("VSTEST")),
            char_var("VSSTAT"),
            num_var("VSSTNRLO"),
            num_var("VSSTNRHI"),
            num_var("VISITNUM"),
            num_var("VSDY"),
        ],
    )
    .with_class(DatasetClass::Findings)
}

pub fn sv_domain() -> Domain {
    Domain::new(
        "SV",
        vec![
            required(char_var("STUDYID")),
            required(char_var("DOMAIN")),
            required(char_var("USUBJID")),
            required(num_var("VISITNUM")),
        ],
    )
    .with_class(DatasetClass::SpecialPurpose)
}

pub fn ta_domain() -> Domain {
    Domain::new(
        "TA",
        vec![
            required(char_var("STUDYID")),
            required(char_var("DOMAIN")),
            required(char_var("ARMCD")),
        ],
    )
    .with_class(DatasetClass::TrialDesign)
}

pub fn relrec_domain() -> Domain {
    Domain::new(
        "RELREC",
        vec![
            required(char_var("STUDYID")),
            required(char_var("RDOMAIN")),
            char_var("USUBJID"),
            required(char_var("IDVAR")),
            required(char_var("IDVARVAL")),
            required(char_var("RELID")),
        ],
    )
    .with_class(DatasetClass::Relationship)
}

/// Non-extensible No/Yes codelist with only `N` and `Y`.
pub fn ny_codelist() -> ControlledTerminology {
    let mut ct = ControlledTerminology::new("C66742", "No Yes Response", false);
    ct.add_submission_value("N");
    ct.add_submission_value("Y");
    ct
}

pub fn ct_registry() -> CtRegistry {
    CtRegistry::from_codelists([ny_codelist()])
}

pub fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
    let columns: Vec<Column> = columns
        .iter()
        .map(|(name, values)| Column::new((*name).into(), values.to_vec()))
        .collect();
    DataFrame::new(columns).expect("frame")
}

pub fn processed(domain: Domain, data: DataFrame) -> ProcessedDomain {
    ProcessedDomain { domain, data }
}

pub fn study(domains: Vec<ProcessedDomain>) -> BTreeMap<String, ProcessedDomain> {
    domains
        .into_iter()
        .map(|processed| (processed.domain.code.clone(), processed))
        .collect()
}

pub fn outcome(domains: Vec<ProcessedDomain>) -> StudyOutcome {
    StudyOutcome {
        domains: study(domains),
        ..StudyOutcome::default()
    }
}

pub fn dm_frame(subjects: &[&str]) -> DataFrame {
    let study = vec!["STUDY1"; subjects.len()];
    let domain = vec!["DM"; subjects.len()];
    frame(&[
        ("STUDYID", study.as_slice()),
        ("DOMAIN", domain.as_slice()),
        ("USUBJID", subjects),
    ])
}
