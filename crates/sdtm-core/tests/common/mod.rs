#![allow(dead_code)]

use polars::prelude::{Column, DataFrame};

use sdtm_core::frame::{numeric_column_f64, string_column};
use sdtm_model::{
    ControlledTerminology, CoreDesignation, CtRegistry, DatasetClass, Domain, Variable,
    VariableRole, VariableType,
};
use sdtm_standards::StandardsRegistry;

fn char_var(name: &str) -> Variable {
    Variable::new(name, VariableType::Char)
}

fn num_var(name: &str) -> Variable {
    Variable::new(name, VariableType::Num)
}

fn identifiers(prefix: &str) -> Vec<Variable> {
    vec![
        char_var("STUDYID")
            .with_role(VariableRole::Identifier)
            .with_core(CoreDesignation::Required),
        char_var("DOMAIN")
            .with_role(VariableRole::Identifier)
            .with_core(CoreDesignation::Required),
        char_var("USUBJID")
            .with_role(VariableRole::Identifier)
            .with_core(CoreDesignation::Required),
        num_var(&format!("{prefix}SEQ"))
            .with_role(VariableRole::Identifier)
            .with_core(CoreDesignation::Required),
    ]
}

pub fn dm_domain() -> Domain {
    let mut variables = identifiers("DM");
    variables.pop();
    variables.extend([
        char_var("SUBJID").with_role(VariableRole::Topic),
        char_var("RFSTDTC").with_role(VariableRole::Timing),
        char_var("RFENDTC").with_role(VariableRole::Timing),
        char_var("RFXSTDTC").with_role(VariableRole::Timing),
        char_var("RFXENDTC").with_role(VariableRole::Timing),
        char_var("RFICDTC").with_role(VariableRole::Timing),
        char_var("RFPENDTC").with_role(VariableRole::Timing),
        char_var("DTHDTC").with_role(VariableRole::Timing),
        char_var("DTHFL").with_role(VariableRole::Qualifier),
        char_var("BRTHDTC").with_role(VariableRole::Qualifier),
        num_var("AGE").with_role(VariableRole::Qualifier),
        char_var("AGEU").with_role(VariableRole::Qualifier),
        char_var("SEX")
            .with_role(VariableRole::Qualifier)
            .with_codelist("C66731"),
        char_var("RACE").with_role(VariableRole::Qualifier),
        char_var("ETHNIC").with_role(VariableRole::Qualifier),
        char_var("ARMCD").with_role(VariableRole::Qualifier),
        char_var("ARM").with_role(VariableRole::Qualifier),
        char_var("ACTARMCD").with_role(VariableRole::Qualifier),
        char_var("ACTARM").with_role(VariableRole::Qualifier),
        char_var("ARMNRS").with_role(VariableRole::Qualifier),
        char_var("COUNTRY").with_role(VariableRole::Qualifier),
    ]);
    Domain::new("DM", variables).with_class(DatasetClass::SpecialPurpose)
}

pub fn ae_domain() -> Domain {
    let mut variables = identifiers("AE");
    variables.extend([
        char_var("AETERM")
            .with_role(VariableRole::Topic)
            .with_core(CoreDesignation::Required),
        char_var("AEDECOD").with_role(VariableRole::Qualifier),
        char_var("AEOUT")
            .with_role(VariableRole::Qualifier)
            .with_codelist("C66768"),
        char_var("AESEV")
            .with_role(VariableRole::Qualifier)
            .with_codelist("C66769"),
        char_var("AESER").with_role(VariableRole::Qualifier),
        char_var("AESTDTC").with_role(VariableRole::Timing),
        char_var("AEENDTC").with_role(VariableRole::Timing),
        num_var("AESTDY").with_role(VariableRole::Timing),
        num_var("AEENDY").with_role(VariableRole::Timing),
        char_var("AEDUR").with_role(VariableRole::Timing),
    ]);
    Domain::new("AE", variables).with_class(DatasetClass::Events)
}

pub fn lb_domain() -> Domain {
    let mut variables = identifiers("LB");
    variables.extend([
        char_var("LBTESTCD")
            .with_role(VariableRole::Topic)
            .with_core(CoreDesignation::Required)
            .with_codelist("C65047"),
        char_var("LBTEST").with_role(VariableRole::Qualifier),
        char_var("LBORRES").with_role(VariableRole::Result),
        char_var("LBORRESU").with_role(VariableRole::Qualifier),
        char_var("LBSTRESC").with_role(VariableRole::Result),
        num_var("LBSTRESN").with_role(VariableRole::Result),
        char_var("LBSTRESU").with_role(VariableRole::Qualifier),
        char_var("LBLOBXFL").with_role(VariableRole::Qualifier),
        char_var("LBDTC").with_role(VariableRole::Timing),
        num_var("LBDY").with_role(VariableRole::Timing),
    ]);
    Domain::new("LB", variables).with_class(DatasetClass::Findings)
}

pub fn sex_codelist() -> ControlledTerminology {
    let mut ct = ControlledTerminology::new("C66731", "Sex", false);
    for value in ["F", "M", "U"] {
        ct.add_submission_value(value);
    }
    ct.add_synonym("Female", "F");
    ct.add_synonym("Male", "M");
    ct
}

pub fn outcome_codelist() -> ControlledTerminology {
    let mut ct = ControlledTerminology::new("C66768", "Outcome of Event", false);
    for value in [
        "FATAL",
        "NOT RECOVERED/NOT RESOLVED",
        "RECOVERED/RESOLVED",
        "RECOVERED/RESOLVED WITH SEQUELAE",
        "RECOVERING/RESOLVING",
        "UNKNOWN",
    ] {
        ct.add_submission_value(value);
    }
    ct
}

pub fn severity_codelist() -> ControlledTerminology {
    let mut ct = ControlledTerminology::new("C66769", "Severity/Intensity Scale", false);
    for value in ["MILD", "MODERATE", "SEVERE"] {
        ct.add_submission_value(value);
    }
    ct
}

pub fn lab_test_codelist() -> ControlledTerminology {
    let mut ct = ControlledTerminology::new("C65047", "Laboratory Test Code", true);
    for (code, term) in [("ALT", "Alanine Aminotransferase"), ("GLUC", "Glucose")] {
        ct.add_submission_value(code);
        ct.preferred_terms.insert(code.to_string(), term.to_string());
    }
    ct
}

pub fn registry() -> StandardsRegistry {
    StandardsRegistry::new(
        vec![dm_domain(), ae_domain(), lb_domain()],
        CtRegistry::from_codelists([
            sex_codelist(),
            outcome_codelist(),
            severity_codelist(),
            lab_test_codelist(),
        ]),
    )
}

pub fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
    let columns: Vec<Column> = columns
        .iter()
        .map(|(name, values)| Column::new((*name).into(), values.to_vec()))
        .collect();
    DataFrame::new(columns).expect("frame")
}

pub fn strings(df: &DataFrame, name: &str) -> Vec<String> {
    string_column(df, name).expect("string column")
}

pub fn numbers(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    numeric_column_f64(df, name).expect("numeric column")
}
