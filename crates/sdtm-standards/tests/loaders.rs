use std::fs;
use std::path::Path;

use sdtm_model::{
    CoreDesignation, CtResolver, DatasetClass, SchemaProvider, SdtmError, VariableRole,
    VariableType,
};
use sdtm_standards::{StandardsError, StandardsRegistry, load_ct_catalog, load_domains};

const DATASETS: &str = "\
Dataset Name,Dataset Label,Class,Structure
DM,Demographics,Special-Purpose,One record per subject
AE,Adverse Events,Events,One record per adverse event per subject
";

const VARIABLES: &str = "\
Variable Order,Dataset Name,Variable Name,Variable Label,Type,CDISC CT Codelist Code(s),Role,Core
2,DM,DOMAIN,Domain Abbreviation,Char,C66734,Identifier,Req
1,DM,STUDYID,Study Identifier,Char,,Identifier,Req
3,DM,USUBJID,Unique Subject Identifier,Char,,Identifier,Req
4,DM,SEX,Sex,Char,C66731,Record Qualifier,Req
5,DM,AGE,Age,Num,,Record Qualifier,Exp
1,AE,AESEQ,Sequence Number,Num,,Identifier,Req
";

const CT: &str = "\
Code,Codelist Code,Codelist Extensible (Yes/No),Codelist Name,CDISC Submission Value,CDISC Synonym(s),CDISC Definition,NCI Preferred Term
C66731,,No,Sex,SEX,,Sex of a person,CDISC SDTM Sex of Individual Terminology
C16576,C66731,,Sex,F,Female,A female person,Female
C20197,C66731,,Sex,M,Male,A male person,Male
C71620,,Yes,Unit,UNIT,,Units,CDISC SDTM Unit of Measure Terminology
C67015,C71620,,Unit,mg/dL,Milligram per Deciliter,,Milligram per Deciliter
";

fn write_standards(root: &Path) {
    let sdtmig = root.join("sdtmig");
    let ct = root.join("ct");
    fs::create_dir_all(&sdtmig).expect("create sdtmig");
    fs::create_dir_all(&ct).expect("create ct");
    fs::write(sdtmig.join("Datasets.csv"), DATASETS).expect("write datasets");
    fs::write(sdtmig.join("Variables.csv"), VARIABLES).expect("write variables");
    fs::write(ct.join("SDTM_CT_2024-03-29.csv"), CT).expect("write ct");
}

#[test]
fn domains_are_ordered_and_typed() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_standards(dir.path());

    let domains = load_domains(&dir.path().join("sdtmig")).expect("load domains");
    let dm = domains.iter().find(|d| d.code == "DM").expect("DM");
    let names: Vec<&str> = dm.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["STUDYID", "DOMAIN", "USUBJID", "SEX", "AGE"]);
    assert_eq!(dm.dataset_class, Some(DatasetClass::SpecialPurpose));

    let sex = dm.variable("SEX").expect("SEX");
    assert_eq!(sex.core, Some(CoreDesignation::Required));
    assert_eq!(sex.role, Some(VariableRole::Qualifier));
    assert_eq!(sex.codelist_code.as_deref(), Some("C66731"));
    assert_eq!(dm.variable("AGE").map(|v| v.data_type), Some(VariableType::Num));
}

#[test]
fn ct_catalog_reads_terms_and_synonyms() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_standards(dir.path());

    let catalog = load_ct_catalog(&dir.path().join("ct/SDTM_CT_2024-03-29.csv")).expect("load");
    assert_eq!(catalog.label, "SDTM CT");
    assert_eq!(catalog.version.as_deref(), Some("2024-03-29"));

    let sex = catalog.get("C66731").expect("sex codelist");
    assert!(!sex.extensible);
    assert_eq!(sex.submission_values, vec!["F", "M"]);
    assert_eq!(sex.normalize("female"), "F");
    assert_eq!(sex.nci_code_for("M"), Some("C20197"));
    assert_eq!(sex.preferred_term_for("F"), Some("Female"));

    assert!(catalog.get("C71620").expect("unit codelist").extensible);
}

#[test]
fn registry_serves_schemas_and_codelists() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_standards(dir.path());

    let registry = StandardsRegistry::load(dir.path()).expect("load registry");
    assert_eq!(
        registry.list_domain_codes().into_iter().collect::<Vec<_>>(),
        vec!["AE".to_string(), "DM".to_string()]
    );
    assert!(registry.get_domain_schema("dm").is_ok());
    assert!(matches!(
        registry.get_domain_schema("ZZ"),
        Err(SdtmError::UnknownDomain { code }) if code == "ZZ"
    ));

    let by_code = registry.resolve(Some("C66731"), "SEX").expect("by code");
    assert_eq!(by_code.codelist_name, "Sex");
    let by_short_name = registry.resolve(None, "UNIT").expect("by short name");
    assert_eq!(by_short_name.codelist_code, "C71620");
}

#[test]
fn missing_tables_are_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(matches!(
        load_domains(dir.path()),
        Err(StandardsError::MissingFile { .. })
    ));
}
