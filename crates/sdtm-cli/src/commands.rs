use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{error, info, info_span};

use sdtm_cli::logging::redact_value;
use sdtm_cli::pipeline::{derive_study_id, load_study, write_domain_csvs};
use sdtm_cli::summary::domain_table;
use sdtm_core::process_study;
use sdtm_model::{
    CtMatchingMode, Domain, ProcessingOptions, SequenceAssignmentMode, UsubjidPrefixMode,
};
use sdtm_standards::StandardsRegistry;
use sdtm_validate::{RuleEngine, StudyValidationReport, ValidationOptions, validate_outcome};

use crate::cli::StudyArgs;

pub struct StudyRun {
    pub report: StudyValidationReport,
    pub descriptions: BTreeMap<String, String>,
    pub written: Vec<PathBuf>,
}

pub fn run_domains(standards_root: &Path) -> Result<()> {
    let standards = load_standards(standards_root)?;
    let rows: Vec<(String, String)> = standards
        .domains()
        .map(|domain| (domain.code.clone(), describe(domain)))
        .collect();
    println!("{}", domain_table(&rows));
    Ok(())
}

pub fn run_study(args: &StudyArgs, standards_root: &Path) -> Result<StudyRun> {
    if !args.input_dir.is_dir() {
        bail!("input directory not found: {}", args.input_dir.display());
    }
    let standards = load_standards(standards_root)?;
    let study_id = args
        .study_id
        .clone()
        .unwrap_or_else(|| derive_study_id(&args.input_dir));
    let span = info_span!("run_study", study_id = %study_id);
    let _guard = span.enter();

    let domain_codes: Vec<String> = standards.domains().map(|domain| domain.code.clone()).collect();
    let descriptions: BTreeMap<String, String> = standards
        .domains()
        .map(|domain| (domain.code.clone(), describe(domain)))
        .collect();

    let loaded = load_study(&args.input_dir, &domain_codes)?;
    info!(
        domains = loaded.datasets.len(),
        files = loaded.file_count(),
        "study loaded"
    );

    let options = processing_options(args);
    let mut outcome = process_study(&study_id, loaded.datasets, &standards, &standards, &options);
    for failure in &outcome.failures {
        error!(
            domain_code = %failure.domain_code,
            kind = failure.kind.as_str(),
            message = redact_value(&failure.message),
            "domain processing failed"
        );
    }

    let engine = RuleEngine::with_default_rules(ValidationOptions {
        repair_terminology: !args.no_ct_repair,
        ..ValidationOptions::default()
    });
    let report = validate_outcome(&study_id, &mut outcome, &standards, &engine)?;
    info!(
        errors = report.error_count,
        warnings = report.warning_count,
        "validation finished"
    );

    if let Some(path) = &args.report {
        report.write_json_report(path)?;
        info!(path = %path.display(), "report written");
    }
    let written = match &args.output_dir {
        Some(dir) => write_domain_csvs(dir, &outcome.domains)?,
        None => Vec::new(),
    };

    Ok(StudyRun {
        report,
        descriptions,
        written,
    })
}

fn load_standards(root: &Path) -> Result<StandardsRegistry> {
    StandardsRegistry::load(root)
        .with_context(|| format!("load standards from {}", root.display()))
}

fn processing_options(args: &StudyArgs) -> ProcessingOptions {
    let mut options = if args.strict {
        ProcessingOptions::strict()
    } else {
        ProcessingOptions::default()
    };
    if args.lenient_ct {
        options.ct_matching = CtMatchingMode::Lenient;
    }
    if args.no_usubjid_prefix {
        options.usubjid_prefix = UsubjidPrefixMode::Skip;
    }
    if args.no_auto_seq {
        options.sequence_assignment = SequenceAssignmentMode::Skip;
    }
    options.default_country = args.country.clone();
    options
}

fn describe(domain: &Domain) -> String {
    domain
        .description
        .clone()
        .or_else(|| domain.label.clone())
        .unwrap_or_default()
}
