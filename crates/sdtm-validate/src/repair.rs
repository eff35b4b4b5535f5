//! Rewrites values of non-extensible codelists that cannot be submitted.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::info;

use sdtm_core::ProcessedDomain;
use sdtm_core::frame::{map_string_column, present_col, string_column};
use sdtm_model::{
    ControlledTerminology, CtResolver, Domain, IssueCategory, Severity, ValidationIssue,
    VariableType,
};

pub const REPAIRED_ID: &str = "TERMINOLOGY.REPAIRED";

/// Replace every invalid value of a non-extensible codelist.
///
/// The replacement is the synonym target when one exists, else the single
/// best suggestion, else the lexicographically smallest submission value.
/// One Info issue is returned per rewritten value.
pub fn repair_terminology(
    domain: &Domain,
    df: &mut DataFrame,
    ct: &dyn CtResolver,
) -> Result<Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    for variable in domain
        .codelist_variables()
        .filter(|var| var.data_type == VariableType::Char)
    {
        let Some(column) = present_col(domain, df, &variable.name) else {
            continue;
        };
        let Some(codelist) = ct.resolve(variable.codelist_code.as_deref(), &variable.name) else {
            continue;
        };
        if codelist.extensible {
            continue;
        }
        let values = string_column(df, column)?;
        let invalid = codelist.invalid_values(values.iter().map(String::as_str));
        if invalid.is_empty() {
            continue;
        }

        let replacements: BTreeMap<String, String> = invalid
            .into_iter()
            .filter_map(|raw| replacement_for(codelist, &raw).map(|target| (raw, target)))
            .collect();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in &values {
            if let Some((raw, _)) = replacements.get_key_value(value) {
                *counts.entry(raw.as_str()).or_default() += 1;
            }
        }
        map_string_column(df, column, |value| {
            replacements
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_string())
        })?;

        for (raw, count) in counts {
            let replacement = &replacements[raw];
            info!(
                domain_code = %domain.code,
                variable = %variable.name,
                codelist = %codelist.codelist_code,
                count,
                "replaced value outside non-extensible codelist"
            );
            issues.push(
                ValidationIssue::new(
                    REPAIRED_ID,
                    Severity::Info,
                    IssueCategory::Terminology,
                    format!(
                        "{} value '{raw}' replaced with '{replacement}' in {count} record(s)",
                        variable.name
                    ),
                )
                .in_domain(&domain.code)
                .on_variable(column)
                .with_detail("original", raw)
                .with_detail("replacement", replacement.as_str())
                .with_detail("count", count)
                .with_detail("codelist", codelist.codelist_code.as_str()),
            );
        }
    }
    Ok(issues)
}

fn replacement_for(codelist: &ControlledTerminology, raw: &str) -> Option<String> {
    if let Some(target) = codelist.synonyms.get(&raw.trim().to_uppercase())
        && codelist.is_valid(target)
    {
        return Some(target.clone());
    }
    if let Some(best) = codelist.suggest_submission_values(raw, 1).into_iter().next() {
        return Some(best);
    }
    codelist.smallest_submission_value().map(str::to_string)
}

/// Repair every domain of a study in parallel.
pub fn repair_study_terminology(
    domains: &mut BTreeMap<String, ProcessedDomain>,
    ct: &dyn CtResolver,
) -> Result<BTreeMap<String, Vec<ValidationIssue>>> {
    domains
        .par_iter_mut()
        .map(|(code, processed)| {
            let issues = repair_terminology(&processed.domain, &mut processed.data, ct)?;
            Ok((code.clone(), issues))
        })
        .collect()
}
