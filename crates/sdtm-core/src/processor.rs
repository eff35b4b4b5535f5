//! The shared pipeline wrapped around every domain processor.

use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::{debug, info_span, warn};

use sdtm_model::{Domain, SequenceAssignmentMode, VariableRole, VariableType};

use crate::domain_processors::{ProcessorRegistry, default_registry};
use crate::frame::{has_column, present_col, set_string_column, string_column_or_blank};
use crate::pipeline_context::PipelineContext;
use crate::transforms::{apply_ct, assign_sequence, clean_na_values};

/// Normalize one domain in place with the default registry.
pub fn process_domain(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<()> {
    process_domain_with_registry(default_registry(), domain, df, context)
}

/// Normalize one domain in place.
///
/// Steps, in order: column names aligned with the schema, placeholder rows
/// and USUBJID prefix, the domain's own rules, codelist canonicalization,
/// DOMAIN/STUDYID stamp, `--SEQ` assignment, NA-token cleanup. Running it
/// again on its output is a no-op.
pub fn process_domain_with_registry(
    registry: &ProcessorRegistry,
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<()> {
    let span = info_span!("process_domain", domain_code = %domain.code, rows = df.height());
    let _guard = span.enter();

    align_column_names(domain, df)?;
    let dropped = crate::domain_processors::drop_placeholder_rows(domain, df, context)?;
    let processor = registry.get(&domain.code);
    debug!(processor = processor.domain_code(), dropped, "running domain rules");
    processor.process(domain, df, context)?;

    apply_codelists(domain, df, context)?;
    stamp_identifiers(domain, df, context)?;
    assign_domain_sequence(domain, df, context)?;
    clean_free_text(domain, df)?;
    debug!(rows = df.height(), "domain normalized");
    Ok(())
}

/// Rename columns that match a schema variable ignoring case to the schema spelling.
fn align_column_names(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for name in names {
        if let Some(canonical) = domain.column_name(&name)
            && canonical != name
            && !has_column(df, canonical)
        {
            df.rename(&name, canonical.into())?;
        }
    }
    Ok(())
}

fn apply_codelists(domain: &Domain, df: &mut DataFrame, context: &PipelineContext) -> Result<()> {
    for variable in domain.codelist_variables() {
        if variable.data_type != VariableType::Char || !has_column(df, &variable.name) {
            continue;
        }
        let Some(ct) = context.resolve_ct(domain, &variable.name) else {
            continue;
        };
        let rewritten = apply_ct(df, &variable.name, ct, context.options.ct_matching)?;
        if rewritten > 0 && context.options.warn_on_rewrite {
            warn!(
                domain_code = %domain.code,
                variable = %variable.name,
                codelist = %ct.codelist_code,
                rewritten,
                "values canonicalized to submission values"
            );
        }
    }
    Ok(())
}

/// DOMAIN always carries the domain code; a blank STUDYID takes the study id.
fn stamp_identifiers(domain: &Domain, df: &mut DataFrame, context: &PipelineContext) -> Result<()> {
    if let Some(column) = domain.column_name("DOMAIN") {
        set_string_column(df, column, vec![domain.code.clone(); df.height()])?;
    }
    let study_id = context.study_id.trim();
    if let Some(column) = present_col(domain, df, "STUDYID")
        && !study_id.is_empty()
    {
        let values = string_column_or_blank(df, Some(column))?
            .into_iter()
            .map(|value| {
                if value.is_empty() {
                    study_id.to_string()
                } else {
                    value
                }
            })
            .collect();
        set_string_column(df, column, values)?;
    }
    Ok(())
}

fn assign_domain_sequence(
    domain: &Domain,
    df: &mut DataFrame,
    context: &PipelineContext,
) -> Result<()> {
    if context.options.sequence_assignment == SequenceAssignmentMode::Skip {
        return Ok(());
    }
    let (Some(seq), Some(usubjid)) = (domain.infer_seq_column(), present_col(domain, df, "USUBJID"))
    else {
        return Ok(());
    };
    let had_values = has_column(df, seq);
    assign_sequence(df, seq, Some(usubjid))?;
    if had_values && context.options.warn_on_rewrite {
        warn!(domain_code = %domain.code, sequence = %seq, "sequence values recalculated");
    }
    Ok(())
}

/// Blank NA tokens in character variables that are neither identifiers
/// nor codelist-bound.
fn clean_free_text(domain: &Domain, df: &mut DataFrame) -> Result<()> {
    for variable in &domain.variables {
        let skip = variable.data_type != VariableType::Char
            || variable.codelist_code.is_some()
            || variable.role == Some(VariableRole::Identifier)
            || !has_column(df, &variable.name);
        if skip {
            continue;
        }
        clean_na_values(df, &variable.name)?;
    }
    Ok(())
}
