use std::collections::BTreeMap;
use std::path::Path;

use sdtm_model::{CoreDesignation, Domain, Variable, VariableRole, VariableType};

use crate::csv_utils::{Row, get_field, get_optional, read_csv_rows};
use crate::error::StandardsError;

const DATASET_KEY: &str = "Dataset Name";

struct DatasetMetadata {
    class_name: Option<String>,
    label: Option<String>,
    structure: Option<String>,
}

/// Load domain schemas from `Datasets.csv` and `Variables.csv` in `dir`.
///
/// Variables keep the order of `Variable Order` when present, file order otherwise.
pub fn load_domains(dir: &Path) -> Result<Vec<Domain>, StandardsError> {
    let datasets = read_csv_rows(&dir.join("Datasets.csv"))?;
    let variables = read_csv_rows(&dir.join("Variables.csv"))?;
    let domains = build_domains(&datasets, &variables);
    tracing::debug!(dir = %dir.display(), domains = domains.len(), "loaded domain schemas");
    Ok(domains)
}

fn parse_variable_type(raw: &str) -> VariableType {
    match raw.trim().to_lowercase().as_str() {
        "num" | "numeric" | "integer" | "float" => VariableType::Num,
        _ => VariableType::Char,
    }
}

fn build_variable(row: &Row) -> Variable {
    Variable {
        name: get_field(row, "Variable Name").to_uppercase(),
        label: get_optional(row, "Variable Label"),
        data_type: parse_variable_type(get_field(row, "Type")),
        role: get_field(row, "Role").parse::<VariableRole>().ok(),
        core: get_field(row, "Core").parse::<CoreDesignation>().ok(),
        codelist_code: get_optional(row, "CDISC CT Codelist Code(s)"),
        order: get_field(row, "Variable Order").parse::<u32>().ok(),
    }
}

fn build_domains(datasets: &[Row], variables: &[Row]) -> Vec<Domain> {
    let mut meta = BTreeMap::new();
    for row in datasets {
        let name = get_field(row, DATASET_KEY).to_uppercase();
        if name.is_empty() {
            continue;
        }
        meta.insert(
            name,
            DatasetMetadata {
                class_name: get_optional(row, "Class"),
                label: get_optional(row, "Dataset Label"),
                structure: get_optional(row, "Structure"),
            },
        );
    }

    let mut grouped: BTreeMap<String, Vec<Variable>> = BTreeMap::new();
    for row in variables {
        let dataset = get_field(row, DATASET_KEY).to_uppercase();
        if dataset.is_empty() || get_field(row, "Variable Name").is_empty() {
            continue;
        }
        grouped.entry(dataset).or_default().push(build_variable(row));
    }

    grouped
        .into_iter()
        .map(|(code, mut vars)| {
            vars.sort_by_key(|variable| variable.order.unwrap_or(u32::MAX));
            let metadata = meta.get(&code);
            let class_name = metadata.and_then(|m| m.class_name.clone());
            Domain {
                dataset_class: class_name.as_deref().and_then(|c| c.parse().ok()),
                class_name,
                description: metadata.and_then(|m| m.label.clone()),
                label: metadata.and_then(|m| m.label.clone()),
                structure: metadata.and_then(|m| m.structure.clone()),
                code,
                variables: vars,
            }
        })
        .collect()
}
