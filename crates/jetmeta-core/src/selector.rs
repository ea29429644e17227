//! Training-variable selection.
//!
//! Field names from the discovered schema are matched against ordered
//! groups of anchored regex patterns. The first matching group wins, and
//! within it the first matching pattern; a field is never assigned twice.
//! Blacklisted fields and label fields are removed even when matched.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::info;

use jetmeta_model::VarGroup;

use crate::error::{MetaError, Result};

/// The selector's output: the ordered variable list and the declared size
/// of each selected variable (from its group).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedVars {
    pub names: Vec<String>,
    pub sizes: BTreeMap<String, Option<usize>>,
}

struct CompiledGroup<'a> {
    group: &'a VarGroup,
    patterns: Vec<Regex>,
    matched: usize,
}

fn compile_groups(groups: &[VarGroup]) -> Result<Vec<CompiledGroup<'_>>> {
    groups
        .iter()
        .map(|group| {
            let patterns = group
                .patterns
                .iter()
                .map(|pattern| {
                    // Patterns match at the start of the field name, like the
                    // conversion rules they were ported from.
                    Regex::new(&format!("^(?:{pattern})")).map_err(|source| MetaError::Pattern {
                        group: group.name.clone(),
                        pattern: pattern.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CompiledGroup {
                group,
                patterns,
                matched: 0,
            })
        })
        .collect()
}

/// Selects training variables from the discovered field names.
///
/// Fields matching no group are silently excluded. A group matching no
/// field at all, or a label absent from the schema, is a configuration
/// error: the rules no longer describe the data.
pub fn select_variables(
    all_fields: &[String],
    groups: &[VarGroup],
    blacklist: &[String],
    labels: &[String],
) -> Result<SelectedVars> {
    for label in labels {
        if !all_fields.contains(label) {
            return Err(MetaError::Configuration(format!(
                "label field '{label}' not present in the discovered schema"
            )));
        }
    }

    let mut compiled = compile_groups(groups)?;
    let mut selected = SelectedVars::default();

    for field in all_fields {
        for group in &mut compiled {
            if group.patterns.iter().any(|re| re.is_match(field)) {
                group.matched += 1;
                selected.names.push(field.clone());
                selected.sizes.insert(field.clone(), group.group.size);
                break;
            }
        }
    }

    for group in &compiled {
        if group.matched == 0 {
            return Err(MetaError::Configuration(format!(
                "variable group '{}' matched no field in the discovered schema",
                group.group.name
            )));
        }
    }

    selected.names.retain(|field| {
        let keep = !blacklist.contains(field) && !labels.contains(field);
        if !keep {
            selected.sizes.remove(field);
        }
        keep
    });

    info!(count = selected.names.len(), "selected training variables");
    Ok(selected)
}
