//! Co-located variant cleanup and per-population frequency merging.
//!
//! Frequencies for an existing variant are looked up per ALT allele through a
//! [FrequencySource], then folded into a single `frequencies` map keyed by allele
//! and then lowercase population code.

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

use crate::config::FrequencyFlags;
use crate::consts::FREQUENCIES_KEY;
use crate::models::{ColocatedVariant, RawExistingVariant, RawFrequencyMap};
use crate::naming::NamingPolicy;

/// Bookkeeping fields of the cache that never reach the output.
pub const INTERNAL_KEYS: [&str; 2] = ["failed", "matched_alleles"];

/// Projects that publish population allele frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyProject {
    ThousandGenomes,
    Esp,
    Exac,
    Gnomad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population {
    pub code: &'static str,
    pub project: FrequencyProject,
}

const fn population(code: &'static str, project: FrequencyProject) -> Population {
    Population { code, project }
}

pub const POPULATIONS: [Population; 22] = [
    population("AFR", FrequencyProject::ThousandGenomes),
    population("AMR", FrequencyProject::ThousandGenomes),
    population("ASN", FrequencyProject::ThousandGenomes),
    population("EAS", FrequencyProject::ThousandGenomes),
    population("SAS", FrequencyProject::ThousandGenomes),
    population("EUR", FrequencyProject::ThousandGenomes),
    population("AA", FrequencyProject::Esp),
    population("EA", FrequencyProject::Esp),
    population("ExAC", FrequencyProject::Exac),
    population("ExAC_AFR", FrequencyProject::Exac),
    population("ExAC_AMR", FrequencyProject::Exac),
    population("ExAC_EAS", FrequencyProject::Exac),
    population("ExAC_FIN", FrequencyProject::Exac),
    population("ExAC_NFE", FrequencyProject::Exac),
    population("ExAC_SAS", FrequencyProject::Exac),
    population("gnomAD", FrequencyProject::Gnomad),
    population("gnomAD_AFR", FrequencyProject::Gnomad),
    population("gnomAD_AMR", FrequencyProject::Gnomad),
    population("gnomAD_EAS", FrequencyProject::Gnomad),
    population("gnomAD_FIN", FrequencyProject::Gnomad),
    population("gnomAD_NFE", FrequencyProject::Gnomad),
    population("gnomAD_SAS", FrequencyProject::Gnomad),
];

fn frequency_key(code: &str) -> String {
    format!("{}_AF", code)
}

/// Supplies allele frequencies for one allele of an existing variant.
pub trait FrequencySource {
    /// `<POP>_AF` -> list of frequencies, for every population with data for `allele`.
    fn frequencies(&self, existing: &RawExistingVariant, allele: &str) -> RawFrequencyMap;
}

///
/// Reads frequencies stored on the existing variant itself.
///
/// Each population key holds `ALLELE:FREQ` pairs separated by commas, or a bare
/// frequency when the site has one alternate allele. Only projects enabled in
/// [FrequencyFlags] are consulted.
///
#[derive(Debug, Clone, Default)]
pub struct PopulationFrequencies {
    flags: FrequencyFlags,
}

impl PopulationFrequencies {
    pub fn new(flags: FrequencyFlags) -> Self {
        PopulationFrequencies { flags }
    }
}

impl FrequencySource for PopulationFrequencies {
    fn frequencies(&self, existing: &RawExistingVariant, allele: &str) -> RawFrequencyMap {
        let mut found = Map::new();
        for population in POPULATIONS.iter().filter(|p| self.flags.includes(p.project)) {
            let value = match existing.get(population.code) {
                Some(Value::String(raw)) => allele_frequency(raw, allele),
                Some(Value::Number(n)) => Some(Value::Number(n.clone())),
                _ => None,
            };
            if let Some(value) = value {
                found.insert(frequency_key(population.code), Value::Array(vec![value]));
            }
        }
        found
    }
}

fn allele_frequency(raw: &str, allele: &str) -> Option<Value> {
    if !raw.contains(':') {
        let raw = raw.trim();
        return (!raw.is_empty()).then(|| Value::String(raw.to_string()));
    }
    raw.split(',')
        .filter_map(|pair| pair.split_once(':'))
        .find(|(a, _)| a.trim() == allele)
        .map(|(_, freq)| Value::String(freq.trim().to_string()))
}

///
/// Build the output form of one co-located variant.
///
/// The source record is never modified: a copy has its internal keys removed,
/// gains a `frequencies` map (only when some allele had data), loses empty and
/// zero-valued fields, is renamed, and has its list and synonym fields parsed.
///
/// # Arguments
/// * `alt_alleles` - ALT alleles of the variant being assembled, in order
/// * `existing` - the cached existing variant
/// * `per_allele` - frequency lookups, one per ALT allele
/// * `policy` - shared naming tables
///
pub fn merge_colocated(
    alt_alleles: &[&str],
    existing: &RawExistingVariant,
    per_allele: &IndexMap<String, RawFrequencyMap>,
    policy: &NamingPolicy,
) -> ColocatedVariant {
    let mut copy = existing.clone();
    for key in INTERNAL_KEYS {
        copy.shift_remove(key);
    }

    let mut frequencies = Map::new();
    for &allele in alt_alleles {
        let Some(lookup) = per_allele.get(allele) else {
            continue;
        };
        for population in POPULATIONS.iter() {
            let Some(value) = lookup.get(&frequency_key(population.code)).and_then(first_value) else {
                continue;
            };
            if let Value::Object(by_population) = frequencies
                .entry(allele.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
            {
                by_population.insert(population.code.to_lowercase(), value);
            }
        }
    }
    for population in POPULATIONS.iter() {
        copy.shift_remove(population.code);
        copy.shift_remove(&frequency_key(population.code));
    }
    if !frequencies.is_empty() {
        copy.insert(FREQUENCIES_KEY.to_string(), Value::Object(frequencies));
    }

    copy.retain(|key, value| {
        let keep = !is_blank(value) && !(is_zero(value) && !policy.is_zero_meaningful(key));
        if !keep {
            debug!("Stripping empty co-located field {:?}", key);
        }
        keep
    });

    policy.rename_keys(&mut copy);

    for field in &policy.list_fields {
        if let Some(Value::String(joined)) = copy.get(field) {
            let items = split_list(joined);
            copy.insert(field.clone(), items);
        }
    }

    if let Some(Value::String(raw)) = copy.get(&policy.synonym_field) {
        let synonyms = parse_synonyms(raw);
        copy.insert(policy.synonym_field.clone(), Value::Object(synonyms));
    }

    ColocatedVariant(copy)
}

fn first_value(value: &Value) -> Option<Value> {
    match value {
        Value::Array(items) => items.iter().find(|v| !v.is_null()).cloned(),
        Value::Null => None,
        other => Some(other.clone()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s == "0",
        _ => false,
    }
}

fn split_list(joined: &str) -> Value {
    Value::Array(
        joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
    )
}

///
/// Parse `source::syn1,syn2--source2::syn3` into `{source: [syn1, syn2], source2: [syn3]}`.
///
/// Entries without a `::` separator are skipped. A source seen twice accumulates
/// the synonyms of both entries.
///
pub fn parse_synonyms(raw: &str) -> Map<String, Value> {
    let mut synonyms: IndexMap<String, Vec<Value>> = IndexMap::new();
    for entry in raw.split("--") {
        let Some((source, list)) = entry.split_once("::") else {
            if !entry.is_empty() {
                debug!("Dropping synonym entry without a source: {:?}", entry);
            }
            continue;
        };
        if let Value::Array(items) = split_list(list) {
            synonyms.entry(source.to_string()).or_default().extend(items);
        }
    }
    synonyms
        .into_iter()
        .map(|(source, items)| (source, Value::Array(items)))
        .collect()
}
