//! Reshape one raw consequence fragment into its output form.

use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::consts::{
    ALLELE_KEY, CONSEQUENCE_KEY, DOMAINS_KEY, FEATURE_KEY, FEATURE_TYPE_KEY, FLAG_YES, PLACEHOLDER,
};
use crate::errors::Result;
use crate::models::{ConsequenceFragment, FeatureType, FragmentField, RawFragment};
use crate::naming::NamingPolicy;
use crate::numberify::parse_number;

const PREDICTION_PATTERN: &str = r"([a-z_]+)?\(?([\d.]+)?\)?";

pub struct ConsequenceFormatter {
    prediction: Regex,
}

impl ConsequenceFormatter {
    pub fn new() -> Result<Self> {
        Ok(ConsequenceFormatter {
            prediction: Regex::new(PREDICTION_PATTERN)?,
        })
    }

    ///
    /// Format a single fragment.
    ///
    /// Unparseable sub-fields are dropped one by one; the rest of the fragment is
    /// kept. Every consequence term seen is pushed onto `terms` so the caller can
    /// rank them once all fragments of a variant are done.
    ///
    /// # Arguments
    /// * `raw` - the fragment as produced by the annotation engine
    /// * `policy` - shared naming tables
    /// * `terms` - running collection of consequence terms for the variant
    ///
    pub fn format(
        &self,
        raw: RawFragment,
        policy: &NamingPolicy,
        terms: &mut Vec<String>,
    ) -> ConsequenceFragment {
        let mut fields = Map::with_capacity(raw.len());

        for (key, value) in raw {
            if value.is_null() || policy.is_skipped(&key) {
                continue;
            }
            if value.as_str() == Some(PLACEHOLDER) && !key.eq_ignore_ascii_case(ALLELE_KEY) {
                continue;
            }
            let value = if value.as_str() == Some(FLAG_YES) {
                json!(1)
            } else {
                value
            };

            match FragmentField::classify(&key, value) {
                FragmentField::Position { kind, raw } => {
                    let (start, end) = parse_position_range(&raw);
                    match start {
                        Some(start) => {
                            fields.insert(format!("{}_start", kind), json!(start));
                        }
                        None => debug!("Dropping non-numeric {}_start from {:?}", kind, raw),
                    }
                    match end {
                        Some(end) => {
                            fields.insert(format!("{}_end", kind), json!(end));
                        }
                        None => debug!("Dropping non-numeric {}_end from {:?}", kind, raw),
                    }
                }
                FragmentField::Prediction { tool, raw } => {
                    let (prediction, score) = self.parse_prediction(&raw);
                    if prediction.is_none() && score.is_none() {
                        debug!("Dropping unparseable {} value {:?}", tool, raw);
                    }
                    if let Some(prediction) = prediction {
                        fields.insert(format!("{}_prediction", tool), Value::String(prediction));
                    }
                    if let Some(score) = score {
                        fields.insert(format!("{}_score", tool), score);
                    }
                }
                FragmentField::Domains(entries) => {
                    let domains = parse_domains(&entries);
                    if !domains.is_empty() {
                        fields.insert(DOMAINS_KEY.to_string(), Value::Array(domains));
                    }
                }
                FragmentField::Plain { key, value } => {
                    fields.insert(key, value);
                }
                FragmentField::Unusable { key } => {
                    debug!("Dropping {} with an unusable value", key);
                }
            }
        }

        let feature_type = match fields.shift_remove(FEATURE_TYPE_KEY) {
            Some(Value::String(raw)) => raw.parse::<FeatureType>().unwrap_or_default(),
            _ => FeatureType::Intergenic,
        };
        if let FeatureType::Other(bucket) = &feature_type {
            warn!("Unrecognised feature type, using bucket {:?}", bucket);
        }

        if let Some(consequence) = fields.get_mut(CONSEQUENCE_KEY) {
            collect_terms(consequence, terms);
        }

        let mut formatted = Map::with_capacity(fields.len());
        for (key, value) in fields {
            let key = if key == FEATURE_KEY {
                feature_type.id_key()
            } else {
                policy.output_key(&key).to_string()
            };
            formatted.insert(key, value);
        }

        ConsequenceFragment {
            feature_type,
            fields: formatted,
        }
    }

    /// Split `prediction(score)`, `prediction` or `(score)` into its parts.
    pub fn parse_prediction(&self, raw: &str) -> (Option<String>, Option<Value>) {
        let Some(caps) = self.prediction.captures(raw) else {
            return (None, None);
        };
        let prediction = caps.get(1).map(|m| m.as_str().to_string());
        let score = caps.get(2).map(|m| {
            let score = m.as_str();
            parse_number(score)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(score.to_string()))
        });
        (prediction, score)
    }
}

///
/// Split a `start` or `start-end` coordinate range.
///
/// A missing end means a single position, so it takes the start value. A
/// non-numeric end (e.g. `?`) is dropped rather than replaced.
///
pub fn parse_position_range(raw: &str) -> (Option<u64>, Option<u64>) {
    let mut parts = raw.splitn(2, '-');
    let start = parts.next().and_then(|s| s.trim().parse::<u64>().ok());
    let end = match parts.next().map(str::trim).filter(|e| !e.is_empty()) {
        Some(end) => end.parse::<u64>().ok(),
        None => start,
    };
    (start, end)
}

/// Turn `db:name` entries into `{db, name}` objects, skipping incomplete ones.
pub fn parse_domains<S: AsRef<str>>(entries: &[S]) -> Vec<Value> {
    entries
        .iter()
        .filter_map(|entry| {
            let (db, name) = entry.as_ref().split_once(':')?;
            if db.is_empty() || name.is_empty() {
                debug!("Dropping incomplete domain entry {:?}", entry.as_ref());
                return None;
            }
            Some(json!({"db": db, "name": name}))
        })
        .collect()
}

// Normalises a `&`/`,` joined string into a list as a side effect.
fn collect_terms(consequence: &mut Value, terms: &mut Vec<String>) {
    if let Value::String(joined) = consequence {
        let split: Vec<Value> = joined
            .split(['&', ','])
            .filter(|t| !t.is_empty())
            .map(|t| Value::String(t.to_string()))
            .collect();
        *consequence = Value::Array(split);
    }
    if let Value::Array(items) = consequence {
        terms.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
    }
}
