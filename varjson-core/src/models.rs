//! Input and output data models.
//!
//! [AnnotatedVariant] is what the annotation engine hands over; [VariantRecord]
//! is the consolidated output, ready for line-oriented JSON serialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{
    COLOCATED_KEY, CONSEQUENCES_SUFFIX, DOMAINS_KEY, FREQUENCIES_KEY, ID_KEY, MOST_SEVERE_KEY,
    PREDICTION_TOOLS,
};

/// One allele x one overlapping feature, as produced by the annotation engine.
pub type RawFragment = Map<String, Value>;

/// A previously known variant at the same locus, as stored in the cache.
pub type RawExistingVariant = Map<String, Value>;

/// `<POP>_AF` -> list of frequency values for one allele.
pub type RawFrequencyMap = Map<String, Value>;

fn default_strand() -> i8 {
    1
}

/// An already-positioned, already-annotated variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedVariant {
    #[serde(default)]
    pub variation_name: String,
    pub chr: String,
    pub start: u64,
    pub end: u64,
    #[serde(default = "default_strand")]
    pub strand: i8,
    /// `REF/ALT1/ALT2/...`
    pub allele_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,
    /// Tokens of the raw input line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_annotations: Option<Value>,
    #[serde(default)]
    pub fragments: Vec<RawFragment>,
    #[serde(default)]
    pub existing_variants: Vec<RawExistingVariant>,
}

impl AnnotatedVariant {
    /// Every allele of the allele string except the reference (first) one.
    pub fn alt_alleles(&self) -> Vec<&str> {
        self.allele_string.split('/').skip(1).collect()
    }

    ///
    /// Detach the custom annotation payload from this variant.
    ///
    /// Ownership moves to the caller and `None` is left behind, so the payload
    /// can only be taken once.
    ///
    pub fn take_custom_annotations(&mut self) -> Option<Value> {
        self.custom_annotations.take()
    }
}

/// The kind of genomic feature a fragment was computed against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Transcript,
    RegulatoryFeature,
    MotifFeature,
    #[default]
    Intergenic,
    /// A feature type this crate has no dedicated variant for; holds its bucket name.
    Other(String),
}

impl FeatureType {
    /// Grouping name, e.g. `regulatory_feature`.
    pub fn bucket(&self) -> &str {
        match self {
            FeatureType::Transcript => "transcript",
            FeatureType::RegulatoryFeature => "regulatory_feature",
            FeatureType::MotifFeature => "motif_feature",
            FeatureType::Intergenic => "intergenic",
            FeatureType::Other(bucket) => bucket,
        }
    }

    /// Output key for the list of fragments, e.g. `transcript_consequences`.
    pub fn consequences_key(&self) -> String {
        format!("{}{}", self.bucket(), CONSEQUENCES_SUFFIX)
    }

    /// Output key the generic `feature` id is renamed to, e.g. `transcript_id`.
    pub fn id_key(&self) -> String {
        format!("{}_id", self.bucket())
    }
}

impl FromStr for FeatureType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let feature_type = match lower.replace('_', "").as_str() {
            "transcript" => FeatureType::Transcript,
            "regulatoryfeature" => FeatureType::RegulatoryFeature,
            "motiffeature" => FeatureType::MotifFeature,
            "intergenic" | "" => FeatureType::Intergenic,
            _ => {
                let bucket = match lower.strip_suffix("feature") {
                    Some(stem) if !stem.is_empty() && !stem.ends_with('_') => {
                        format!("{}_feature", stem)
                    }
                    _ => lower,
                };
                FeatureType::Other(bucket)
            }
        };
        Ok(feature_type)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bucket())
    }
}

/// A raw fragment field, classified once from its key.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentField {
    /// `<kind>_position` holding `start` or `start-end`.
    Position { kind: String, raw: String },
    /// `sift` / `polyphen` holding `prediction(score)`.
    Prediction { tool: String, raw: String },
    /// `domains` holding `db:name` entries.
    Domains(Vec<String>),
    /// Anything else, with its key already lowercased.
    Plain { key: String, value: Value },
    /// A known key whose value has no usable shape, e.g. a list under `sift`.
    Unusable { key: String },
}

impl FragmentField {
    pub fn classify(key: &str, value: Value) -> FragmentField {
        let lower = key.to_lowercase();

        if let Some(kind) = lower.strip_suffix("_position") {
            if !kind.is_empty() && kind.chars().all(|c| c.is_alphanumeric() || c == '_') {
                if let Some(raw) = scalar_to_string(&value) {
                    return FragmentField::Position {
                        kind: kind.to_string(),
                        raw,
                    };
                }
            }
        }

        if PREDICTION_TOOLS.contains(&lower.as_str()) {
            return match scalar_to_string(&value) {
                // a bare number is a score without a prediction
                Some(raw) => FragmentField::Prediction { tool: lower, raw },
                None => FragmentField::Unusable { key: lower },
            };
        }

        if lower == DOMAINS_KEY {
            let entries = match &value {
                Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
                Value::String(s) => s
                    .split(['&', ','])
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            return FragmentField::Domains(entries);
        }

        FragmentField::Plain { key: lower, value }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A formatted fragment, tagged with the bucket it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsequenceFragment {
    pub feature_type: FeatureType,
    pub fields: Map<String, Value>,
}

/// A previously known variant after frequency merging and cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColocatedVariant(pub Map<String, Value>);

impl ColocatedVariant {
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_KEY).and_then(Value::as_str)
    }

    pub fn frequencies(&self) -> Option<&Map<String, Value>> {
        self.0.get(FREQUENCIES_KEY).and_then(Value::as_object)
    }

    /// Frequency of `allele` in population `population` (lowercase code).
    pub fn frequency(&self, allele: &str, population: &str) -> Option<&Value> {
        self.frequencies()?.get(allele)?.get(population)
    }
}

/// One consolidated output record per input variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantRecord(pub Map<String, Value>);

impl VariantRecord {
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_KEY).and_then(Value::as_str)
    }

    pub fn most_severe_consequence(&self) -> Option<&str> {
        self.0.get(MOST_SEVERE_KEY).and_then(Value::as_str)
    }

    /// The fragments collected under `feature_type`, if there were any.
    pub fn consequences(&self, feature_type: &FeatureType) -> Option<&Vec<Value>> {
        self.0
            .get(&feature_type.consequences_key())
            .and_then(Value::as_array)
    }

    pub fn colocated_variants(&self) -> Option<&Vec<Value>> {
        self.0.get(COLOCATED_KEY).and_then(Value::as_array)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Serialize as a single line of JSON.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}
