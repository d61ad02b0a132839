//! Static key tables shared by every reshaping step.
//!
//! A [NamingPolicy] is built once, before a batch starts, and handed to each
//! component by reference. Nothing in here changes while records are assembled.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

const RENAMES: [(&str, &str); 12] = [
    ("consequence", "consequence_terms"),
    ("gene", "gene_id"),
    ("allele", "variant_allele"),
    ("symbol", "gene_symbol"),
    ("symbol_source", "gene_symbol_source"),
    ("overlapbp", "bp_overlap"),
    ("overlappc", "percentage_overlap"),
    ("refseq", "refseq_transcript_ids"),
    ("ensp", "protein_id"),
    ("chr", "seq_region_name"),
    ("variation_name", "id"),
    ("sv", "colocated_structural_variants"),
];

const SKIPPED: [&str; 2] = ["uploaded_variation", "location"];

const NUMBERIFY_EXEMPT: [&str; 24] = [
    "seq_region_name",
    "id",
    "gene_id",
    "gene_symbol",
    "transcript_id",
    "protein_id",
    "regulatory_feature_id",
    "motif_feature_id",
    "variant_allele",
    "allele_string",
    "minor_allele",
    "input",
    "ccds",
    "exon",
    "intron",
    "hgvsc",
    "hgvsp",
    "swissprot",
    "trembl",
    "uniparc",
    "refseq_transcript_ids",
    "codons",
    "amino_acids",
    "domains",
];

const LIST_FIELDS: [&str; 2] = ["clin_sig", "pubmed"];

const ZERO_MEANINGFUL: [&str; 2] = ["minor_allele_freq", "frequencies"];

const SYNONYM_FIELD: &str = "var_synonyms";

#[derive(Debug, Clone, PartialEq)]
pub struct NamingPolicy {
    /// Raw key -> output key.
    pub renames: HashMap<String, String>,
    /// Fragment keys dropped outright, stored lowercase.
    pub skipped: HashSet<String>,
    /// Keys whose values are never numberified.
    pub numberify_exempt: HashSet<String>,
    /// Comma-separated fields turned into lists on colocated variants.
    pub list_fields: Vec<String>,
    /// Colocated-variant keys where a zero value is kept.
    pub zero_meaningful: HashSet<String>,
    /// Colocated-variant key holding the `source::a,b--source::c` synonym string.
    pub synonym_field: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        NamingPolicy {
            renames: RENAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            skipped: SKIPPED.iter().map(|k| k.to_string()).collect(),
            numberify_exempt: NUMBERIFY_EXEMPT.iter().map(|k| k.to_string()).collect(),
            list_fields: LIST_FIELDS.iter().map(|k| k.to_string()).collect(),
            zero_meaningful: ZERO_MEANINGFUL.iter().map(|k| k.to_string()).collect(),
            synonym_field: SYNONYM_FIELD.to_string(),
        }
    }
}

impl NamingPolicy {
    /// The output name for `key`, or `key` itself when it is not renamed.
    pub fn output_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.renames.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn is_skipped(&self, key: &str) -> bool {
        self.skipped.contains(&key.to_lowercase())
    }

    pub fn is_numberify_exempt(&self, key: &str) -> bool {
        self.numberify_exempt.contains(key)
    }

    pub fn is_zero_meaningful(&self, key: &str) -> bool {
        self.zero_meaningful.contains(key)
    }

    ///
    /// Apply the rename table to the top level of `map`.
    ///
    /// Renamed keys keep their position. If a rename lands on a key that is
    /// already present, the renamed value wins.
    ///
    pub fn rename_keys(&self, map: &mut Map<String, Value>) {
        if !map.keys().any(|k| self.renames.contains_key(k)) {
            return;
        }
        let original = std::mem::take(map);
        for (key, value) in original {
            match self.renames.get(&key) {
                Some(renamed) => {
                    map.insert(renamed.clone(), value);
                }
                None => {
                    if !map.contains_key(&key) {
                        map.insert(key, value);
                    }
                }
            }
        }
    }
}
