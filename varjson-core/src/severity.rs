//! Consequence severity ranking.
//!
//! The rank table is read-only input: lower rank means more severe, and where two
//! terms share a rank the one inserted first wins.

use std::fs::read_to_string;
use std::path::Path;

use indexmap::IndexMap;

use crate::consts::UNKNOWN_CONSEQUENCE;
use crate::errors::{Result, VarJsonError};

// Sequence Ontology consequence terms, most to least severe.
const ENSEMBL_RANKS: [(&str, u32); 41] = [
    ("transcript_ablation", 1),
    ("splice_acceptor_variant", 3),
    ("splice_donor_variant", 3),
    ("stop_gained", 4),
    ("frameshift_variant", 5),
    ("stop_lost", 6),
    ("start_lost", 7),
    ("transcript_amplification", 8),
    ("feature_elongation", 9),
    ("feature_truncation", 9),
    ("inframe_insertion", 10),
    ("inframe_deletion", 11),
    ("missense_variant", 12),
    ("protein_altering_variant", 12),
    ("splice_donor_5th_base_variant", 13),
    ("splice_region_variant", 13),
    ("splice_donor_region_variant", 13),
    ("splice_polypyrimidine_tract_variant", 13),
    ("incomplete_terminal_codon_variant", 14),
    ("start_retained_variant", 15),
    ("stop_retained_variant", 15),
    ("synonymous_variant", 15),
    ("coding_sequence_variant", 16),
    ("mature_miRNA_variant", 17),
    ("5_prime_UTR_variant", 18),
    ("3_prime_UTR_variant", 19),
    ("non_coding_transcript_exon_variant", 20),
    ("intron_variant", 21),
    ("NMD_transcript_variant", 22),
    ("non_coding_transcript_variant", 23),
    ("coding_transcript_variant", 23),
    ("upstream_gene_variant", 24),
    ("downstream_gene_variant", 25),
    ("TFBS_ablation", 26),
    ("TFBS_amplification", 28),
    ("TF_binding_site_variant", 30),
    ("regulatory_region_ablation", 31),
    ("regulatory_region_amplification", 33),
    ("regulatory_region_variant", 36),
    ("sequence_variant", 37),
    ("intergenic_variant", 38),
];

/// Consequence term -> rank, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeverityRanks {
    ranks: IndexMap<String, u32>,
}

impl From<IndexMap<String, u32>> for SeverityRanks {
    fn from(ranks: IndexMap<String, u32>) -> Self {
        SeverityRanks { ranks }
    }
}

impl<'a> FromIterator<(&'a str, u32)> for SeverityRanks {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        SeverityRanks {
            ranks: iter.into_iter().map(|(t, r)| (t.to_string(), r)).collect(),
        }
    }
}

impl SeverityRanks {
    /// The Ensembl/Sequence Ontology consequence ranking.
    pub fn ensembl_default() -> Self {
        ENSEMBL_RANKS.iter().copied().collect()
    }

    ///
    /// Load a rank table from a file.
    ///
    /// Files ending in `.json` must hold a single `{"term": rank}` object; anything
    /// else is read as `term<TAB>rank` lines, with `#` comments and blank lines ignored.
    ///
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json(&content)
        } else {
            Self::from_tsv(&content)
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let ranks: IndexMap<String, u32> = serde_json::from_str(content)?;
        Ok(SeverityRanks { ranks })
    }

    pub fn from_tsv(content: &str) -> Result<Self> {
        let mut ranks = IndexMap::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let parsed = match (parts.next(), parts.next(), parts.next()) {
                (Some(term), Some(rank), None) => rank.parse::<u32>().ok().map(|r| (term, r)),
                _ => None,
            };
            let (term, rank) = parsed.ok_or_else(|| VarJsonError::SeverityTableLine {
                line: index + 1,
                content: line.to_string(),
            })?;
            ranks.insert(term.to_string(), rank);
        }
        Ok(SeverityRanks { ranks })
    }

    pub fn rank(&self, term: &str) -> Option<u32> {
        self.ranks.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ranks.iter().map(|(t, r)| (t.as_str(), *r))
    }

    ///
    /// Pick the most severe of `terms`.
    ///
    /// The `?` placeholder and terms missing from the table are ignored. Returns `?`
    /// when nothing is left.
    ///
    pub fn select_most_severe<S: AsRef<str>>(&self, terms: &[S]) -> String {
        let mut best: Option<(u32, usize, &str)> = None;
        for term in terms.iter().map(AsRef::as_ref) {
            if term == UNKNOWN_CONSEQUENCE {
                continue;
            }
            let Some((position, _, rank)) = self.ranks.get_full(term) else {
                continue;
            };
            let candidate = (*rank, position, term);
            if best.is_none_or(|b| (candidate.0, candidate.1) < (b.0, b.1)) {
                best = Some(candidate);
            }
        }
        best.map(|(_, _, term)| term.to_string())
            .unwrap_or_else(|| UNKNOWN_CONSEQUENCE.to_string())
    }
}
