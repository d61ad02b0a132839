//! Per-variant record assembly.
//!
//! [RecordAssembler] ties the pieces together: base fields, formatted consequence
//! fragments grouped into buckets, the most severe consequence, merged co-located
//! variants, and a final numberify pass over the whole record.

use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Map, Value, json};

use crate::config::AssemblerConfig;
use crate::consequence::ConsequenceFormatter;
use crate::consts::{
    ASSEMBLY_NAME_KEY, COLOCATED_KEY, CUSTOM_ANNOTATIONS_KEY, INPUT_KEY, MOST_SEVERE_KEY,
};
use crate::errors::{Result, VarJsonError};
use crate::frequency::{FrequencySource, PopulationFrequencies, merge_colocated};
use crate::models::{AnnotatedVariant, FeatureType, RawFrequencyMap, VariantRecord};
use crate::naming::NamingPolicy;
use crate::numberify::numberify;
use crate::severity::SeverityRanks;

pub struct RecordAssembler<F: FrequencySource = PopulationFrequencies> {
    policy: NamingPolicy,
    ranks: SeverityRanks,
    config: AssemblerConfig,
    frequencies: F,
    formatter: ConsequenceFormatter,
}

impl RecordAssembler<PopulationFrequencies> {
    /// Default naming tables, the Ensembl severity ranking, and frequencies read
    /// from the existing variants as gated by `config.frequencies`.
    pub fn with_defaults(config: AssemblerConfig) -> Result<Self> {
        let frequencies = PopulationFrequencies::new(config.frequencies);
        RecordAssembler::new(
            NamingPolicy::default(),
            SeverityRanks::ensembl_default(),
            config,
            frequencies,
        )
    }
}

impl<F: FrequencySource> RecordAssembler<F> {
    ///
    /// Create an assembler for a batch.
    ///
    /// Fails when the severity table is empty, so a bad setup is caught before the
    /// first variant rather than per record.
    ///
    pub fn new(
        policy: NamingPolicy,
        ranks: SeverityRanks,
        config: AssemblerConfig,
        frequencies: F,
    ) -> Result<Self> {
        if ranks.is_empty() {
            return Err(VarJsonError::EmptySeverityTable);
        }
        Ok(RecordAssembler {
            policy,
            ranks,
            config,
            frequencies,
            formatter: ConsequenceFormatter::new()?,
        })
    }

    pub fn policy(&self) -> &NamingPolicy {
        &self.policy
    }

    pub fn ranks(&self) -> &SeverityRanks {
        &self.ranks
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    ///
    /// Assemble the output record for one variant.
    ///
    /// The custom annotation payload is taken out of `variant`; everything else on
    /// it is only read.
    ///
    pub fn assemble(&self, variant: &mut AnnotatedVariant) -> VariantRecord {
        let custom_annotations = variant.take_custom_annotations();
        let variant = &*variant;

        let mut record = self.base_fields(variant);
        if let Some(custom) = custom_annotations {
            record.insert(CUSTOM_ANNOTATIONS_KEY.to_string(), custom);
        }

        let mut terms = Vec::new();
        let mut buckets: IndexMap<FeatureType, Vec<Value>> = IndexMap::new();
        for fragment in &variant.fragments {
            let formatted = self.formatter.format(fragment.clone(), &self.policy, &mut terms);
            buckets
                .entry(formatted.feature_type)
                .or_default()
                .push(Value::Object(formatted.fields));
        }

        let most_severe = self.ranks.select_most_severe(&terms);
        record.insert(MOST_SEVERE_KEY.to_string(), Value::String(most_severe));

        for (feature_type, fragments) in buckets {
            record.insert(feature_type.consequences_key(), Value::Array(fragments));
        }

        let alt_alleles = variant.alt_alleles();
        let colocated: Vec<Value> = variant
            .existing_variants
            .iter()
            .map(|existing| {
                let per_allele: IndexMap<String, RawFrequencyMap> = alt_alleles
                    .iter()
                    .map(|&allele| {
                        (allele.to_string(), self.frequencies.frequencies(existing, allele))
                    })
                    .collect();
                let merged = merge_colocated(&alt_alleles, existing, &per_allele, &self.policy);
                Value::Object(merged.0)
            })
            .collect();
        if !colocated.is_empty() {
            record.insert(COLOCATED_KEY.to_string(), Value::Array(colocated));
        }

        let mut record = Value::Object(record);
        numberify(&mut record, &self.policy.numberify_exempt);

        debug!(
            "Assembled {}:{}-{} {}",
            variant.chr, variant.start, variant.end, variant.allele_string
        );

        match record {
            Value::Object(map) => VariantRecord(map),
            _ => VariantRecord::default(),
        }
    }

    ///
    /// Lazily assemble a batch, one record per variant, in input order.
    ///
    /// Nothing is processed until the iterator is advanced; dropping it stops the batch.
    ///
    pub fn assemble_batch<I>(&self, variants: I) -> impl Iterator<Item = VariantRecord>
    where
        I: IntoIterator<Item = AnnotatedVariant>,
    {
        info!(
            "Assembling records against {} ranked consequence terms",
            self.ranks.len()
        );
        variants
            .into_iter()
            .map(move |mut variant| self.assemble(&mut variant))
    }

    fn base_fields(&self, variant: &AnnotatedVariant) -> Map<String, Value> {
        let mut base = Map::new();
        if !variant.variation_name.is_empty() {
            base.insert("variation_name".to_string(), json!(variant.variation_name));
        }
        base.insert("chr".to_string(), json!(variant.chr));
        base.insert("start".to_string(), json!(variant.start));
        base.insert("end".to_string(), json!(variant.end));
        base.insert("strand".to_string(), json!(variant.strand));
        base.insert("allele_string".to_string(), json!(variant.allele_string));
        if let Some(assembly) = self.config.resolve_assembly(variant.assembly.as_deref()) {
            base.insert(ASSEMBLY_NAME_KEY.to_string(), json!(assembly));
        }
        if let Some(tokens) = &variant.line {
            base.insert(
                INPUT_KEY.to_string(),
                json!(tokens.join(self.config.input_delimiter())),
            );
        }
        self.policy.rename_keys(&mut base);
        base
    }
}
