//! End-to-end: annotated variants -> consolidated records

use std::path::PathBuf;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{Map, Value, json};

use varjson_core::frequency::merge_colocated;
use varjson_core::models::RawExistingVariant;
use varjson_core::numberify::numberify;
use varjson_core::{
    AnnotatedVariant, AssemblerConfig, FeatureType, FrequencyFlags, FrequencySource, NamingPolicy,
    PopulationFrequencies, RecordAssembler, SeverityRanks,
};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// Frequency source that hands back fixed lookups, keyed by allele.
struct FixedFrequencies(IndexMap<String, Map<String, Value>>);

impl FrequencySource for FixedFrequencies {
    fn frequencies(&self, _existing: &RawExistingVariant, allele: &str) -> Map<String, Value> {
        self.0.get(allele).cloned().unwrap_or_default()
    }
}

#[fixture]
fn missense_variant() -> AnnotatedVariant {
    serde_json::from_value(json!({
        "variation_name": "var_1",
        "chr": "1",
        "start": 230710048,
        "end": 230710048,
        "strand": 1,
        "allele_string": "A/G",
        "fragments": [{
            "Allele": "G",
            "Consequence": ["missense_variant"],
            "Feature_type": "Transcript",
            "Feature": "ENST00000366667",
            "Gene": "ENSG00000135744",
            "SIFT": "tolerated(0.8)",
            "Protein_position": "268",
            "STRAND": "-1"
        }],
        "existing_variants": [{
            "variation_name": "rs699",
            "start": "230710048",
            "end": "230710048",
            "AMR": "G:0.3",
            "failed": 0,
            "matched_alleles": [{"a_allele": "G"}]
        }]
    }))
    .unwrap()
}

#[rstest]
fn test_end_to_end_missense(mut missense_variant: AnnotatedVariant) {
    let config = AssemblerConfig {
        frequencies: FrequencyFlags::all(),
        ..Default::default()
    };
    let assembler = RecordAssembler::with_defaults(config).unwrap();

    let record = assembler.assemble(&mut missense_variant);

    assert_eq!(record.most_severe_consequence(), Some("missense_variant"));

    let transcripts = record.consequences(&FeatureType::Transcript).unwrap();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0]["sift_prediction"], json!("tolerated"));
    assert_eq!(transcripts[0]["sift_score"], json!(0.8));
    assert_eq!(transcripts[0]["transcript_id"], json!("ENST00000366667"));
    assert_eq!(transcripts[0]["gene_id"], json!("ENSG00000135744"));
    assert_eq!(transcripts[0]["protein_start"], json!(268));
    assert_eq!(transcripts[0]["protein_end"], json!(268));
    assert_eq!(transcripts[0]["strand"], json!(-1));

    let colocated = record.colocated_variants().unwrap();
    assert_eq!(colocated.len(), 1);
    assert_eq!(colocated[0]["frequencies"]["G"]["amr"], json!(0.3));
    assert_eq!(colocated[0]["id"], json!("rs699"));
    assert_eq!(colocated[0]["start"], json!(230710048));
    assert_eq!(colocated[0].get("failed"), None);
    assert_eq!(colocated[0].get("matched_alleles"), None);
    assert_eq!(colocated[0].get("AMR"), None);
}

#[rstest]
fn test_custom_frequency_source_keeps_zero() {
    let mut lookups = IndexMap::new();
    lookups.insert(
        "T".to_string(),
        object(json!({"AFR_AF": ["0.1"], "EAS_AF": ["0.0"]})),
    );
    let assembler = RecordAssembler::new(
        NamingPolicy::default(),
        SeverityRanks::ensembl_default(),
        AssemblerConfig::default(),
        FixedFrequencies(lookups),
    )
    .unwrap();
    let mut variant = AnnotatedVariant {
        chr: "2".to_string(),
        start: 10,
        end: 10,
        strand: 1,
        allele_string: "C/T".to_string(),
        existing_variants: vec![object(json!({"variation_name": "rs5"}))],
        ..Default::default()
    };

    let record = assembler.assemble(&mut variant);

    let colocated = record.colocated_variants().unwrap();
    assert_eq!(
        colocated[0]["frequencies"],
        json!({"T": {"afr": 0.1, "eas": 0.0}})
    );
}

#[rstest]
fn test_frequencies_only_for_alt_alleles() {
    let source = PopulationFrequencies::new(FrequencyFlags::all());
    let policy = NamingPolicy::default();
    let existing = object(json!({"variation_name": "rs7", "EUR": "A:0.9,C:0.05,G:0.05"}));
    let variant = AnnotatedVariant {
        allele_string: "A/C/G".to_string(),
        ..Default::default()
    };
    let alts = variant.alt_alleles();
    assert_eq!(alts, vec!["C", "G"]);

    let per_allele: IndexMap<String, Map<String, Value>> = alts
        .iter()
        .map(|&a| (a.to_string(), source.frequencies(&existing, a)))
        .collect();
    let merged = merge_colocated(&alts, &existing, &per_allele, &policy);

    let frequencies = merged.frequencies().unwrap();
    assert_eq!(frequencies.contains_key("A"), false);
    assert_eq!(merged.frequency("C", "eur"), Some(&json!("0.05")));
    assert_eq!(merged.frequency("G", "eur"), Some(&json!("0.05")));
}

#[rstest]
fn test_position_splitting_and_missing_end() {
    let assembler = RecordAssembler::with_defaults(AssemblerConfig::default()).unwrap();
    let mut variant = AnnotatedVariant {
        chr: "3".to_string(),
        start: 5,
        end: 5,
        strand: 1,
        allele_string: "G/A".to_string(),
        fragments: vec![object(json!({
            "Feature_type": "Transcript",
            "Feature": "ENST1",
            "cDNA_position": "34-36",
            "CDS_position": "10",
            "Protein_position": "5-?",
            "Consequence": ["synonymous_variant"]
        }))],
        ..Default::default()
    };

    let record = assembler.assemble(&mut variant);
    let fragment = &record.consequences(&FeatureType::Transcript).unwrap()[0];

    assert_eq!(fragment["cdna_start"], json!(34));
    assert_eq!(fragment["cdna_end"], json!(36));
    assert_eq!(fragment["cds_start"], json!(10));
    assert_eq!(fragment["cds_end"], json!(10));
    assert_eq!(fragment["protein_start"], json!(5));
    assert_eq!(fragment.get("protein_end"), None);
    assert_eq!(fragment.get("cdna_position"), None);
}

#[rstest]
fn test_rename_completeness(mut missense_variant: AnnotatedVariant) {
    let policy = NamingPolicy::default();
    missense_variant.fragments[0].insert("SYMBOL".to_string(), json!("AGT"));
    missense_variant.fragments[0].insert("ENSP".to_string(), json!("ENSP00000355627"));
    missense_variant.fragments[0].insert("OverlapBP".to_string(), json!("1"));
    let assembler = RecordAssembler::with_defaults(AssemblerConfig::default()).unwrap();

    let record = assembler.assemble(&mut missense_variant);
    let rendered = record.to_json_line().unwrap();
    let value: Value = serde_json::from_str(&rendered).unwrap();

    fn walk(value: &Value, policy: &NamingPolicy, found: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if policy.renames.contains_key(key) {
                        found.push(key.clone());
                    }
                    walk(child, policy, found);
                }
            }
            Value::Array(items) => items.iter().for_each(|i| walk(i, policy, found)),
            _ => {}
        }
    }
    let mut leftovers = Vec::new();
    walk(&value, &policy, &mut leftovers);
    assert_eq!(leftovers, Vec::<String>::new());

    let fragment = &record.consequences(&FeatureType::Transcript).unwrap()[0];
    assert_eq!(fragment["gene_symbol"], json!("AGT"));
    assert_eq!(fragment["protein_id"], json!("ENSP00000355627"));
    assert_eq!(fragment["bp_overlap"], json!(1));
    assert_eq!(fragment["variant_allele"], json!("G"));
    assert_eq!(fragment["consequence_terms"], json!(["missense_variant"]));
}

#[rstest]
fn test_record_numberify_is_idempotent(mut missense_variant: AnnotatedVariant) {
    let assembler = RecordAssembler::with_defaults(AssemblerConfig::default()).unwrap();
    let record = assembler.assemble(&mut missense_variant);

    let once = Value::Object(record.into_inner());
    let mut twice = once.clone();
    numberify(&mut twice, &assembler.policy().numberify_exempt);

    assert_eq!(once, twice);
}

#[rstest]
fn test_config_fixture_drives_assembly() {
    let path = PathBuf::from("tests/data/config.toml");
    let config = AssemblerConfig::try_from(path.as_path()).unwrap();
    let assembler = RecordAssembler::with_defaults(config).unwrap();
    let mut variant = AnnotatedVariant {
        variation_name: "rs1".to_string(),
        chr: "X".to_string(),
        start: 1,
        end: 1,
        strand: 1,
        allele_string: "C/T".to_string(),
        line: Some(vec!["X".to_string(), "1".to_string(), "rs1".to_string()]),
        existing_variants: vec![object(json!({
            "variation_name": "rs1",
            "AFR": "T:0.5",
            "AA": "T:0.4",
            "ExAC": "T:0.3",
            "gnomAD": "T:0.2"
        }))],
        ..Default::default()
    };

    let record = assembler.assemble(&mut variant);

    assert_eq!(record.get("assembly_name"), Some(&json!("GRCh38")));
    assert_eq!(record.get("input"), Some(&json!("X 1 rs1")));
    assert_eq!(
        record.colocated_variants().unwrap()[0]["frequencies"],
        json!({"T": {"afr": 0.5, "gnomad": 0.2}})
    );
}

#[rstest]
fn test_unranked_terms_give_unknown() {
    let ranks: SeverityRanks = [("stop_gained", 1u32)].into_iter().collect();
    let assembler = RecordAssembler::new(
        NamingPolicy::default(),
        ranks,
        AssemblerConfig::default(),
        PopulationFrequencies::default(),
    )
    .unwrap();
    let mut variant = AnnotatedVariant {
        chr: "1".to_string(),
        start: 1,
        end: 1,
        strand: 1,
        allele_string: "A/T".to_string(),
        fragments: vec![object(json!({"Consequence": ["intergenic_variant"]}))],
        ..Default::default()
    };

    let record = assembler.assemble(&mut variant);

    assert_eq!(record.most_severe_consequence(), Some("?"));
    assert_eq!(record.consequences(&FeatureType::Intergenic).map(Vec::len), Some(1));
}
