/// Consequence term used when nothing could be ranked.
pub const UNKNOWN_CONSEQUENCE: &str = "?";

/// Placeholder the annotation engine writes for "no value".
pub const PLACEHOLDER: &str = "-";

/// Flag value normalised to `1`.
pub const FLAG_YES: &str = "YES";

/// Delimiter value that is read as a single space.
pub const PLUS_DELIMITER: &str = "+";
pub const DEFAULT_DELIMITER: &str = " ";

// raw fragment keys (after lowercasing)
pub const ALLELE_KEY: &str = "allele";
pub const FEATURE_KEY: &str = "feature";
pub const FEATURE_TYPE_KEY: &str = "feature_type";
pub const CONSEQUENCE_KEY: &str = "consequence";
pub const DOMAINS_KEY: &str = "domains";
pub const PREDICTION_TOOLS: [&str; 2] = ["sift", "polyphen"];

// output record keys
pub const ID_KEY: &str = "id";
pub const ASSEMBLY_NAME_KEY: &str = "assembly_name";
pub const INPUT_KEY: &str = "input";
pub const CUSTOM_ANNOTATIONS_KEY: &str = "custom_annotations";
pub const MOST_SEVERE_KEY: &str = "most_severe_consequence";
pub const COLOCATED_KEY: &str = "colocated_variants";
pub const FREQUENCIES_KEY: &str = "frequencies";
pub const CONSEQUENCES_SUFFIX: &str = "_consequences";
