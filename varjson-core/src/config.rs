use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DELIMITER, PLUS_DELIMITER};
use crate::errors::VarJsonError;
use crate::frequency::FrequencyProject;

/// Which frequency projects the frequency source should consult.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct FrequencyFlags {
    pub af_1kg: bool,
    pub af_esp: bool,
    pub af_exac: bool,
    pub af_gnomad: bool,
}

impl FrequencyFlags {
    pub fn all() -> Self {
        FrequencyFlags {
            af_1kg: true,
            af_esp: true,
            af_exac: true,
            af_gnomad: true,
        }
    }

    pub fn includes(&self, project: FrequencyProject) -> bool {
        match project {
            FrequencyProject::ThousandGenomes => self.af_1kg,
            FrequencyProject::Esp => self.af_esp,
            FrequencyProject::Exac => self.af_exac,
            FrequencyProject::Gnomad => self.af_gnomad,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Joins the raw input tokens into the `input` field. `+` means a space.
    pub delimiter: String,
    /// Assembly name that overrides everything else.
    pub assembly: Option<String>,
    /// Assembly of the annotation cache, used when nothing better is known.
    pub cache_assembly: Option<String>,
    pub frequencies: FrequencyFlags,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            delimiter: DEFAULT_DELIMITER.to_string(),
            assembly: None,
            cache_assembly: None,
            frequencies: FrequencyFlags::default(),
        }
    }
}

impl AssemblerConfig {
    pub fn input_delimiter(&self) -> &str {
        if self.delimiter == PLUS_DELIMITER {
            DEFAULT_DELIMITER
        } else {
            &self.delimiter
        }
    }

    /// The configured assembly, then the variant's own hint, then the cache assembly.
    pub fn resolve_assembly<'a>(&'a self, hint: Option<&'a str>) -> Option<&'a str> {
        self.assembly
            .as_deref()
            .or(hint)
            .or(self.cache_assembly.as_deref())
    }
}

impl TryFrom<&Path> for AssemblerConfig {
    type Error = VarJsonError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
