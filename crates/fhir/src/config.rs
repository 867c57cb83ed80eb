//! Translator configuration.
//!
//! Configuration is resolved once by the embedding application and passed into
//! [`crate::registry::TranslatorRegistry`]. Nothing in this crate reads environment variables;
//! [`concept_sources_from_env_value`] only parses a value the caller already read.

use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Concept sources known out of the box, as `(source name, coding system URI)`.
const DEFAULT_CONCEPT_SOURCES: [(&str, &str); 4] = [
    ("CIEL", "https://cielterminology.org"),
    ("LOINC", "http://loinc.org"),
    ("SNOMED CT", "http://snomed.info/sct"),
    ("ICD-10-WHO", "http://hl7.org/fhir/sid/icd-10"),
];

/// Configuration shared by all translators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Concept source name → coding system URI.
    concept_sources: BTreeMap<String, String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            concept_sources: DEFAULT_CONCEPT_SOURCES
                .iter()
                .map(|(name, uri)| ((*name).to_owned(), (*uri).to_owned()))
                .collect(),
        }
    }
}

impl TranslatorConfig {
    /// Create a configuration from a concept source table.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if a source name is blank or a system URI is not an
    /// `http(s)://` or `urn:` URI.
    pub fn new(concept_sources: BTreeMap<String, String>) -> FhirResult<Self> {
        for (name, uri) in &concept_sources {
            validate_concept_source(name, uri)?;
        }
        Ok(Self { concept_sources })
    }

    /// Load a configuration from YAML text.
    ///
    /// ```yaml
    /// concept_sources:
    ///   CIEL: https://cielterminology.org
    ///   LOINC: http://loinc.org
    /// ```
    pub fn from_yaml(yaml_text: &str) -> FhirResult<Self> {
        let parsed: TranslatorConfig = serde_yaml::from_str(yaml_text)?;
        Self::new(parsed.concept_sources)
    }

    /// The coding system URI for a concept source, matched case-insensitively.
    pub fn system_for_source(&self, source: &str) -> Option<&str> {
        self.concept_sources
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(source))
            .map(|(_, uri)| uri.as_str())
    }

    /// The concept source name for a coding system URI.
    pub fn source_for_system(&self, system: &str) -> Option<&str> {
        self.concept_sources
            .iter()
            .find(|(_, uri)| uri.as_str() == system)
            .map(|(name, _)| name.as_str())
    }
}

/// Parse a concept source table from an environment-style value.
///
/// The value is a `;`-separated list of `NAME=URI` pairs. If `value` is `None` or
/// empty/whitespace, returns the default configuration.
pub fn concept_sources_from_env_value(value: Option<String>) -> FhirResult<TranslatorConfig> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(value) = value else {
        return Ok(TranslatorConfig::default());
    };

    let mut sources = BTreeMap::new();
    for pair in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, uri) = pair.split_once('=').ok_or_else(|| {
            FhirError::InvalidInput(format!("concept source entry '{pair}' is not NAME=URI"))
        })?;
        sources.insert(name.trim().to_owned(), uri.trim().to_owned());
    }
    TranslatorConfig::new(sources)
}

fn validate_concept_source(name: &str, uri: &str) -> FhirResult<()> {
    if name.trim().is_empty() {
        return Err(FhirError::InvalidInput(
            "concept source name cannot be empty".into(),
        ));
    }
    let scheme_ok = ["http://", "https://", "urn:"]
        .iter()
        .any(|scheme| uri.starts_with(*scheme));
    if !scheme_ok || uri.contains(char::is_whitespace) {
        return Err(FhirError::InvalidInput(format!(
            "concept source '{name}' has an invalid system URI: '{uri}'"
        )));
    }
    Ok(())
}
