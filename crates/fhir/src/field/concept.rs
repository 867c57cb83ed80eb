//! Concept ⇄ CodeableConcept.
//!
//! A concept goes out as one coding carrying its uuid (no system) followed by one coding per
//! terminology mapping whose source has a configured system URI. Coming back, codings are tried
//! in order and the first one that resolves wins.

use crate::config::TranslatorConfig;
use crate::datatypes::{CodeableConcept, Coding};
use crate::translator::Translator;
use crate::FhirResult;
use clinical_model::{Concept, ConceptLookup};
use std::sync::Arc;

pub struct ConceptTranslator {
    lookup: Arc<dyn ConceptLookup>,
    config: Arc<TranslatorConfig>,
}

impl ConceptTranslator {
    pub fn new(lookup: Arc<dyn ConceptLookup>, config: Arc<TranslatorConfig>) -> Self {
        Self { lookup, config }
    }

    fn resolve_coding(&self, coding: &Coding) -> FhirResult<Option<Concept>> {
        let Some(code) = coding.code.as_deref().filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };

        match coding.system.as_deref() {
            None => Ok(self.lookup.get(code)?),
            Some(system) => {
                let Some(source) = self.config.source_for_system(system) else {
                    tracing::debug!(system, code, "coding system has no concept source");
                    return Ok(None);
                };
                Ok(self.lookup.get_by_mapping(source, code)?)
            }
        }
    }
}

impl Translator<Concept, CodeableConcept> for ConceptTranslator {
    fn to_wire(&self, domain: Option<&Concept>) -> FhirResult<Option<CodeableConcept>> {
        let Some(concept) = domain else {
            return Ok(None);
        };

        let mut coding = vec![Coding {
            system: None,
            code: Some(concept.uuid.clone()),
            display: concept.name.clone(),
        }];
        for mapping in &concept.mappings {
            match self.config.system_for_source(&mapping.source) {
                Some(system) => coding.push(Coding {
                    system: Some(system.to_owned()),
                    code: Some(mapping.code.clone()),
                    display: concept.name.clone(),
                }),
                None => tracing::debug!(
                    source = %mapping.source,
                    "skipping unconfigured concept source"
                ),
            }
        }

        Ok(Some(CodeableConcept {
            coding,
            text: concept.name.clone(),
        }))
    }

    fn to_domain(&self, wire: Option<&CodeableConcept>) -> FhirResult<Option<Concept>> {
        let Some(codeable) = wire else {
            return Ok(None);
        };
        for coding in &codeable.coding {
            if let Some(concept) = self.resolve_coding(coding)? {
                return Ok(Some(concept));
            }
        }
        Ok(None)
    }
}
