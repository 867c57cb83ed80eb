//! FHIR data types shared by several resources.
//!
//! Only the elements the translators read or write are modelled. Every struct rejects unknown
//! keys so that a schema mismatch surfaces as an error with a field path instead of silently
//! dropping data.

use crate::FhirError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Resource type tags
// ============================================================================

/// The closed set of resource types a reference may point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    Practitioner,
    Location,
    Encounter,
    Observation,
    Condition,
    Medication,
    MedicationRequest,
    ServiceRequest,
    AllergyIntolerance,
    DiagnosticReport,
    Group,
    Person,
    RelatedPerson,
}

impl ResourceType {
    /// Every variant, in declaration order.
    pub const ALL: [ResourceType; 14] = [
        ResourceType::Patient,
        ResourceType::Practitioner,
        ResourceType::Location,
        ResourceType::Encounter,
        ResourceType::Observation,
        ResourceType::Condition,
        ResourceType::Medication,
        ResourceType::MedicationRequest,
        ResourceType::ServiceRequest,
        ResourceType::AllergyIntolerance,
        ResourceType::DiagnosticReport,
        ResourceType::Group,
        ResourceType::Person,
        ResourceType::RelatedPerson,
    ];

    /// The tag exactly as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Practitioner => "Practitioner",
            ResourceType::Location => "Location",
            ResourceType::Encounter => "Encounter",
            ResourceType::Observation => "Observation",
            ResourceType::Condition => "Condition",
            ResourceType::Medication => "Medication",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::ServiceRequest => "ServiceRequest",
            ResourceType::AllergyIntolerance => "AllergyIntolerance",
            ResourceType::DiagnosticReport => "DiagnosticReport",
            ResourceType::Group => "Group",
            ResourceType::Person => "Person",
            ResourceType::RelatedPerson => "RelatedPerson",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = FhirError;

    /// Parses a wire tag. Matching is case-sensitive, as on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FhirError::InvalidInput(format!("Unknown resource type: '{s}'")))
    }
}

// ============================================================================
// Primitive-ish complex types
// ============================================================================

/// A coding from a code system.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: &str, code: &str, display: &str) -> Self {
        Self {
            system: Some(system.to_owned()),
            code: Some(code.to_owned()),
            display: Some(display.to_owned()),
        }
    }
}

/// A concept expressed as any number of codings plus optional free text.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            text: None,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }
}

/// A business identifier.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<IdentifierUse>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Purpose of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierUse {
    Usual,
    Official,
    Temp,
    Secondary,
    Old,
}

/// A typed pointer from one resource to another.
///
/// See [`crate::reference::ReferenceCodec`] for how the target is encoded and decoded.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// `"<ResourceType>/<id>"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,

    /// Explicit identifier of the target. Takes precedence over `reference` when decoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A time range.
///
/// A period with both sides absent is still a valid (empty) period.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Period {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// The single point in time this period stands for when read as an occurrence.
    ///
    /// `start` wins; `end` is used only when `start` is missing.
    pub fn occurrence(&self) -> Option<DateTime<Utc>> {
        self.start.or(self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A measured amount.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Quantity {
    /// A quantity with UCUM units when `units` is known.
    pub fn with_units(value: f64, units: Option<&str>) -> Self {
        Self {
            value: Some(value),
            unit: units.map(str::to_owned),
            system: units.map(|_| crate::constants::UCUM_SYSTEM.to_owned()),
            code: units.map(str::to_owned),
        }
    }
}

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    Official,
    Usual,
    Temp,
    Nickname,
    Anonymous,
    Old,
    Maiden,
}

/// A person's name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<NameUse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

/// A free text note.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Annotation {
    pub text: String,
}

/// Resource metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Coding>,
}

impl Meta {
    pub fn tagged(coding: Coding) -> Self {
        Self {
            last_updated: None,
            tag: vec![coding],
        }
    }

    pub fn has_tag(&self, system: &str, code: &str) -> bool {
        self.tag
            .iter()
            .any(|t| t.system.as_deref() == Some(system) && t.code.as_deref() == Some(code))
    }
}

// ============================================================================
// Extensions
// ============================================================================

/// An extension entry carrying an attribute with no first-class wire field.
///
/// Only the value types the translators use are modelled.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Extension {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_integer: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<DateTime<Utc>>,
}

impl Extension {
    pub fn integer(url: &str, value: i32) -> Self {
        Self {
            url: url.to_owned(),
            value_integer: Some(value),
            ..Default::default()
        }
    }

    pub fn code(url: &str, value: &str) -> Self {
        Self {
            url: url.to_owned(),
            value_code: Some(value.to_owned()),
            ..Default::default()
        }
    }
}

/// Find the first extension with the given URL.
pub fn find_extension<'a>(extensions: &'a [Extension], url: &str) -> Option<&'a Extension> {
    extensions.iter().find(|e| e.url == url)
}
