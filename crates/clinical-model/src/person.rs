//! Patients and the parts of a person record that travel with them.

use crate::DomainEntity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Administrative gender as stored on a person record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// Every variant, in declaration order.
    pub const ALL: [Gender; 4] = [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown];
}

/// One name of a person.
///
/// The domain keeps a single given name and a single middle-name string. Wire names carry a
/// sequence of given names instead, so several middle names are stored space separated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub given: Option<String>,
    pub middle: Option<String>,
    pub family: Option<String>,
    /// Marks the name to use when only one can be shown.
    pub preferred: bool,
}

/// An identifier issued to a patient (medical record number, national id, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentifier {
    pub identifier: String,
    /// Name of the identifier type, e.g. "OpenMRS ID".
    pub type_name: Option<String>,
    pub preferred: bool,
}

/// A patient record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub uuid: String,
    pub names: Vec<PersonName>,
    pub identifiers: Vec<PatientIdentifier>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    pub dead: bool,
    pub death_date: Option<DateTime<Utc>>,
    /// Soft-deleted records stay in the store with this flag set.
    pub voided: bool,
}

impl Patient {
    /// The preferred name, falling back to the first name on record.
    pub fn preferred_name(&self) -> Option<&PersonName> {
        self.names
            .iter()
            .find(|n| n.preferred)
            .or_else(|| self.names.first())
    }
}

impl DomainEntity for Patient {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        let name = self.preferred_name()?;
        let parts: Vec<&str> = [&name.given, &name.middle, &name.family]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
