//! Visits, encounters, and the places and people involved in them.

use crate::{Concept, DomainEntity, NonEmptyText, Patient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical place where care is delivered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub uuid: String,
    pub name: NonEmptyText,
    pub retired: bool,
}

impl DomainEntity for Location {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        Some(self.name.to_string())
    }
}

/// A clinician or other care provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
    pub uuid: String,
    pub name: NonEmptyText,
    /// Provider identifier issued by the facility.
    pub identifier: Option<String>,
    pub retired: bool,
}

impl DomainEntity for Practitioner {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        match &self.identifier {
            Some(identifier) => Some(format!("{} ({identifier})", self.name)),
            None => Some(self.name.to_string()),
        }
    }
}

/// A stay or attendance that groups encounters together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub uuid: String,
    pub patient: Option<Patient>,
    pub visit_type: Option<Concept>,
    pub location: Option<Location>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub stop_datetime: Option<DateTime<Utc>>,
    pub voided: bool,
}

impl DomainEntity for Visit {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.visit_type.as_ref().and_then(|t| t.name.clone())
    }
}

/// A single interaction between a patient and one or more providers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub uuid: String,
    pub patient: Option<Patient>,
    pub visit: Option<Visit>,
    pub encounter_type: Option<Concept>,
    pub location: Option<Location>,
    pub encounter_datetime: Option<DateTime<Utc>>,
    pub providers: Vec<Practitioner>,
    pub voided: bool,
}

impl DomainEntity for Encounter {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.encounter_type.as_ref().and_then(|t| t.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practitioner_display_includes_identifier() {
        let practitioner = Practitioner {
            uuid: "prov-1".into(),
            name: NonEmptyText::new("Dr. Jane Doe").expect("valid name"),
            identifier: Some("CLIN-7".into()),
            retired: false,
        };
        assert_eq!(
            practitioner.display().as_deref(),
            Some("Dr. Jane Doe (CLIN-7)")
        );
    }

    #[test]
    fn visit_survives_a_json_round_trip() {
        let visit = Visit {
            uuid: "visit-1".into(),
            location: Some(Location {
                uuid: "loc-1".into(),
                name: NonEmptyText::new("Ward 3").expect("valid name"),
                retired: false,
            }),
            start_datetime: "2024-03-01T08:00:00Z".parse().ok(),
            ..Default::default()
        };

        let json = serde_json::to_string(&visit).expect("serialize");
        let back: Visit = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, visit);
    }

    #[test]
    fn blank_location_name_is_rejected_on_deserialize() {
        let json = r#"{"uuid":"loc-1","name":"   ","retired":false}"#;
        assert!(serde_json::from_str::<Location>(json).is_err());
    }
}
