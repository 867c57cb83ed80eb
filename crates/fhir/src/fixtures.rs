//! Shared test fixtures: a small, consistent clinical record set and lookup ports over it.

use crate::config::TranslatorConfig;
use crate::registry::{LookupPorts, TranslatorRegistry};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clinical_model::{
    CodedOrFreeText, Concept, ConceptLookup, ConceptMapping, ConceptNumeric, Diagnosis,
    DiagnosisCertainty, Drug, DrugOrder, Encounter, EntityLookup, Gender, InMemoryStore, Location,
    LookupError, LookupResult, NonEmptyText, Obs, ObsInterpretation, ObsStatus, ObsValue,
    OrderAction, Patient, PatientIdentifier, PersonName, Practitioner, Visit,
};
use std::sync::Arc;

pub const PATIENT_UUID: &str = "90a8d1ea-3180-41d9-adb0-70a834d4e0f6";
pub const LOCATION_UUID: &str = "58c57d25-8d39-41ab-8422-108a0c277d98";
pub const PRACTITIONER_UUID: &str = "f9badd80-ab76-11e2-9e96-0800200c9a66";
pub const VISIT_UUID: &str = "3e7d6a4f-1b2c-4e8a-9c65-0a1f2b3c4d5e";
pub const ENCOUNTER_UUID: &str = "6519d653-7b3c-4c2f-9d1e-8f2a3b4c5d6e";
pub const WEIGHT_CONCEPT_UUID: &str = "5089AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const MALARIA_CONCEPT_UUID: &str = "116128AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const OUTPATIENT_CONCEPT_UUID: &str = "160542AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const CONSULTATION_CONCEPT_UUID: &str = "dd528487-82a5-4082-9c72-ed246bd49591";
pub const WEIGHT_OBS_UUID: &str = "b0c2d4e6-0f1a-4b3c-8d5e-7f9a1b3c5d7e";
pub const DIAGNOSIS_UUID: &str = "c1d3e5f7-1a2b-4c3d-9e4f-5a6b7c8d9e0f";
pub const DRUG_UUID: &str = "3cfcf118-931c-46f7-8ff6-7b876f0d4202";
pub const DRUG_ORDER_UUID: &str = "e2f4a6b8-2b3c-4d5e-8f6a-7b8c9d0e1f2a";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).expect("fixture text is non-empty")
}

fn concept(uuid: &str, name: &str, mappings: &[(&str, &str)]) -> Concept {
    Concept {
        uuid: uuid.into(),
        name: Some(name.into()),
        mappings: mappings
            .iter()
            .map(|(source, code)| ConceptMapping {
                source: (*source).into(),
                code: (*code).into(),
            })
            .collect(),
        numeric: None,
    }
}

// ============================================================================
// Entities
// ============================================================================

pub fn patient() -> Patient {
    Patient {
        uuid: PATIENT_UUID.into(),
        names: vec![PersonName {
            given: Some("Sarah".into()),
            middle: Some("Jane".into()),
            family: Some("Williams".into()),
            preferred: true,
        }],
        identifiers: vec![PatientIdentifier {
            identifier: "100-8".into(),
            type_name: Some("OpenMRS ID".into()),
            preferred: true,
        }],
        gender: Some(Gender::Female),
        birthdate: NaiveDate::from_ymd_opt(1992, 3, 20),
        dead: false,
        death_date: None,
        voided: false,
    }
}

pub fn location() -> Location {
    Location {
        uuid: LOCATION_UUID.into(),
        name: text("Outpatient Clinic"),
        retired: false,
    }
}

pub fn practitioner() -> Practitioner {
    Practitioner {
        uuid: PRACTITIONER_UUID.into(),
        name: text("Amina Okafor"),
        identifier: Some("PRV-12".into()),
        retired: false,
    }
}

pub fn weight_concept() -> Concept {
    let mut weight = concept(
        WEIGHT_CONCEPT_UUID,
        "Weight (kg)",
        &[("CIEL", "5089"), ("LOINC", "3141-9")],
    );
    weight.numeric = Some(ConceptNumeric {
        low_absolute: Some(0.0),
        hi_absolute: Some(250.0),
        units: Some("kg".into()),
        ..Default::default()
    });
    weight
}

pub fn malaria_concept() -> Concept {
    concept(
        MALARIA_CONCEPT_UUID,
        "Malaria",
        &[("CIEL", "116128"), ("ICD-10-WHO", "B54")],
    )
}

pub fn outpatient_concept() -> Concept {
    concept(OUTPATIENT_CONCEPT_UUID, "Outpatient", &[("CIEL", "160542")])
}

pub fn consultation_concept() -> Concept {
    concept(CONSULTATION_CONCEPT_UUID, "Consultation", &[])
}

pub fn visit() -> Visit {
    Visit {
        uuid: VISIT_UUID.into(),
        patient: Some(patient()),
        visit_type: Some(outpatient_concept()),
        location: Some(location()),
        start_datetime: Some(at(2024, 3, 1, 8, 0)),
        stop_datetime: Some(at(2024, 3, 1, 16, 0)),
        voided: false,
    }
}

pub fn encounter() -> Encounter {
    Encounter {
        uuid: ENCOUNTER_UUID.into(),
        patient: Some(patient()),
        visit: Some(visit()),
        encounter_type: Some(consultation_concept()),
        location: Some(location()),
        encounter_datetime: Some(at(2024, 3, 1, 9, 30)),
        providers: vec![practitioner()],
        voided: false,
    }
}

pub fn weight_obs() -> Obs {
    Obs {
        uuid: WEIGHT_OBS_UUID.into(),
        person: Some(patient()),
        encounter: Some(encounter()),
        concept: Some(weight_concept()),
        obs_datetime: Some(at(2024, 3, 1, 9, 45)),
        value: Some(ObsValue::Numeric(72.5)),
        status: ObsStatus::Final,
        interpretation: Some(ObsInterpretation::Normal),
        comment: Some("Weighed without shoes".into()),
        group_members: Vec::new(),
        voided: false,
    }
}

pub fn diagnosis() -> Diagnosis {
    Diagnosis {
        uuid: DIAGNOSIS_UUID.into(),
        patient: Some(patient()),
        encounter: Some(encounter()),
        diagnosis: CodedOrFreeText {
            coded: Some(malaria_concept()),
            non_coded: None,
        },
        certainty: Some(DiagnosisCertainty::Confirmed),
        rank: Some(1),
        date_created: Some(at(2024, 3, 1, 10, 5)),
        voided: false,
    }
}

pub fn drug() -> Drug {
    Drug {
        uuid: DRUG_UUID.into(),
        name: text("Artemether/Lumefantrine 20/120mg"),
        concept: None,
        retired: false,
    }
}

pub fn drug_order() -> DrugOrder {
    DrugOrder {
        uuid: DRUG_ORDER_UUID.into(),
        patient: Some(patient()),
        encounter: Some(encounter()),
        orderer: Some(practitioner()),
        drug: Some(drug()),
        action: OrderAction::New,
        date_activated: Some(at(2024, 3, 1, 10, 15)),
        date_stopped: None,
        auto_expire_date: Some(at(2024, 3, 4, 10, 15)),
        voided: false,
    }
}

// ============================================================================
// Ports
// ============================================================================

/// A port whose backend is always down.
pub struct FailingLookup;

impl<E> EntityLookup<E> for FailingLookup {
    fn get(&self, _uuid: &str) -> LookupResult<Option<E>> {
        Err(LookupError::Unavailable("test backend offline".into()))
    }
}

impl ConceptLookup for FailingLookup {
    fn get_by_mapping(&self, _source: &str, _code: &str) -> LookupResult<Option<Concept>> {
        Err(LookupError::Unavailable("test backend offline".into()))
    }
}

pub fn ports() -> LookupPorts {
    LookupPorts {
        patients: Arc::new(InMemoryStore::with_entities([patient()])),
        practitioners: Arc::new(InMemoryStore::with_entities([practitioner()])),
        locations: Arc::new(InMemoryStore::with_entities([location()])),
        visits: Arc::new(InMemoryStore::with_entities([visit()])),
        encounters: Arc::new(InMemoryStore::with_entities([encounter()])),
        observations: Arc::new(InMemoryStore::with_entities([weight_obs()])),
        diagnoses: Arc::new(InMemoryStore::with_entities([diagnosis()])),
        drug_orders: Arc::new(InMemoryStore::with_entities([drug_order()])),
        drugs: Arc::new(InMemoryStore::with_entities([drug()])),
        concepts: Arc::new(InMemoryStore::with_entities([
            weight_concept(),
            malaria_concept(),
            outpatient_concept(),
            consultation_concept(),
        ])),
    }
}

pub fn failing_ports() -> LookupPorts {
    let failing = Arc::new(FailingLookup);
    LookupPorts {
        patients: failing.clone(),
        practitioners: failing.clone(),
        locations: failing.clone(),
        visits: failing.clone(),
        encounters: failing.clone(),
        observations: failing.clone(),
        diagnoses: failing.clone(),
        drug_orders: failing.clone(),
        drugs: failing.clone(),
        concepts: failing,
    }
}

pub fn registry() -> TranslatorRegistry {
    TranslatorRegistry::new(ports(), TranslatorConfig::default())
}

pub fn failing_registry() -> TranslatorRegistry {
    TranslatorRegistry::new(failing_ports(), TranslatorConfig::default())
}
