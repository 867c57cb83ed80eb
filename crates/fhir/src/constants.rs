//! Fixed wire identifiers.
//!
//! These values are part of the interchange contract and must be emitted verbatim.

/// Extension carrying the rank of an encounter diagnosis (`valueInteger`).
pub const EXT_DIAGNOSIS_RANK: &str = "http://fhir.openmrs.org/ext/diagnosis-rank";

/// Extension carrying the certainty of an encounter diagnosis (`valueCode`).
pub const EXT_DIAGNOSIS_CERTAINTY: &str = "http://fhir.openmrs.org/ext/diagnosis-certainty";

/// Tag system distinguishing visits from encounters (both travel as `Encounter`).
pub const ENCOUNTER_TAG_SYSTEM: &str = "http://fhir.openmrs.org/ext/encounter-tag";
pub const ENCOUNTER_TAG_VISIT: &str = "visit";
pub const ENCOUNTER_TAG_ENCOUNTER: &str = "encounter";

pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

pub const INTERPRETATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/v3-ObservationInterpretation";

pub const CONDITION_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
pub const CONDITION_VERIFICATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";
pub const CONDITION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-category";

/// Reference range meaning for the normal bounds.
pub const REFERENCE_RANGE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/referencerange-meaning";

/// Reference range meaning for the absolute and critical bounds, which have no HL7 code.
pub const OBS_REFERENCE_RANGE_SYSTEM: &str = "http://fhir.openmrs.org/ext/obs/reference-range";

pub const MEDICATION_REQUEST_INTENT_ORDER: &str = "order";
