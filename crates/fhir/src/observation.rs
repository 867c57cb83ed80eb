//! FHIR Observation wire model and translator.
//!
//! Notes:
//! - Exactly one `value[x]` element is emitted, chosen by the domain value's variant.
//! - `referenceRange` is derived from the observed concept's numeric bounds. It is never read
//!   back: bounds belong to the concept, not to a single observation.

use crate::constants::{OBS_REFERENCE_RANGE_SYSTEM, REFERENCE_RANGE_SYSTEM};
use crate::datatypes::{
    Annotation, CodeableConcept, Coding, Period, Quantity, Reference, ResourceType,
};
use crate::field::mappings::{OBSERVATION_INTERPRETATION, OBSERVATION_STATUS};
use crate::translator::{DynTranslator, Translator, UpdatableTranslator};
use crate::wire::WireResource;
use crate::FhirResult;
use chrono::{DateTime, Utc};
use clinical_model::{new_uuid, Concept, ConceptNumeric, Encounter, Obs, ObsValue, Patient};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire model
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationStatus {
    Registered,
    Preliminary,
    Final,
    Amended,
    Corrected,
    Cancelled,
    EnteredInError,
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ObservationReferenceRange {
    /// Lower bound, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,

    /// Upper bound, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,

    /// Which range this is: normal, absolute or critical.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub range_type: Option<CodeableConcept>,
}

/// Observation resource (wire model).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ObservationResource {
    /// Always `"Observation"`.
    pub resource_type: String,

    /// Obs uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Obs status, or `entered-in-error` when voided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ObservationStatus>,

    /// Observed concept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    /// The patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Encounter the obs was recorded in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// When the obs was taken. Wins over `effective_period`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<DateTime<Utc>>,

    /// Fallback for `effective_date_time`; start, else end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    /// Numeric value with the concept units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<Quantity>,

    /// Text value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    /// Coded value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    /// Boolean value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    /// Date and time value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<DateTime<Utc>>,

    /// Abnormality flag; the first entry that maps is read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interpretation: Vec<CodeableConcept>,

    /// Free-text comment; only the first note is read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,

    /// Ranges from the numeric concept, written only. Never read back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_range: Vec<ObservationReferenceRange>,

    /// Members of an obs group, as Observation references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_member: Vec<Reference>,
}

impl WireResource for ObservationResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Observation;

    fn resource_type_tag(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// Derived values
// ============================================================================

/// Derived status of an observation. Voided overrides the recorded status.
pub fn observation_status(obs: &Obs) -> Option<ObservationStatus> {
    if obs.voided {
        Some(ObservationStatus::EnteredInError)
    } else {
        OBSERVATION_STATUS.to_wire(Some(obs.status))
    }
}

/// Reference ranges for a numeric concept.
///
/// One entry per bound pair (normal, absolute, critical) that has at least one side.
pub fn reference_ranges(numeric: &ConceptNumeric) -> Vec<ObservationReferenceRange> {
    let units = numeric.units.as_deref();
    let pairs = [
        (
            numeric.low_normal,
            numeric.hi_normal,
            REFERENCE_RANGE_SYSTEM,
            "normal",
            "Normal Range",
        ),
        (
            numeric.low_absolute,
            numeric.hi_absolute,
            OBS_REFERENCE_RANGE_SYSTEM,
            "absolute",
            "Absolute Range",
        ),
        (
            numeric.low_critical,
            numeric.hi_critical,
            OBS_REFERENCE_RANGE_SYSTEM,
            "critical",
            "Critical Range",
        ),
    ];

    pairs
        .into_iter()
        .filter(|(low, high, ..)| low.is_some() || high.is_some())
        .map(|(low, high, system, code, display)| ObservationReferenceRange {
            low: low.map(|v| Quantity::with_units(v, units)),
            high: high.map(|v| Quantity::with_units(v, units)),
            range_type: Some(CodeableConcept::from_coding(Coding::new(system, code, display))),
        })
        .collect()
}

// ============================================================================
// Translator
// ============================================================================

/// Obs ⇄ Observation resource.
pub struct ObservationTranslator {
    concepts: DynTranslator<Concept, CodeableConcept>,
    patients: DynTranslator<Patient, Reference>,
    encounters: DynTranslator<Encounter, Reference>,
    observations: DynTranslator<Obs, Reference>,
}

impl ObservationTranslator {
    pub fn new(
        concepts: DynTranslator<Concept, CodeableConcept>,
        patients: DynTranslator<Patient, Reference>,
        encounters: DynTranslator<Encounter, Reference>,
        observations: DynTranslator<Obs, Reference>,
    ) -> Self {
        Self {
            concepts,
            patients,
            encounters,
            observations,
        }
    }

    fn value_to_wire(&self, obs: &Obs, resource: &mut ObservationResource) -> FhirResult<()> {
        match &obs.value {
            None => {}
            Some(ObsValue::Numeric(value)) => {
                let units = obs
                    .concept
                    .as_ref()
                    .and_then(|c| c.numeric.as_ref())
                    .and_then(|n| n.units.as_deref());
                resource.value_quantity = Some(Quantity::with_units(*value, units));
            }
            Some(ObsValue::Text(text)) => resource.value_string = Some(text.clone()),
            Some(ObsValue::Coded(answer)) => {
                resource.value_codeable_concept = self.concepts.to_wire(Some(answer))?;
            }
            Some(ObsValue::Boolean(value)) => resource.value_boolean = Some(*value),
            Some(ObsValue::DateTime(value)) => resource.value_date_time = Some(*value),
        }
        Ok(())
    }

    fn value_to_domain(&self, wire: &ObservationResource) -> FhirResult<Option<ObsValue>> {
        if let Some(value) = wire.value_quantity.as_ref().and_then(|q| q.value) {
            return Ok(Some(ObsValue::Numeric(value)));
        }
        if let Some(text) = &wire.value_string {
            return Ok(Some(ObsValue::Text(text.clone())));
        }
        if let Some(answer) = self.concepts.to_domain(wire.value_codeable_concept.as_ref())? {
            return Ok(Some(ObsValue::Coded(answer)));
        }
        if let Some(value) = wire.value_boolean {
            return Ok(Some(ObsValue::Boolean(value)));
        }
        Ok(wire.value_date_time.map(ObsValue::DateTime))
    }
}

impl Translator<Obs, ObservationResource> for ObservationTranslator {
    fn to_wire(&self, domain: Option<&Obs>) -> FhirResult<Option<ObservationResource>> {
        let Some(obs) = domain else {
            return Ok(None);
        };

        let mut has_member = Vec::with_capacity(obs.group_members.len());
        for member in &obs.group_members {
            if let Some(reference) = self.observations.to_wire(Some(member))? {
                has_member.push(reference);
            }
        }

        let mut resource = ObservationResource {
            resource_type: ResourceType::Observation.as_str().to_owned(),
            id: Some(obs.uuid.clone()),
            status: observation_status(obs),
            code: self.concepts.to_wire(obs.concept.as_ref())?,
            subject: self.patients.to_wire(obs.person.as_ref())?,
            encounter: self.encounters.to_wire(obs.encounter.as_ref())?,
            effective_date_time: obs.obs_datetime,
            interpretation: OBSERVATION_INTERPRETATION
                .to_codeable_concept(obs.interpretation)
                .into_iter()
                .collect(),
            note: obs
                .comment
                .iter()
                .map(|text| Annotation { text: text.clone() })
                .collect(),
            reference_range: obs
                .concept
                .as_ref()
                .and_then(|c| c.numeric.as_ref())
                .map(reference_ranges)
                .unwrap_or_default(),
            has_member,
            ..Default::default()
        };
        self.value_to_wire(obs, &mut resource)?;

        Ok(Some(resource))
    }

    fn to_domain(&self, wire: Option<&ObservationResource>) -> FhirResult<Option<Obs>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<Obs, ObservationResource> for ObservationTranslator {
    fn create(&self, wire: &ObservationResource) -> FhirResult<Obs> {
        let obs = Obs {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(obs, wire)
    }

    fn to_domain_update(&self, mut existing: Obs, wire: &ObservationResource) -> FhirResult<Obs> {
        if let Some(concept) = self.concepts.to_domain(wire.code.as_ref())? {
            existing.concept = Some(concept);
        }
        if let Some(person) = self.patients.to_domain(wire.subject.as_ref())? {
            existing.person = Some(person);
        }
        if let Some(encounter) = self.encounters.to_domain(wire.encounter.as_ref())? {
            existing.encounter = Some(encounter);
        }

        let mut members = Vec::new();
        for reference in &wire.has_member {
            if let Some(member) = self.observations.to_domain(Some(reference))? {
                members.push(member);
            }
        }
        if !members.is_empty() {
            existing.group_members = members;
        }

        if let Some(value) = self.value_to_domain(wire)? {
            existing.value = Some(value);
        }

        let effective = wire
            .effective_date_time
            .or_else(|| wire.effective_period.as_ref().and_then(Period::occurrence));
        if let Some(effective) = effective {
            existing.obs_datetime = Some(effective);
        }

        match wire.status {
            Some(ObservationStatus::EnteredInError) => existing.voided = true,
            status => {
                if let Some(status) = OBSERVATION_STATUS.to_domain(status) {
                    existing.status = status;
                }
            }
        }

        if let Some(interpretation) = wire
            .interpretation
            .iter()
            .find_map(|c| OBSERVATION_INTERPRETATION.from_codeable_concept(Some(c)))
        {
            existing.interpretation = Some(interpretation);
        }

        if let Some(note) = wire.note.first() {
            existing.comment = Some(note.text.clone());
        }

        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::reference::ReferenceCodec;
    use crate::FhirError;
    use chrono::TimeZone;
    use clinical_model::{ObsInterpretation, ObsStatus};

    fn bare_wire() -> ObservationResource {
        ObservationResource {
            resource_type: "Observation".into(),
            ..Default::default()
        }
    }

    #[test]
    fn absent_in_gives_absent_out() {
        let registry = fixtures::registry();
        assert!(registry.observation().to_wire(None).expect("to wire").is_none());
        assert!(registry.observation().to_domain(None).expect("to domain").is_none());
    }

    #[test]
    fn only_critical_low_gives_one_range() {
        let numeric = ConceptNumeric {
            low_critical: Some(2.5),
            ..Default::default()
        };
        let ranges = reference_ranges(&numeric);
        assert_eq!(ranges.len(), 1);

        let range = &ranges[0];
        assert_eq!(range.low.as_ref().and_then(|q| q.value), Some(2.5));
        assert!(range.high.is_none());
        let coding = &range.range_type.as_ref().expect("range type").coding[0];
        assert_eq!(coding.code.as_deref(), Some("critical"));
        assert_eq!(coding.system.as_deref(), Some(OBS_REFERENCE_RANGE_SYSTEM));
    }

    #[test]
    fn ranges_without_bounds_are_omitted() {
        assert!(reference_ranges(&ConceptNumeric::default()).is_empty());

        let numeric = ConceptNumeric {
            low_normal: Some(50.0),
            hi_normal: Some(80.0),
            hi_absolute: Some(250.0),
            units: Some("kg".into()),
            ..Default::default()
        };
        let ranges = reference_ranges(&numeric);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].high.as_ref().and_then(|q| q.unit.as_deref()), Some("kg"));
        assert_eq!(
            ranges[0].range_type.as_ref().expect("range type").coding[0]
                .system
                .as_deref(),
            Some(REFERENCE_RANGE_SYSTEM)
        );
        assert!(ranges[1].low.is_none());
    }

    #[test]
    fn numeric_obs_goes_out_with_units_and_ranges() {
        let registry = fixtures::registry();
        let obs = fixtures::weight_obs();

        let resource = registry
            .observation()
            .to_wire(Some(&obs))
            .expect("to wire")
            .expect("present");

        let quantity = resource.value_quantity.expect("quantity");
        assert_eq!(quantity.value, Some(72.5));
        assert_eq!(quantity.unit.as_deref(), Some("kg"));
        assert!(resource.value_string.is_none());
        assert_eq!(resource.status, Some(ObservationStatus::Final));
        assert_eq!(resource.effective_date_time, obs.obs_datetime);
        assert!(resource.effective_period.is_none());
        assert!(!resource.reference_range.is_empty());
        assert_eq!(
            ReferenceCodec::decode(resource.encounter.as_ref()).as_deref(),
            Some(fixtures::ENCOUNTER_UUID)
        );
        assert_eq!(resource.interpretation[0].coding[0].code.as_deref(), Some("N"));
        assert_eq!(resource.note[0].text, "Weighed without shoes");
    }

    #[test]
    fn voided_obs_is_entered_in_error() {
        let mut obs = fixtures::weight_obs();
        obs.status = ObsStatus::Amended;
        assert_eq!(observation_status(&obs), Some(ObservationStatus::Amended));

        obs.voided = true;
        assert_eq!(observation_status(&obs), Some(ObservationStatus::EnteredInError));
    }

    #[test]
    fn group_members_become_has_member_references() {
        let registry = fixtures::registry();
        let mut group = fixtures::weight_obs();
        group.uuid = "group".into();
        group.value = None;
        group.group_members = vec![fixtures::weight_obs()];

        let resource = registry
            .observation()
            .to_wire(Some(&group))
            .expect("to wire")
            .expect("present");
        assert_eq!(resource.has_member.len(), 1);
        assert_eq!(
            ReferenceCodec::decode_as(resource.has_member.first(), ResourceType::Observation)
                .as_deref(),
            Some(fixtures::WEIGHT_OBS_UUID)
        );

        let back = registry
            .observation()
            .to_domain(Some(&resource))
            .expect("to domain")
            .expect("present");
        assert_eq!(back.group_members, vec![fixtures::weight_obs()]);
    }

    #[test]
    fn round_trip_restores_obs() {
        let registry = fixtures::registry();
        let obs = fixtures::weight_obs();
        let resource = registry
            .observation()
            .to_wire(Some(&obs))
            .expect("to wire")
            .expect("present");
        let back = registry
            .observation()
            .to_domain(Some(&resource))
            .expect("to domain")
            .expect("present");
        assert_eq!(back, obs);
    }

    #[test]
    fn effective_date_time_wins_over_period() {
        let registry = fixtures::registry();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();

        let mut wire = bare_wire();
        wire.effective_date_time = Some(t1);
        wire.effective_period = Some(Period::new(Some(t2), None));
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.obs_datetime, Some(t1));

        wire.effective_date_time = None;
        wire.effective_period = Some(Period::new(None, Some(t2)));
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.obs_datetime, Some(t2));
    }

    #[test]
    fn empty_period_leaves_obs_datetime_untouched() {
        let registry = fixtures::registry();
        let existing = fixtures::weight_obs();
        let mut wire = bare_wire();
        wire.effective_period = Some(Period::default());

        let updated = registry
            .observation()
            .to_domain_update(existing.clone(), &wire)
            .expect("update");
        assert_eq!(updated.obs_datetime, existing.obs_datetime);
        assert_eq!(updated.value, existing.value);
    }

    #[test]
    fn inbound_values_of_each_kind() {
        let registry = fixtures::registry();
        let when = Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap();

        let mut wire = bare_wire();
        wire.value_string = Some("clear".into());
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.value, Some(ObsValue::Text("clear".into())));

        let mut wire = bare_wire();
        wire.value_boolean = Some(false);
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.value, Some(ObsValue::Boolean(false)));

        let mut wire = bare_wire();
        wire.value_date_time = Some(when);
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.value, Some(ObsValue::DateTime(when)));

        let mut wire = bare_wire();
        wire.value_codeable_concept = Some(CodeableConcept::from_coding(Coding::new(
            "https://cielterminology.org",
            "116128",
            "Malaria",
        )));
        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.value, Some(ObsValue::Coded(fixtures::malaria_concept())));
    }

    #[test]
    fn inbound_status_and_interpretation() {
        let registry = fixtures::registry();
        let mut wire = bare_wire();
        wire.status = Some(ObservationStatus::Preliminary);
        wire.interpretation = vec![CodeableConcept::from_coding(Coding::new(
            crate::constants::INTERPRETATION_SYSTEM,
            "HH",
            "Critical high",
        ))];

        let obs = registry.observation().create(&wire).expect("create");
        assert_eq!(obs.status, ObsStatus::Preliminary);
        assert_eq!(obs.interpretation, Some(ObsInterpretation::CriticallyHigh));
        assert!(!obs.voided);

        wire.status = Some(ObservationStatus::EnteredInError);
        let obs = registry.observation().create(&wire).expect("create");
        assert!(obs.voided);
        assert_eq!(obs.status, ObsStatus::Final);
    }

    #[test]
    fn wrong_encounter_type_fails() {
        let registry = fixtures::registry();
        let mut wire = bare_wire();
        wire.encounter = Some(ReferenceCodec::encode(
            ResourceType::Patient,
            fixtures::PATIENT_UUID,
        ));
        let err = registry
            .observation()
            .to_domain(Some(&wire))
            .expect_err("type mismatch");
        assert!(matches!(err, FhirError::InvalidReferenceType { .. }));
    }
}
