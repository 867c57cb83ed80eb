//! FHIR MedicationRequest wire model and the drug order translator.

use crate::constants::MEDICATION_REQUEST_INTENT_ORDER;
use crate::datatypes::{Period, Reference, ResourceType};
use crate::translator::{DynTranslator, Translator, UpdatableTranslator};
use crate::wire::WireResource;
use crate::FhirResult;
use chrono::{DateTime, Utc};
use clinical_model::{new_uuid, Drug, DrugOrder, Encounter, OrderAction, Patient, Practitioner};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire model
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationRequestStatus {
    Active,
    OnHold,
    Cancelled,
    Completed,
    EnteredInError,
    Stopped,
    Draft,
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DispenseRequest {
    /// Activation to stop or expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<Period>,
}

/// MedicationRequest resource (wire model).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MedicationRequestResource {
    /// Always `"MedicationRequest"`.
    pub resource_type: String,

    /// Drug order uuid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Derived order status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MedicationRequestStatus>,

    /// Always `order` on the way out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// The drug, referenced as a Medication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_reference: Option<Reference>,

    /// The patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Encounter the order was placed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    /// Activation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authored_on: Option<DateTime<Utc>>,

    /// Ordering practitioner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,

    /// Holds the validity period; nothing else is carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_request: Option<DispenseRequest>,
}

impl WireResource for MedicationRequestResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::MedicationRequest;

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

/// Derived status of a drug order at `now`.
///
/// First match wins:
/// 1. voided → `entered-in-error`
/// 2. discontinue action → `cancelled`
/// 3. stopped at or before `now` → `stopped`
/// 4. expired at or before `now` → `completed`
/// 5. otherwise `active`
pub fn medication_request_status(
    order: &DrugOrder,
    now: DateTime<Utc>,
) -> MedicationRequestStatus {
    if order.voided {
        MedicationRequestStatus::EnteredInError
    } else if order.action == OrderAction::Discontinue {
        MedicationRequestStatus::Cancelled
    } else if order.is_stopped(now) {
        MedicationRequestStatus::Stopped
    } else if order.is_expired(now) {
        MedicationRequestStatus::Completed
    } else {
        MedicationRequestStatus::Active
    }
}

/// Validity of the order, or `None` when it has neither a start nor an end.
pub fn validity_period(order: &DrugOrder) -> Option<Period> {
    let period = Period::new(
        order.date_activated,
        order.date_stopped.or(order.auto_expire_date),
    );
    (!period.is_empty()).then_some(period)
}

// ============================================================================
// Translator
// ============================================================================

/// DrugOrder ⇄ MedicationRequest resource.
pub struct MedicationRequestTranslator {
    drugs: DynTranslator<Drug, Reference>,
    patients: DynTranslator<Patient, Reference>,
    encounters: DynTranslator<Encounter, Reference>,
    practitioners: DynTranslator<Practitioner, Reference>,
}

impl MedicationRequestTranslator {
    pub fn new(
        drugs: DynTranslator<Drug, Reference>,
        patients: DynTranslator<Patient, Reference>,
        encounters: DynTranslator<Encounter, Reference>,
        practitioners: DynTranslator<Practitioner, Reference>,
    ) -> Self {
        Self {
            drugs,
            patients,
            encounters,
            practitioners,
        }
    }
}

impl Translator<DrugOrder, MedicationRequestResource> for MedicationRequestTranslator {
    fn to_wire(
        &self,
        domain: Option<&DrugOrder>,
    ) -> FhirResult<Option<MedicationRequestResource>> {
        let Some(order) = domain else {
            return Ok(None);
        };

        Ok(Some(MedicationRequestResource {
            resource_type: ResourceType::MedicationRequest.as_str().to_owned(),
            id: Some(order.uuid.clone()),
            status: Some(medication_request_status(order, Utc::now())),
            intent: Some(MEDICATION_REQUEST_INTENT_ORDER.to_owned()),
            medication_reference: self.drugs.to_wire(order.drug.as_ref())?,
            subject: self.patients.to_wire(order.patient.as_ref())?,
            encounter: self.encounters.to_wire(order.encounter.as_ref())?,
            authored_on: order.date_activated,
            requester: self.practitioners.to_wire(order.orderer.as_ref())?,
            dispense_request: validity_period(order).map(|period| DispenseRequest {
                validity_period: Some(period),
            }),
        }))
    }

    fn to_domain(
        &self,
        wire: Option<&MedicationRequestResource>,
    ) -> FhirResult<Option<DrugOrder>> {
        wire.map(|resource| self.create(resource)).transpose()
    }
}

impl UpdatableTranslator<DrugOrder, MedicationRequestResource> for MedicationRequestTranslator {
    fn create(&self, wire: &MedicationRequestResource) -> FhirResult<DrugOrder> {
        let order = DrugOrder {
            uuid: wire.id.clone().unwrap_or_else(new_uuid),
            ..Default::default()
        };
        self.to_domain_update(order, wire)
    }

    /// Merge a MedicationRequest onto `existing`.
    ///
    /// The validity end is a stop date when the resource says `stopped` and an expiry date
    /// otherwise. A stop date still in the future goes out as `active`, so it comes back as an
    /// expiry date.
    fn to_domain_update(
        &self,
        mut existing: DrugOrder,
        wire: &MedicationRequestResource,
    ) -> FhirResult<DrugOrder> {
        if let Some(drug) = self.drugs.to_domain(wire.medication_reference.as_ref())? {
            existing.drug = Some(drug);
        }
        if let Some(patient) = self.patients.to_domain(wire.subject.as_ref())? {
            existing.patient = Some(patient);
        }
        if let Some(encounter) = self.encounters.to_domain(wire.encounter.as_ref())? {
            existing.encounter = Some(encounter);
        }
        if let Some(orderer) = self.practitioners.to_domain(wire.requester.as_ref())? {
            existing.orderer = Some(orderer);
        }

        let validity = wire
            .dispense_request
            .as_ref()
            .and_then(|d| d.validity_period.as_ref());
        if let Some(activated) = wire.authored_on.or_else(|| validity.and_then(|p| p.start)) {
            existing.date_activated = Some(activated);
        }
        if let Some(end) = validity.and_then(|p| p.end) {
            if wire.status == Some(MedicationRequestStatus::Stopped) {
                existing.date_stopped = Some(end);
            } else {
                existing.auto_expire_date = Some(end);
            }
        }

        if wire.status == Some(MedicationRequestStatus::EnteredInError) {
            existing.voided = true;
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
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn bare_wire() -> MedicationRequestResource {
        MedicationRequestResource {
            resource_type: "MedicationRequest".into(),
            ..Default::default()
        }
    }

    #[test]
    fn absent_in_gives_absent_out() {
        let registry = fixtures::registry();
        assert!(registry
            .medication_request()
            .to_wire(None)
            .expect("to wire")
            .is_none());
        assert!(registry
            .medication_request()
            .to_domain(None)
            .expect("to domain")
            .is_none());
    }

    #[test]
    fn status_precedence() {
        let mut order = DrugOrder {
            uuid: "o".into(),
            date_activated: Some(now() - Duration::days(10)),
            ..Default::default()
        };
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Active
        );

        order.auto_expire_date = Some(now() + Duration::days(1));
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Active
        );

        order.auto_expire_date = Some(now());
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Completed
        );

        order.date_stopped = Some(now() - Duration::days(1));
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Stopped
        );

        order.action = OrderAction::Discontinue;
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Cancelled
        );

        order.voided = true;
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::EnteredInError
        );
    }

    #[test]
    fn future_stop_date_is_still_active() {
        let order = DrugOrder {
            uuid: "o".into(),
            date_stopped: Some(now() + Duration::hours(1)),
            ..Default::default()
        };
        assert_eq!(
            medication_request_status(&order, now()),
            MedicationRequestStatus::Active
        );
    }

    #[test]
    fn validity_period_prefers_stop_date_and_is_omitted_when_empty() {
        let start = now() - Duration::days(3);
        let stopped = now() - Duration::days(1);
        let expires = now() + Duration::days(7);

        let mut order = DrugOrder {
            uuid: "o".into(),
            ..Default::default()
        };
        assert!(validity_period(&order).is_none());

        order.date_activated = Some(start);
        order.auto_expire_date = Some(expires);
        assert_eq!(validity_period(&order), Some(Period::new(Some(start), Some(expires))));

        order.date_stopped = Some(stopped);
        assert_eq!(validity_period(&order), Some(Period::new(Some(start), Some(stopped))));

        order.date_activated = None;
        assert_eq!(validity_period(&order), Some(Period::new(None, Some(stopped))));
    }

    #[test]
    fn order_goes_out_with_references() {
        let registry = fixtures::registry();
        let order = fixtures::drug_order();
        let resource = registry
            .medication_request()
            .to_wire(Some(&order))
            .expect("to wire")
            .expect("present");

        assert_eq!(resource.intent.as_deref(), Some("order"));
        assert_eq!(resource.authored_on, order.date_activated);
        let medication = resource.medication_reference.as_ref();
        assert_eq!(
            ReferenceCodec::decode_as(medication, ResourceType::Medication).as_deref(),
            Some(fixtures::DRUG_UUID)
        );
        assert_eq!(
            ReferenceCodec::decode_as(resource.requester.as_ref(), ResourceType::Practitioner)
                .as_deref(),
            Some(fixtures::PRACTITIONER_UUID)
        );
        let validity = resource
            .dispense_request
            .and_then(|d| d.validity_period)
            .expect("validity period");
        assert_eq!(validity.start, order.date_activated);
        assert_eq!(validity.end, order.auto_expire_date);
    }

    #[test]
    fn round_trip_restores_order() {
        let registry = fixtures::registry();
        let order = fixtures::drug_order();
        let resource = registry
            .medication_request()
            .to_wire(Some(&order))
            .expect("to wire")
            .expect("present");
        let back = registry
            .medication_request()
            .to_domain(Some(&resource))
            .expect("to domain")
            .expect("present");
        assert_eq!(back, order);
    }

    #[test]
    fn update_leaves_unset_dates_untouched() {
        let registry = fixtures::registry();
        let existing = fixtures::drug_order();
        let updated = registry
            .medication_request()
            .to_domain_update(existing.clone(), &bare_wire())
            .expect("update");
        assert_eq!(updated, existing);
    }

    #[test]
    fn medication_reference_must_point_at_a_medication() {
        let registry = fixtures::registry();
        let mut wire = bare_wire();
        wire.medication_reference = Some(ReferenceCodec::encode(
            ResourceType::Observation,
            fixtures::DRUG_UUID,
        ));
        let err = registry
            .medication_request()
            .to_domain(Some(&wire))
            .expect_err("type mismatch");
        match err {
            FhirError::InvalidReferenceType { expected, found } => {
                assert_eq!(expected, ResourceType::Medication);
                assert_eq!(found, ResourceType::Observation);
            }
            other => panic!("expected InvalidReferenceType error, got {other:?}"),
        }
    }

    #[test]
    fn stopped_order_comes_back_stopped() {
        let registry = fixtures::registry();
        let stopped = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        let mut order = fixtures::drug_order();
        order.date_stopped = Some(stopped);

        let resource = registry
            .medication_request()
            .to_wire(Some(&order))
            .expect("to wire")
            .expect("present");
        assert_eq!(resource.status, Some(MedicationRequestStatus::Stopped));

        let back = registry
            .medication_request()
            .to_domain(Some(&resource))
            .expect("to domain")
            .expect("present");
        assert_eq!(back.date_stopped, Some(stopped));
        assert_eq!(back.auto_expire_date, None);
        assert_eq!(
            medication_request_status(&back, now()),
            MedicationRequestStatus::Stopped
        );

        let merged = registry
            .medication_request()
            .to_domain_update(fixtures::drug_order(), &resource)
            .expect("update");
        assert_eq!(merged.date_stopped, Some(stopped));
        assert_eq!(merged.auto_expire_date, order.auto_expire_date);
    }
}
