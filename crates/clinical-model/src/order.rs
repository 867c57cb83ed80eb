//! Drugs and drug orders.

use crate::{Concept, DomainEntity, Encounter, NonEmptyText, Patient, Practitioner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dispensable drug product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub uuid: String,
    pub name: NonEmptyText,
    pub concept: Option<Concept>,
    pub retired: bool,
}

impl DomainEntity for Drug {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        Some(self.name.to_string())
    }
}

/// What an order does to the order it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    #[default]
    New,
    Revise,
    Renew,
    Discontinue,
}

/// An order to administer a drug.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugOrder {
    pub uuid: String,
    pub patient: Option<Patient>,
    pub encounter: Option<Encounter>,
    pub orderer: Option<Practitioner>,
    pub drug: Option<Drug>,
    pub action: OrderAction,
    pub date_activated: Option<DateTime<Utc>>,
    pub date_stopped: Option<DateTime<Utc>>,
    pub auto_expire_date: Option<DateTime<Utc>>,
    pub voided: bool,
}

impl DrugOrder {
    /// True once the order was explicitly stopped at or before `now`.
    pub fn is_stopped(&self, now: DateTime<Utc>) -> bool {
        self.date_stopped.is_some_and(|stopped| stopped <= now)
    }

    /// True once the order ran past its automatic expiry at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.auto_expire_date.is_some_and(|expiry| expiry <= now)
    }
}

impl DomainEntity for DrugOrder {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn display(&self) -> Option<String> {
        self.drug.as_ref().map(|d| d.name.to_string())
    }
}
