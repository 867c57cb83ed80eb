//! Code mapping tables.

use super::{CodeMapping, CodingMapping};
use crate::constants::{CONDITION_VERIFICATION_SYSTEM, INTERPRETATION_SYSTEM};
use crate::observation::ObservationStatus;
use crate::patient::AdministrativeGender;
use clinical_model::{DiagnosisCertainty, Gender, ObsInterpretation, ObsStatus};

pub static GENDER: CodeMapping<Gender, AdministrativeGender> = CodeMapping::new(&[
    (Gender::Male, AdministrativeGender::Male),
    (Gender::Female, AdministrativeGender::Female),
    (Gender::Other, AdministrativeGender::Other),
    (Gender::Unknown, AdministrativeGender::Unknown),
]);

pub static OBSERVATION_STATUS: CodeMapping<ObsStatus, ObservationStatus> = CodeMapping::new(&[
    (ObsStatus::Preliminary, ObservationStatus::Preliminary),
    (ObsStatus::Final, ObservationStatus::Final),
    (ObsStatus::Amended, ObservationStatus::Amended),
]);

pub static OBSERVATION_INTERPRETATION: CodingMapping<ObsInterpretation> = CodingMapping::new(
    INTERPRETATION_SYSTEM,
    &[
        (ObsInterpretation::Normal, "N", "Normal"),
        (ObsInterpretation::Abnormal, "A", "Abnormal"),
        (ObsInterpretation::CriticallyAbnormal, "AA", "Critical abnormal"),
        (ObsInterpretation::High, "H", "High"),
        (ObsInterpretation::CriticallyHigh, "HH", "Critical high"),
        (ObsInterpretation::Low, "L", "Low"),
        (ObsInterpretation::CriticallyLow, "LL", "Critical low"),
        (ObsInterpretation::OffScaleHigh, ">", "Off scale high"),
        (ObsInterpretation::OffScaleLow, "<", "Off scale low"),
        (ObsInterpretation::Negative, "NEG", "Negative"),
        (ObsInterpretation::Positive, "POS", "Positive"),
    ],
);

/// Certainty as carried by the diagnosis-certainty extension.
pub static DIAGNOSIS_CERTAINTY_CODE: CodeMapping<DiagnosisCertainty, &str> = CodeMapping::new(&[
    (DiagnosisCertainty::Provisional, "PROVISIONAL"),
    (DiagnosisCertainty::Confirmed, "CONFIRMED"),
]);

/// Certainty as carried by `Condition.verificationStatus`.
pub static DIAGNOSIS_VERIFICATION: CodingMapping<DiagnosisCertainty> = CodingMapping::new(
    CONDITION_VERIFICATION_SYSTEM,
    &[
        (DiagnosisCertainty::Provisional, "provisional", "Provisional"),
        (DiagnosisCertainty::Confirmed, "confirmed", "Confirmed"),
    ],
);
