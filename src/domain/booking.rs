use {
    super::error::PaymentError,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

/// The booking whose payment this subsystem gates: an appointment or a
/// lab test, never both, never neither. Set when the order is created
/// and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BookingRef {
    Appointment(Uuid),
    LabTest(Uuid),
}

impl BookingRef {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Appointment(_) => "appointment",
            Self::LabTest(_) => "lab_test",
        }
    }

    pub fn target(&self) -> Uuid {
        match self {
            Self::Appointment(id) | Self::LabTest(id) => *id,
        }
    }

    /// Rebuild the linkage from its persisted columns, enforcing the
    /// exactly-one invariant the schema also carries.
    pub fn from_columns(
        kind: &str,
        appointment_id: Option<Uuid>,
        lab_test_id: Option<Uuid>,
    ) -> Result<Self, PaymentError> {
        match (kind, appointment_id, lab_test_id) {
            ("appointment", Some(id), None) => Ok(Self::Appointment(id)),
            ("lab_test", None, Some(id)) => Ok(Self::LabTest(id)),
            _ => Err(PaymentError::Validation(format!(
                "inconsistent booking linkage: kind={kind}, appointment={appointment_id:?}, lab_test={lab_test_id:?}"
            ))),
        }
    }
}
