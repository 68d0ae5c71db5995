//! Loan models and request/response DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::events::LoanEvent;

/// Human-readable loan identifier, e.g. `loan-007`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    const PREFIX: &'static str = "loan-";

    /// Build the identifier for the given sequence number
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{}{:03}", Self::PREFIX, seq))
    }

    /// Sequence number encoded in the identifier, if it follows the `loan-NNN` shape
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LoanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LoanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loan status
///
/// `Reserved -> Collected -> Returned`. `Active` only appears on seeded
/// records and behaves like `Reserved`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Reserved,
    Active,
    Collected,
    Returned,
}

impl LoanStatus {
    /// `Returned` is the only terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }

    /// Whether a loan in this status still holds its device
    pub fn holds_device(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Reserved => "reserved",
            LoanStatus::Active => "active",
            LoanStatus::Collected => "collected",
            LoanStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status a loan can be advanced to by staff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTarget {
    Collected,
    Returned,
}

impl AdvanceTarget {
    pub fn status(&self) -> LoanStatus {
        match self {
            AdvanceTarget::Collected => LoanStatus::Collected,
            AdvanceTarget::Returned => LoanStatus::Returned,
        }
    }
}

/// Loan model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub loan_id: LoanId,
    pub device_id: String,
    pub student_id: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: LoanStatus,
    pub collected_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Request to reserve a device
///
/// Fields are optional so that a missing value reports the same error as a
/// blank one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
}

/// Result of a successful status transition
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub loan: Loan,
    pub event: Option<LoanEvent>,
}

/// Response body for `GET /api/loans`
#[derive(Debug, Serialize)]
pub struct LoansResponse {
    pub loans: Vec<Loan>,
}

/// Response body for reservations and transitions
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub loan: Loan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
}

impl From<AdvanceOutcome> for LoanResponse {
    fn from(outcome: AdvanceOutcome) -> Self {
        Self {
            event: outcome.event.as_ref().map(LoanEvent::name),
            loan: outcome.loan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_id_sequence() {
        let id = LoanId::from_sequence(7);
        assert_eq!(id.as_str(), "loan-007");
        assert_eq!(id.sequence(), Some(7));

        assert_eq!(LoanId::from_sequence(1234).as_str(), "loan-1234");
        assert_eq!(LoanId::from("legacy").sequence(), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(LoanStatus::Reserved.holds_device());
        assert!(LoanStatus::Active.holds_device());
        assert!(LoanStatus::Collected.holds_device());
        assert!(LoanStatus::Returned.is_terminal());
    }

    #[test]
    fn test_loan_wire_shape() {
        let loan = Loan {
            loan_id: LoanId::from_sequence(1),
            device_id: "lap-001".to_string(),
            student_id: "S1234567".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            status: LoanStatus::Active,
            collected_at: None,
            returned_at: None,
        };

        let value = serde_json::to_value(&loan).unwrap();
        assert_eq!(value["loanId"], "loan-001");
        assert_eq!(value["deviceId"], "lap-001");
        assert_eq!(value["startDate"], "2026-01-07");
        assert_eq!(value["dueDate"], "2026-01-14");
        assert_eq!(value["status"], "active");
        assert!(value["collectedAt"].is_null());
        assert!(value["returnedAt"].is_null());
    }

    #[test]
    fn test_reserve_request_missing_fields() {
        let req: ReserveRequest = serde_json::from_str(r#"{"deviceId":"lap-001"}"#).unwrap();
        assert_eq!(req.device_id.as_deref(), Some("lap-001"));
        assert!(req.student_id.is_none());
    }
}
