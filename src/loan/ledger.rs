//! Loan ledger - reservation and lifecycle logic for device loans

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::clock::{Clock, SystemClock};
use super::events::{LoanEvent, LoanEvents};
use super::guard::ReservationGuards;
use super::model::{AdvanceOutcome, AdvanceTarget, Loan, LoanId, LoanStatus};

/// Days between the start date and the due date of a new loan
pub const LOAN_DURATION_DAYS: i64 = 2;

/// Ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("deviceId and studentId are required")]
    InvalidRequest,

    #[error("Loan not found")]
    NotFound(LoanId),

    #[error("Reservation in progress for this device. Try again.")]
    ReservationInProgress { device_id: String },

    #[error("Device already reserved/loaned")]
    DeviceUnavailable { existing_loan: Box<Loan> },

    #[error("Loan already returned")]
    AlreadyReturned(LoanId),

    #[error("Loan already collected")]
    AlreadyCollected(LoanId),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),
}

#[cfg(test)]
impl LedgerError {
    /// Whether the error reports contention or a state clash
    fn is_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::ReservationInProgress { .. }
                | LedgerError::DeviceUnavailable { .. }
                | LedgerError::AlreadyReturned(_)
                | LedgerError::AlreadyCollected(_)
        )
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    loans: Vec<Loan>,
    next_seq: u64,
}

impl LedgerState {
    fn open_loan_for(&self, device_id: &str) -> Option<&Loan> {
        self.loans
            .iter()
            .find(|l| l.device_id == device_id && l.status.holds_device())
    }

    fn allocate_id(&mut self) -> LoanId {
        let id = LoanId::from_sequence(self.next_seq);
        self.next_seq += 1;
        id
    }
}

/// In-memory loan store
///
/// Owns every [`Loan`] record. Reservations are serialized per device through
/// [`ReservationGuards`]; all mutations go through the write lock, which also
/// covers ID allocation.
pub struct LoanLedger {
    state: RwLock<LedgerState>,
    reservations: ReservationGuards,
    events: LoanEvents,
    clock: Arc<dyn Clock>,
}

impl LoanLedger {
    /// Create an empty ledger using the system clock
    pub fn new(events: LoanEvents) -> Self {
        Self::with_clock(events, Arc::new(SystemClock))
    }

    pub fn with_clock(events: LoanEvents, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                loans: Vec::new(),
                next_seq: 1,
            }),
            reservations: ReservationGuards::new(),
            events,
            clock,
        }
    }

    /// Load pre-existing records, checking ID uniqueness and the one open
    /// loan per device rule. The sequence continues after the highest seeded ID.
    pub fn seeded(mut self, loans: Vec<Loan>) -> Result<Self, LedgerError> {
        let mut ids = HashSet::new();
        let mut open_devices = HashSet::new();

        for loan in &loans {
            if !ids.insert(loan.loan_id.clone()) {
                return Err(LedgerError::InvalidSeed(format!(
                    "duplicate loan id {}",
                    loan.loan_id
                )));
            }
            if loan.status.holds_device() && !open_devices.insert(loan.device_id.as_str()) {
                return Err(LedgerError::InvalidSeed(format!(
                    "more than one open loan for device {}",
                    loan.device_id
                )));
            }
        }

        let highest = loans
            .iter()
            .filter_map(|l| l.loan_id.sequence())
            .max()
            .unwrap_or(0)
            .max(loans.len() as u64);

        let state = self.state.get_mut();
        state.loans = loans;
        state.next_seq = highest + 1;

        Ok(self)
    }

    pub fn events(&self) -> &LoanEvents {
        &self.events
    }

    /// All loans in creation order
    pub async fn list_loans(&self) -> Vec<Loan> {
        self.state.read().await.loans.clone()
    }

    #[cfg(test)]
    async fn get_loan(&self, loan_id: &LoanId) -> Option<Loan> {
        self.state
            .read()
            .await
            .loans
            .iter()
            .find(|l| &l.loan_id == loan_id)
            .cloned()
    }

    /// Reserve a device for a student
    pub async fn reserve(&self, device_id: &str, student_id: &str) -> Result<Loan, LedgerError> {
        let device_id = device_id.trim();
        let student_id = student_id.trim();
        if device_id.is_empty() || student_id.is_empty() {
            return Err(LedgerError::InvalidRequest);
        }

        let guard = self.reservations.try_acquire(device_id).ok_or_else(|| {
            tracing::warn!(device_id = %device_id, "Reservation already in progress");
            LedgerError::ReservationInProgress {
                device_id: device_id.to_string(),
            }
        })?;

        tracing::debug!(device_id = %guard.device_id(), "Reservation guard acquired");

        let mut state = self.state.write().await;

        if let Some(existing) = state.open_loan_for(device_id) {
            tracing::info!(
                device_id = %device_id,
                existing_loan = %existing.loan_id,
                status = %existing.status,
                "Device unavailable"
            );
            return Err(LedgerError::DeviceUnavailable {
                existing_loan: Box::new(existing.clone()),
            });
        }

        let start_date = self.clock.now().date_naive();
        let loan = Loan {
            loan_id: state.allocate_id(),
            device_id: device_id.to_string(),
            student_id: student_id.to_string(),
            start_date,
            due_date: start_date + Duration::days(LOAN_DURATION_DAYS),
            status: LoanStatus::Reserved,
            collected_at: None,
            returned_at: None,
        };
        state.loans.push(loan.clone());

        tracing::info!(
            loan_id = %loan.loan_id,
            device_id = %loan.device_id,
            student_id = %loan.student_id,
            due_date = %loan.due_date,
            "Device reserved"
        );

        Ok(loan)
    }

    /// Move a loan forward to `collected` or `returned`
    pub async fn advance_status(
        &self,
        loan_id: &LoanId,
        target: AdvanceTarget,
    ) -> Result<AdvanceOutcome, LedgerError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let loan = state
            .loans
            .iter_mut()
            .find(|l| &l.loan_id == loan_id)
            .ok_or_else(|| LedgerError::NotFound(loan_id.clone()))?;

        match (loan.status, target) {
            (LoanStatus::Returned, _) => {
                return Err(LedgerError::AlreadyReturned(loan_id.clone()));
            }
            (LoanStatus::Collected, AdvanceTarget::Collected) => {
                return Err(LedgerError::AlreadyCollected(loan_id.clone()));
            }
            _ => {}
        }

        let previous = loan.status;
        loan.status = target.status();
        let event = match target {
            AdvanceTarget::Collected => {
                loan.collected_at = Some(now);
                None
            }
            AdvanceTarget::Returned => {
                loan.returned_at = Some(now);
                Some(LoanEvent::DeviceReturned {
                    loan_id: loan.loan_id.clone(),
                    device_id: loan.device_id.clone(),
                    returned_at: now,
                })
            }
        };
        let loan = loan.clone();
        drop(state);

        tracing::info!(
            loan_id = %loan.loan_id,
            from = %previous,
            to = %loan.status,
            "Loan status advanced"
        );

        if let Some(event) = &event {
            self.events.publish(event.clone());
        }

        Ok(AdvanceOutcome { loan, event })
    }
}

/// Demo record present at startup in development
pub fn demo_loans() -> Vec<Loan> {
    vec![Loan {
        loan_id: LoanId::from_sequence(1),
        device_id: "lap-001".to_string(),
        student_id: "S1234567".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap_or_default(),
        due_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap_or_default(),
        status: LoanStatus::Active,
        collected_at: None,
        returned_at: None,
    }]
}
