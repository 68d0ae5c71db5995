//! Loan domain module
//!
//! Contains the loan model, the in-memory ledger with its per-device
//! reservation guard, and the events emitted on return.

mod clock;
mod events;
mod guard;
mod ledger;
mod model;

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{log_events, LoanEvent, LoanEvents};
pub use guard::{DeviceGuard, ReservationGuards};
pub use ledger::{demo_loans, LedgerError, LoanLedger, LOAN_DURATION_DAYS};
pub use model::*;
