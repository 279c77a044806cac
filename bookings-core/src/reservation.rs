//! Two-request reservation hand-off: the form POST stages a validated
//! candidate in the visitor's session, the summary GET consumes it.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::forms::{validate, Rule, ValidationResult};
use crate::models::Reservation;
use crate::session::{Session, SessionResult};

pub const RESERVATION_KEY: &str = "reservation";

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Re-render the form with `candidate` pre-filled and `result.errors` shown.
    Rejected {
        candidate: Reservation,
        result: ValidationResult,
    },
    /// The candidate is in the session under `session_key`; redirect to the summary.
    Accepted { session_key: &'static str },
}

/// Checks applied to every reservation submission. All of them run.
pub fn reservation_rules() -> Vec<Rule> {
    vec![
        Rule::required(&["first_name", "last_name", "email"]),
        Rule::min_length("first_name", 3),
        Rule::is_email("email"),
    ]
}

/// Validates a reservation form and, when it passes, stages the candidate in
/// the session. A rejected submission leaves the session untouched.
pub async fn submit_reservation(
    session: &Session,
    fields: HashMap<String, String>,
) -> SessionResult<SubmissionOutcome> {
    let candidate = Reservation::from_fields(&fields);
    let result = validate(&fields, &reservation_rules());

    if !result.is_valid() {
        debug!("Reservation form rejected with {} invalid field(s)", result.errors.len());
        return Ok(SubmissionOutcome::Rejected { candidate, result });
    }

    // Last write wins: a pending candidate that was never read is replaced.
    session.put(RESERVATION_KEY, &candidate).await?;
    info!(
        session = session.id(),
        email = ?candidate.email,
        "Reservation staged for summary"
    );

    Ok(SubmissionOutcome::Accepted {
        session_key: RESERVATION_KEY,
    })
}

/// Pops the staged candidate. `None` means nothing is pending for this visitor.
pub async fn read_pending(session: &Session) -> SessionResult<Option<Reservation>> {
    session.pop::<Reservation>(RESERVATION_KEY).await
}
