//! Pure lifecycle transitions over the request collection.
//!
//! Every transition takes the full collection by value plus the acting
//! username and an injected `now`, and returns the new collection together
//! with an optional user-facing [`Notice`]. Referencing an unknown item id
//! is a silent no-op (stale UI references are tolerated); precondition
//! violations on user-facing actions return a descriptive error instead of
//! mutating into an inconsistent state.

use crate::error::CoreError;
use crate::notice::Notice;
use crate::record::{format_time_of_day, Request, RequestKind};
use crate::status::RequestStatus;
use crate::types::Timestamp;

/// Result of a transition: the new collection and an optional notice.
#[derive(Debug)]
pub struct TransitionOutcome {
    pub requests: Vec<Request>,
    pub notice: Option<Notice>,
}

impl TransitionOutcome {
    fn unchanged(requests: Vec<Request>) -> Self {
        Self {
            requests,
            notice: None,
        }
    }

    fn with_notice(requests: Vec<Request>, notice: Notice) -> Self {
        Self {
            requests,
            notice: Some(notice),
        }
    }
}

/// Stamp a status change: new status, machine + display timestamps, actor.
fn stamp_status(record: &mut Request, status: RequestStatus, actor: &str, now: Timestamp) {
    record.status = status;
    record.last_status_update = Some(now);
    record.last_status_update_time = Some(format_time_of_day(&now));
    record.status_changed_by = Some(actor.to_string());
}

// ---------------------------------------------------------------------------
// Accept
// ---------------------------------------------------------------------------

/// Accept a request or join a project.
///
/// The first acceptance moves the record from `Pending` to `In Process`.
/// Accepting a solo request that another user already holds, or joining a
/// project that already has `usersNeeded` acceptors, is a conflict.
/// Re-accepting is a no-op.
pub fn accept(
    mut requests: Vec<Request>,
    item_id: &str,
    actor: &str,
    now: Timestamp,
) -> Result<TransitionOutcome, CoreError> {
    let Some(idx) = requests.iter().position(|r| r.id == item_id) else {
        return Ok(TransitionOutcome::unchanged(requests));
    };

    if requests[idx].is_accepted_by(actor) {
        return Ok(TransitionOutcome::unchanged(requests));
    }
    let record = &mut requests[idx];

    match record.kind {
        RequestKind::Request => {
            if !record.accepted_by.is_empty() {
                return Err(CoreError::Conflict(
                    "This request has already been accepted by another user".to_string(),
                ));
            }
            record.accepted_by.insert(actor);
            record.accepted_by.normalize_for(RequestKind::Request);
        }
        RequestKind::Project => {
            let needed = record.users_needed.unwrap_or(i64::MAX);
            if (record.accepted_by.len() as i64) >= needed {
                return Err(CoreError::Conflict(
                    "This project already has all the participants it needs".to_string(),
                ));
            }
            record.accepted_by.insert(actor);
            record.accepted_by.normalize_for(RequestKind::Project);
            record.users_accepted = Some(record.accepted_by.len() as i64);
        }
    }

    if record.status == RequestStatus::Pending {
        stamp_status(record, RequestStatus::InProcess, actor, now);
    }

    let notice = Notice::success(
        "Request accepted",
        "You have been added as a participant on this item.",
    );
    Ok(TransitionOutcome::with_notice(requests, notice))
}

// ---------------------------------------------------------------------------
// MarkCompleted
// ---------------------------------------------------------------------------

/// Mark an item completed by the acting user.
///
/// Solo requests complete unconditionally. Projects record the actor's
/// individual completion and only transition once every acceptor has
/// completed; a non-acceptor signalling completion is ignored so that
/// `participantsCompleted` stays a subset of `acceptedBy`.
pub fn mark_completed(
    mut requests: Vec<Request>,
    item_id: &str,
    actor: &str,
    now: Timestamp,
) -> TransitionOutcome {
    let Some(idx) = requests.iter().position(|r| r.id == item_id) else {
        return TransitionOutcome::unchanged(requests);
    };
    let record = &mut requests[idx];

    if record.is_project() {
        if !record.is_accepted_by(actor) {
            tracing::warn!(
                id = %record.id,
                actor,
                "Ignoring completion signal from a non-participant"
            );
            return TransitionOutcome::unchanged(requests);
        }

        if !record.participants_completed.iter().any(|u| u == actor) {
            record.participants_completed.push(actor.to_string());
        }

        if record.participants_completed.len() == record.accepted_by.len() {
            stamp_status(record, RequestStatus::Completed, actor, now);
        }
    } else {
        stamp_status(record, RequestStatus::Completed, actor, now);
    }

    let notice = Notice::success(
        "Marked as Completed",
        "The item has been marked as completed successfully.",
    );
    TransitionOutcome::with_notice(requests, notice)
}

// ---------------------------------------------------------------------------
// Abandon / Reject
// ---------------------------------------------------------------------------

/// Reject an item the acting user previously accepted.
///
/// Multi-party items (projects, and requests flagged `multiDepartment`)
/// only remove the actor from the participant list; the record returns to
/// `Pending` once the last participant leaves. Solo requests are rejected
/// outright.
pub fn abandon(
    mut requests: Vec<Request>,
    item_id: &str,
    actor: &str,
    now: Timestamp,
) -> TransitionOutcome {
    let Some(idx) = requests.iter().position(|r| r.id == item_id) else {
        return TransitionOutcome::unchanged(requests);
    };
    let record = &mut requests[idx];

    let multi_party = record.multi_department || record.is_project();

    if multi_party {
        let before = record.accepted_by.len() as i64;
        record.accepted_by.remove(actor);
        record.accepted_by.normalize_for(record.kind);
        record.participants_completed.retain(|u| u != actor);

        let cardinality = record.accepted_by.len() as i64;
        if let Some(stored) = record.users_accepted {
            // The counter should have tracked the pre-removal cardinality;
            // anything else is drift inherited from an older write.
            if stored != before {
                tracing::warn!(
                    id = %record.id,
                    stored,
                    actual = before,
                    "usersAccepted counter drifted from acceptedBy cardinality"
                );
            }
        }
        if record.is_project() || record.users_accepted.is_some() {
            record.users_accepted = Some(cardinality.max(0));
        }

        if record.accepted_by.is_empty() && record.status != RequestStatus::Pending {
            stamp_status(record, RequestStatus::Pending, actor, now);
        }

        let notice = Notice::info(
            "Request rejected",
            "You have been removed from the participants list.",
        );
        return TransitionOutcome::with_notice(requests, notice);
    }

    stamp_status(record, RequestStatus::Rejected, actor, now);
    let notice = Notice::info(
        "Request Rejected",
        "The item has been rejected and marked as such.",
    );
    TransitionOutcome::with_notice(requests, notice)
}

// ---------------------------------------------------------------------------
// Archive / Unarchive
// ---------------------------------------------------------------------------

/// Move a pending project into the archive.
///
/// Only pending projects can be archived; anything else is a conflict.
/// Re-archiving an already archived project is a no-op so the purge clock
/// is not reset.
pub fn archive(
    mut requests: Vec<Request>,
    item_id: &str,
    now: Timestamp,
) -> Result<TransitionOutcome, CoreError> {
    let Some(idx) = requests.iter().position(|r| r.id == item_id) else {
        return Ok(TransitionOutcome::unchanged(requests));
    };
    let record = &mut requests[idx];

    if !record.is_project() {
        return Err(CoreError::Conflict(
            "Only projects can be archived".to_string(),
        ));
    }
    if record.status != RequestStatus::Pending {
        return Err(CoreError::Conflict(format!(
            "Only pending projects can be archived (status is {})",
            record.status.as_str()
        )));
    }
    if record.archived {
        return Ok(TransitionOutcome::unchanged(requests));
    }

    record.archived = true;
    record.archived_at = Some(now);

    let notice = Notice::info(
        "Project archived",
        "The project has been moved to the archive.",
    );
    Ok(TransitionOutcome::with_notice(requests, notice))
}

/// Restore a project from the archive.
pub fn unarchive(mut requests: Vec<Request>, item_id: &str) -> TransitionOutcome {
    let Some(idx) = requests.iter().position(|r| r.id == item_id) else {
        return TransitionOutcome::unchanged(requests);
    };
    let record = &mut requests[idx];

    if !record.archived {
        return TransitionOutcome::unchanged(requests);
    }

    record.archived = false;
    record.archived_at = None;

    let notice = Notice::success(
        "Project restored",
        "The project has been restored from the archive.",
    );
    TransitionOutcome::with_notice(requests, notice)
}

// ---------------------------------------------------------------------------
// Delete / ClearHistory
// ---------------------------------------------------------------------------

/// Permanently remove a record from the collection. Irreversible.
pub fn delete(mut requests: Vec<Request>, item_id: &str) -> TransitionOutcome {
    let before = requests.len();
    requests.retain(|r| r.id != item_id);

    if requests.len() == before {
        return TransitionOutcome::unchanged(requests);
    }

    let notice = Notice::info(
        "Project deleted",
        "The project has been permanently deleted.",
    );
    TransitionOutcome::with_notice(requests, notice)
}

/// Remove every completed or rejected record the actor created.
///
/// History clearing is creator-scoped: records where the actor is merely an
/// acceptor are left alone.
pub fn clear_history(mut requests: Vec<Request>, actor: &str) -> TransitionOutcome {
    requests.retain(|r| !(r.creator == actor && r.status.is_terminal()));

    let notice = Notice::success(
        "History cleared",
        "Your history has been cleared successfully.",
    );
    TransitionOutcome::with_notice(requests, notice)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
