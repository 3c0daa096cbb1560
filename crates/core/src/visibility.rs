//! Role-based visibility filters and activity summaries.
//!
//! Pure derived views over the collection; nothing here mutates records.
//! Membership tests go through [`Request::is_accepted_by`] so both the
//! scalar and array acceptedBy shapes are handled.

use crate::record::Request;
use crate::status::RequestStatus;
use crate::user::CurrentUser;

/// How many items the recent-activity view shows.
pub const RECENT_ACTIVITY_LIMIT: usize = 3;

/// Records the user owns: created by them, or projects they participate in.
pub fn own_requests<'a>(requests: &'a [Request], user: &CurrentUser) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.creator == user.username || (r.is_project() && r.is_accepted_by(&user.username)))
        .collect()
}

/// Archived projects the user may see: admins see their own department's
/// archive, and creators always see their own archived projects.
pub fn archived_projects<'a>(requests: &'a [Request], user: &CurrentUser) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.is_project() && r.archived)
        .filter(|r| {
            (user.is_admin() && r.department == user.department) || r.creator == user.username
        })
        .collect()
}

/// In-process items the user has accepted.
pub fn accepted_items<'a>(requests: &'a [Request], user: &CurrentUser) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.status == RequestStatus::InProcess && r.is_accepted_by(&user.username))
        .collect()
}

/// Completed or rejected items the user created or accepted.
pub fn history_items<'a>(requests: &'a [Request], user: &CurrentUser) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.status.is_terminal())
        .filter(|r| r.creator == user.username || r.is_accepted_by(&user.username))
        .collect()
}

/// The user's own non-archived records, most recent first, capped at
/// [`RECENT_ACTIVITY_LIMIT`].
pub fn recent_activity<'a>(requests: &'a [Request], user: &CurrentUser) -> Vec<&'a Request> {
    let mut own: Vec<&Request> = own_requests(requests, user)
        .into_iter()
        .filter(|r| !r.archived)
        .collect();
    own.sort_by_key(|r| std::cmp::Reverse(r.last_status_update.or(r.created_at)));
    own.truncate(RECENT_ACTIVITY_LIMIT);
    own
}

/// Collection-wide totals for the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_process: usize,
    pub completed: usize,
    pub rejected: usize,
}

/// Count records by status.
pub fn status_counts(requests: &[Request]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: requests.len(),
        ..Default::default()
    };
    for record in requests {
        match record.status {
            RequestStatus::Pending => counts.pending += 1,
            RequestStatus::InProcess => counts.in_process += 1,
            RequestStatus::Completed => counts.completed += 1,
            RequestStatus::Rejected => counts.rejected += 1,
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
