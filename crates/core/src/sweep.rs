//! Time-based sweep passes: expiration and archive purge.
//!
//! Both passes are pure `collection -> collection` functions driven by an
//! injected `now`. The expiration pass is two-phase: a terminal record past
//! its retention window is first marked `isExpired` (kept for one more
//! interval so the UI can fade it), then dropped on the following pass.

use chrono::Duration;

use crate::record::Request;
use crate::types::Timestamp;

/// Days a completed or rejected record stays visible before expiring.
pub const EXPIRY_RETENTION_DAYS: i64 = 1;

/// Days an archived pending project is retained before being purged.
pub const ARCHIVE_RETENTION_DAYS: i64 = 7;

/// Default sweep interval. The interval only tunes how long the expired
/// fade is visible; the retention windows above are the contract.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Counts of what a sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Terminal records newly marked as expired (kept this pass).
    pub expired_marked: usize,
    /// Previously-marked records dropped this pass.
    pub expired_removed: usize,
    /// Archived projects dropped after the retention window.
    pub archived_purged: usize,
}

impl SweepReport {
    /// Total records removed from the collection.
    pub fn total_removed(&self) -> usize {
        self.expired_removed + self.archived_purged
    }

    /// Whether the sweep changed the collection at all.
    pub fn changed(&self) -> bool {
        self.expired_marked > 0 || self.total_removed() > 0
    }
}

/// Outcome of a sweep: the new collection plus change counts.
#[derive(Debug)]
pub struct SweepOutcome {
    pub requests: Vec<Request>,
    pub report: SweepReport,
}

/// Expiration pass over terminal records.
///
/// A completed or rejected record whose status stamp is more than
/// [`EXPIRY_RETENTION_DAYS`] old is marked expired on the first encounter
/// and dropped on the next. Records without a status stamp are left alone.
pub fn expiration_pass(requests: Vec<Request>, now: Timestamp) -> SweepOutcome {
    let mut report = SweepReport::default();

    let requests = requests
        .into_iter()
        .filter_map(|mut record| {
            if !record.status.is_terminal() {
                return Some(record);
            }
            let Some(stamp) = record.last_status_update else {
                return Some(record);
            };

            if record.is_expired {
                report.expired_removed += 1;
                tracing::info!(id = %record.id, "Removing expired record");
                return None;
            }

            if now > stamp + Duration::days(EXPIRY_RETENTION_DAYS) {
                record.is_expired = true;
                report.expired_marked += 1;
                tracing::debug!(id = %record.id, "Marked record as expired");
            }
            Some(record)
        })
        .collect();

    SweepOutcome { requests, report }
}

/// Archive-purge pass over archived pending projects.
///
/// Drops records whose `archivedAt` is more than [`ARCHIVE_RETENTION_DAYS`]
/// old; everything else is retained, including archived records missing
/// their timestamp.
pub fn archive_purge_pass(requests: Vec<Request>, now: Timestamp) -> SweepOutcome {
    let mut report = SweepReport::default();

    let requests = requests
        .into_iter()
        .filter(|record| {
            if !record.archived || !matches!(record.status, crate::status::RequestStatus::Pending) {
                return true;
            }
            let Some(archived_at) = record.archived_at else {
                return true;
            };

            let keep = now <= archived_at + Duration::days(ARCHIVE_RETENTION_DAYS);
            if !keep {
                report.archived_purged += 1;
                tracing::info!(id = %record.id, "Purging archived project");
            }
            keep
        })
        .collect();

    SweepOutcome { requests, report }
}

/// Run both passes: expiration first, then archive purge.
pub fn run_sweep(requests: Vec<Request>, now: Timestamp) -> SweepOutcome {
    let expiration = expiration_pass(requests, now);
    let purge = archive_purge_pass(expiration.requests, now);

    SweepOutcome {
        requests: purge.requests,
        report: SweepReport {
            expired_marked: expiration.report.expired_marked,
            expired_removed: expiration.report.expired_removed,
            archived_purged: purge.report.archived_purged,
        },
    }
}

/// Whole days until an archived record is purged, rounded up.
///
/// Returns `None` for records that are not archived or have no archive
/// timestamp. Zero or negative means the record is due on the next sweep.
pub fn archive_days_remaining(record: &Request, now: Timestamp) -> Option<i64> {
    if !record.archived {
        return None;
    }
    let archived_at = record.archived_at?;
    let purge_at = archived_at + Duration::days(ARCHIVE_RETENTION_DAYS);
    let remaining = purge_at - now;

    let days = remaining.num_days();
    // Round a partial day up so "6 days 1 hour" reads as 7.
    if remaining > Duration::days(days) {
        Some(days + 1)
    } else {
        Some(days)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Request;
    use crate::status::RequestStatus;
    use crate::transitions;
    use chrono::{TimeZone, Utc};

    fn base() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn terminal_record(id: &str, status: RequestStatus, stamped_at: Timestamp) -> Request {
        let mut r = Request::new_request("ana", "IT", "t", "d", false, stamped_at);
        r.id = id.to_string();
        r.status = status;
        r.last_status_update = Some(stamped_at);
        r
    }

    fn archived_project(id: &str, archived_at: Timestamp) -> Request {
        let mut r = Request::new_project("ana", "IT", "t", "d", 2, archived_at);
        r.id = id.to_string();
        let outcome = transitions::archive(vec![r], id, archived_at).unwrap();
        outcome.requests.into_iter().next().unwrap()
    }

    // -- expiration pass ------------------------------------------------------

    #[test]
    fn fresh_terminal_record_is_untouched() {
        let record = terminal_record("r1", RequestStatus::Completed, base());
        let outcome = expiration_pass(vec![record], base() + chrono::Duration::hours(2));
        assert_eq!(outcome.requests.len(), 1);
        assert!(!outcome.requests[0].is_expired);
        assert!(!outcome.report.changed());
    }

    #[test]
    fn stale_terminal_record_is_marked_then_removed() {
        let record = terminal_record("r1", RequestStatus::Rejected, base());
        let later = base() + chrono::Duration::days(2);

        let outcome = expiration_pass(vec![record], later);
        assert_eq!(outcome.report.expired_marked, 1);
        assert!(outcome.requests[0].is_expired);

        // Next interval: the marked record is dropped.
        let next = expiration_pass(outcome.requests, later + chrono::Duration::minutes(1));
        assert_eq!(next.report.expired_removed, 1);
        assert!(next.requests.is_empty());
    }

    #[test]
    fn expiration_is_idempotent_at_one_instant() {
        let record = terminal_record("r1", RequestStatus::Completed, base());
        let later = base() + chrono::Duration::days(2);

        let first = expiration_pass(vec![record], later);
        let marked = first.requests.clone();
        let second = expiration_pass(first.requests, later);

        // The second application at the same instant removes the marked
        // record; applying once more changes nothing further.
        assert_eq!(second.report.expired_removed, 1);
        let third = expiration_pass(second.requests.clone(), later);
        assert_eq!(second.requests, third.requests);
        assert_eq!(marked.len(), 1);
    }

    #[test]
    fn active_records_never_expire() {
        let mut record = terminal_record("r1", RequestStatus::Completed, base());
        record.status = RequestStatus::InProcess;
        let outcome = expiration_pass(vec![record], base() + chrono::Duration::days(10));
        assert_eq!(outcome.requests.len(), 1);
        assert!(!outcome.requests[0].is_expired);
    }

    #[test]
    fn unstamped_terminal_record_is_retained() {
        let mut record = terminal_record("r1", RequestStatus::Completed, base());
        record.last_status_update = None;
        let outcome = expiration_pass(vec![record], base() + chrono::Duration::days(10));
        assert_eq!(outcome.requests.len(), 1);
    }

    #[test]
    fn boundary_is_exclusive() {
        let record = terminal_record("r1", RequestStatus::Completed, base());
        let exactly = base() + chrono::Duration::days(EXPIRY_RETENTION_DAYS);
        let outcome = expiration_pass(vec![record], exactly);
        assert!(!outcome.requests[0].is_expired);
    }

    // -- archive purge pass ---------------------------------------------------

    #[test]
    fn young_archive_is_retained() {
        let record = archived_project("p1", base());
        let outcome = archive_purge_pass(vec![record], base() + chrono::Duration::days(6));
        assert_eq!(outcome.requests.len(), 1);
    }

    #[test]
    fn old_archive_is_purged() {
        let record = archived_project("p1", base());
        let outcome =
            archive_purge_pass(vec![record], base() + chrono::Duration::days(8));
        assert!(outcome.requests.is_empty());
        assert_eq!(outcome.report.archived_purged, 1);
    }

    #[test]
    fn purge_boundary_is_exclusive() {
        let record = archived_project("p1", base());
        let exactly = base() + chrono::Duration::days(ARCHIVE_RETENTION_DAYS);
        let outcome = archive_purge_pass(vec![record], exactly);
        assert_eq!(outcome.requests.len(), 1);
    }

    #[test]
    fn unarchived_projects_are_not_purged() {
        let record = Request::new_project("ana", "IT", "t", "d", 2, base());
        let outcome = archive_purge_pass(vec![record], base() + chrono::Duration::days(30));
        assert_eq!(outcome.requests.len(), 1);
    }

    #[test]
    fn archive_without_timestamp_is_retained() {
        let mut record = archived_project("p1", base());
        record.archived_at = None;
        let outcome = archive_purge_pass(vec![record], base() + chrono::Duration::days(30));
        assert_eq!(outcome.requests.len(), 1);
    }

    // -- run_sweep ------------------------------------------------------------

    #[test]
    fn run_sweep_combines_both_passes() {
        let stale = terminal_record("r1", RequestStatus::Completed, base());
        let old_archive = archived_project("p1", base());
        let fresh = terminal_record("r2", RequestStatus::Completed, base() + chrono::Duration::days(8));

        let now = base() + chrono::Duration::days(8);
        let outcome = run_sweep(vec![stale, old_archive, fresh], now);

        assert_eq!(outcome.report.expired_marked, 1);
        assert_eq!(outcome.report.archived_purged, 1);
        let ids: Vec<&str> = outcome.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert!(outcome.requests[0].is_expired);
    }

    #[test]
    fn sweep_of_consistent_collection_is_quiet() {
        let record = Request::new_project("ana", "IT", "t", "d", 2, base());
        let outcome = run_sweep(vec![record], base() + chrono::Duration::hours(1));
        assert!(!outcome.report.changed());
        assert_eq!(outcome.requests.len(), 1);
    }

    // -- archive_days_remaining -----------------------------------------------

    #[test]
    fn days_remaining_rounds_partial_days_up() {
        let record = archived_project("p1", base());
        let now = base() + chrono::Duration::days(1) + chrono::Duration::hours(1);
        assert_eq!(archive_days_remaining(&record, now), Some(6));
    }

    #[test]
    fn days_remaining_exact_day_boundary() {
        let record = archived_project("p1", base());
        let now = base() + chrono::Duration::days(2);
        assert_eq!(archive_days_remaining(&record, now), Some(5));
    }

    #[test]
    fn days_remaining_due_today() {
        let record = archived_project("p1", base());
        let now = base() + chrono::Duration::days(7) + chrono::Duration::hours(3);
        assert_eq!(archive_days_remaining(&record, now), Some(0));
    }

    #[test]
    fn days_remaining_none_for_active_project() {
        let record = Request::new_project("ana", "IT", "t", "d", 2, base());
        assert_eq!(archive_days_remaining(&record, base()), None);
    }
}
