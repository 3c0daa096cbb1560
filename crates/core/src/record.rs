//! The request record: the sole entity tracked by the engine.
//!
//! Records are persisted as a bare JSON array with camelCase keys; field
//! shapes must stay readable against blobs written by earlier versions of
//! the application. The notable legacy quirk is `acceptedBy`, which may be
//! absent, a bare username, an array of usernames, or (in corrupt old blobs)
//! a literal boolean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::CoreError;
use crate::status::RequestStatus;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// RequestKind
// ---------------------------------------------------------------------------

/// Kind constant for solo work items.
pub const KIND_REQUEST: &str = "request";

/// Kind constant for multi-participant work items.
pub const KIND_PROJECT: &str = "project";

/// Discriminates solo requests (one accepting party) from projects
/// (several accepting parties with archival support).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Request,
    Project,
}

impl RequestKind {
    /// Return the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => KIND_REQUEST,
            Self::Project => KIND_PROJECT,
        }
    }

    /// Parse from a wire string, returning an error for unknown kinds.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            KIND_REQUEST => Ok(Self::Request),
            KIND_PROJECT => Ok(Self::Project),
            other => Err(CoreError::Validation(format!(
                "Unknown request type: '{other}'. Valid types: {KIND_REQUEST}, {KIND_PROJECT}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AcceptedBy
// ---------------------------------------------------------------------------

/// Acceptance state, in every shape the legacy blob can carry.
///
/// `request` records store their single acceptor as a bare string (or
/// nothing); `project` records store an array. Reads additionally tolerate a
/// literal boolean, which old blobs sometimes contain — it deserializes as
/// "no acceptor" and [`Request::repair`] reconciles the counters afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AcceptedBy {
    /// No acceptor recorded (absent or `null` on the wire).
    #[default]
    None,
    /// A single acceptor stored as a bare username.
    User(String),
    /// A set of acceptors stored as an array. Order is insertion order;
    /// duplicates are never written.
    Users(Vec<String>),
}

impl AcceptedBy {
    /// Whether the field should be omitted from serialized output.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of acceptors.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::User(_) => 1,
            Self::Users(users) => users.len(),
        }
    }

    /// Whether there are no acceptors (covers both `None` and an empty array).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership test across both scalar and array shapes.
    pub fn contains(&self, username: &str) -> bool {
        match self {
            Self::None => false,
            Self::User(u) => u == username,
            Self::Users(users) => users.iter().any(|u| u == username),
        }
    }

    /// Borrowed view of the acceptors, regardless of shape.
    pub fn usernames(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::User(u) => vec![u.as_str()],
            Self::Users(users) => users.iter().map(String::as_str).collect(),
        }
    }

    /// Add a username with set semantics; re-adding is a no-op.
    pub fn insert(&mut self, username: &str) {
        if self.contains(username) {
            return;
        }
        *self = match std::mem::take(self) {
            Self::None => Self::User(username.to_string()),
            Self::User(existing) => Self::Users(vec![existing, username.to_string()]),
            Self::Users(mut users) => {
                users.push(username.to_string());
                Self::Users(users)
            }
        };
    }

    /// Remove a username from either shape; removing an absent user is a no-op.
    pub fn remove(&mut self, username: &str) {
        *self = match std::mem::take(self) {
            Self::User(u) if u == username => Self::None,
            Self::Users(mut users) => {
                users.retain(|u| u != username);
                Self::Users(users)
            }
            other => other,
        };
    }

    /// Coerce to the idiomatic wire shape for the record's kind.
    ///
    /// Projects always serialize an array. Requests serialize a scalar (or
    /// nothing) when they have at most one acceptor; a request that somehow
    /// accumulated several acceptors keeps the array shape rather than
    /// losing data.
    pub fn normalize_for(&mut self, kind: RequestKind) {
        match kind {
            RequestKind::Project => {
                let users: Vec<String> = match std::mem::take(self) {
                    Self::None => Vec::new(),
                    Self::User(u) => vec![u],
                    Self::Users(users) => users,
                };
                *self = Self::Users(dedup_preserving_order(users));
            }
            RequestKind::Request => {
                *self = match std::mem::take(self) {
                    Self::Users(mut users) => match users.len() {
                        0 => Self::None,
                        1 => Self::User(users.remove(0)),
                        _ => Self::Users(users),
                    },
                    other => other,
                };
            }
        }
    }
}

impl Serialize for AcceptedBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_none(),
            Self::User(u) => serializer.serialize_str(u),
            Self::Users(users) => users.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AcceptedBy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            User(String),
            Users(Vec<String>),
            // Corrupt legacy blobs carry `acceptedBy: true`; read as empty.
            Legacy(bool),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None | Some(Repr::Legacy(_)) => Ok(Self::None),
            Some(Repr::User(u)) => Ok(Self::User(u)),
            Some(Repr::Users(users)) => Ok(Self::Users(users)),
        }
    }
}

/// Drop duplicate usernames, keeping the first occurrence of each.
fn dedup_preserving_order(users: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(users.len());
    users.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A unit of work submitted by a creator to a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub creator: String,
    pub department: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: RequestStatus,

    /// Alters rejection semantics for `request`-kind items: a
    /// multi-department request is abandoned per-user instead of being
    /// rejected outright.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multi_department: bool,

    #[serde(default, skip_serializing_if = "AcceptedBy::is_absent")]
    pub accepted_by: AcceptedBy,

    /// Project only: how many acceptors the project needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_needed: Option<i64>,

    /// Project only: denormalized acceptor count. Transitions reconcile it
    /// against `accepted_by` cardinality; legacy blobs may carry drifted or
    /// negative values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_accepted: Option<i64>,

    /// Project only: acceptors who have individually signalled completion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants_completed: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<Timestamp>,

    /// Transient sweep marker: past the display-retention window, queued
    /// for deletion on the next sweep pass.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_expired: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_update: Option<Timestamp>,

    /// Display form of `last_status_update`, stamped alongside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_update_time: Option<String>,

    /// Who last changed the status; may be absent or equal to the creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    /// Display form of the creation date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Format a timestamp the way the status stamp is displayed.
pub fn format_time_of_day(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Format a timestamp the way the creation date is displayed.
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

impl Request {
    /// Create a solo request in `Pending` with no acceptor.
    pub fn new_request(
        creator: impl Into<String>,
        department: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        multi_department: bool,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: RequestKind::Request,
            creator: creator.into(),
            department: department.into(),
            title: title.into(),
            description: description.into(),
            status: RequestStatus::Pending,
            multi_department,
            accepted_by: AcceptedBy::None,
            users_needed: None,
            users_accepted: None,
            participants_completed: Vec::new(),
            archived: false,
            archived_at: None,
            is_expired: false,
            last_status_update: None,
            last_status_update_time: None,
            status_changed_by: None,
            created_at: Some(now),
            date_created: Some(format_date(&now)),
        }
    }

    /// Create a project in `Pending` with an empty acceptor set.
    pub fn new_project(
        creator: impl Into<String>,
        department: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        users_needed: i64,
        now: Timestamp,
    ) -> Self {
        let mut record = Self::new_request(creator, department, title, description, false, now);
        record.kind = RequestKind::Project;
        record.accepted_by = AcceptedBy::Users(Vec::new());
        record.users_needed = Some(users_needed);
        record.users_accepted = Some(0);
        record
    }

    pub fn is_project(&self) -> bool {
        self.kind == RequestKind::Project
    }

    /// Membership test handling both acceptedBy shapes.
    pub fn is_accepted_by(&self, username: &str) -> bool {
        self.accepted_by.contains(username)
    }

    /// Repair invariant violations left behind by legacy blobs or drifted
    /// counters. Returns the number of repairs applied; each one is logged.
    pub fn repair(&mut self) -> usize {
        let mut repairs = 0;

        // Projects always carry their acceptors as a duplicate-free array.
        if self.is_project() {
            let before = self.accepted_by.clone();
            self.accepted_by.normalize_for(RequestKind::Project);
            if self.accepted_by != before {
                tracing::warn!(id = %self.id, "Repaired project acceptedBy shape");
                repairs += 1;
            }

            let cardinality = self.accepted_by.len() as i64;
            match self.users_accepted {
                Some(n) if n != cardinality => {
                    tracing::warn!(
                        id = %self.id,
                        stored = n,
                        actual = cardinality,
                        "Repaired drifted usersAccepted counter"
                    );
                    self.users_accepted = Some(cardinality);
                    repairs += 1;
                }
                None => self.users_accepted = Some(cardinality),
                _ => {}
            }
        } else {
            let before = self.accepted_by.clone();
            self.accepted_by.normalize_for(RequestKind::Request);
            if self.accepted_by != before {
                tracing::warn!(id = %self.id, "Repaired request acceptedBy shape");
                repairs += 1;
            }
        }

        // participantsCompleted must stay a subset of acceptedBy.
        let before_len = self.participants_completed.len();
        let accepted = &self.accepted_by;
        self.participants_completed.retain(|u| accepted.contains(u));
        let retained = dedup_preserving_order(std::mem::take(&mut self.participants_completed));
        self.participants_completed = retained;
        if self.participants_completed.len() != before_len {
            tracing::warn!(
                id = %self.id,
                dropped = before_len - self.participants_completed.len(),
                "Repaired participantsCompleted entries outside acceptedBy"
            );
            repairs += 1;
        }

        // Archival is a pending-project state.
        if self.archived && !self.is_project() {
            tracing::warn!(id = %self.id, "Repaired archived flag on a non-project record");
            self.archived = false;
            self.archived_at = None;
            repairs += 1;
        }

        // The expiry marker only applies to terminal records.
        if self.is_expired && !self.status.is_terminal() {
            tracing::warn!(id = %self.id, "Repaired expiry marker on a non-terminal record");
            self.is_expired = false;
            repairs += 1;
        }

        repairs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
