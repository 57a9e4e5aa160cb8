//! Submission records and the per-type index documents.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Review lifecycle of a submission. Starts at `Pending` and transitions
/// exactly once, to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

/// Admin verdict on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// Parse the wire value; anything but the two literals is invalid.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(ReviewAction::Approve),
            "reject" => Some(ReviewAction::Reject),
            _ => None,
        }
    }
}

/// A user-contributed content record awaiting or having received review.
/// Stored under its own id; never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    /// Opaque payload; shape depends on the content type
    pub data: Value,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Per-type list of submission ids still awaiting review, stored under
/// `pending_<type>`. Insertion order. May contain ids whose record has
/// already left `pending` (crash window); readers must filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingIndex {
    pub submissions: Vec<String>,
}

/// Per-type append-only list of published payloads, stored under
/// `approved_<type>`. Items lose their link to the originating
/// submission on purpose: public consumers only need the content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovedIndex {
    pub items: Vec<Value>,
}

// Last issued id suffix, shared across all types. Wall-clock millis
// bumped past the previous value, so concurrent submits in the same
// millisecond still get distinct, strictly increasing suffixes.
static LAST_ID_SUFFIX: AtomicI64 = AtomicI64::new(0);

/// Generate a submission id of the form `submission_<type>_<millis>`.
pub fn next_submission_id(content_type: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let mut candidate = now;
    loop {
        let last = LAST_ID_SUFFIX.load(Ordering::SeqCst);
        if candidate <= last {
            candidate = last + 1;
        }
        if LAST_ID_SUFFIX
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return format!("submission_{}_{}", content_type, candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(SubmissionStatus::Pending).unwrap(),
            json!("pending")
        );
        assert_eq!(
            serde_json::from_value::<SubmissionStatus>(json!("approved")).unwrap(),
            SubmissionStatus::Approved
        );
    }

    #[test]
    fn review_action_accepts_only_the_two_literals() {
        assert_eq!(ReviewAction::parse("approve"), Some(ReviewAction::Approve));
        assert_eq!(ReviewAction::parse("reject"), Some(ReviewAction::Reject));
        assert_eq!(ReviewAction::parse("Approve"), None);
        assert_eq!(ReviewAction::parse("publish"), None);
    }

    #[test]
    fn submission_uses_original_wire_names() {
        let submission = Submission {
            id: "submission_cheatsheet_1".to_string(),
            content_type: "cheatsheet".to_string(),
            data: json!({"title": "T"}),
            submitted_by: "Alice".to_string(),
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["type"], json!("cheatsheet"));
        assert_eq!(value["submittedBy"], json!("Alice"));
        assert_eq!(value["status"], json!("pending"));
        assert_eq!(value["reviewedBy"], json!(null));
    }

    #[test]
    fn ids_are_unique_and_increasing_within_a_type() {
        let a = next_submission_id("cheatsheet");
        let b = next_submission_id("cheatsheet");
        assert_ne!(a, b);

        let suffix = |id: &str| -> i64 {
            id.rsplit('_').next().unwrap().parse().unwrap()
        };
        assert!(suffix(&b) > suffix(&a));
        assert!(a.starts_with("submission_cheatsheet_"));
    }
}
