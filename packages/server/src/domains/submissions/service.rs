//! Submission service: the review state machine.
//!
//! Orchestrates create -> index -> review -> (approve: publish +
//! de-index | reject: de-index) over the key-value store. Within one
//! operation the store calls are strictly sequential; a crash between
//! the record write and the index writes leaves a stale index entry
//! that `list_pending` filters and `rebuild_pending_indices` repairs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::common::{approved_key, pending_key, CONTENT_TYPES};
use crate::kernel::{Identity, KvStore, ServerDeps};

use super::{
    next_submission_id, ApprovedIndex, PendingIndex, ReviewAction, Submission, SubmissionError,
    SubmissionStatus,
};

/// A new submission from the public endpoint
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub content_type: String,
    pub data: Option<Value>,
    pub submitted_by: Option<String>,
}

/// Admin account request, gated by the shared secret
#[derive(Debug, Clone)]
pub struct AdminSignup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub admin_secret: String,
}

pub struct SubmissionService {
    deps: ServerDeps,
    /// One async mutex per content type, created lazily. Serializes the
    /// read-modify-write cycles on the pending/approved indices; record
    /// writes are keyed by unique id and stay unguarded.
    index_locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SubmissionService {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps,
            index_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn store(&self) -> &dyn KvStore {
        self.deps.store.as_ref()
    }

    fn index_lock(&self, content_type: &str) -> Arc<Mutex<()>> {
        let mut locks = self.index_locks.lock().unwrap();
        locks
            .entry(content_type.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Resolve the bearer token and require the admin capability.
    async fn require_admin(&self, token: Option<&str>) -> Result<Identity, SubmissionError> {
        let token = token.ok_or_else(|| {
            SubmissionError::Authentication("Unauthorized - Admin access required".to_string())
        })?;

        let identity = self.deps.identity.verify_token(token).await?;

        if !identity.is_admin {
            return Err(SubmissionError::Authorization(
                "Forbidden - Admin privileges required".to_string(),
            ));
        }
        Ok(identity)
    }

    async fn load_submission(&self, id: &str) -> Result<Option<Submission>, SubmissionError> {
        match self.store().get(id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn store_submission(&self, submission: &Submission) -> Result<(), SubmissionError> {
        let value = serde_json::to_value(submission)?;
        self.store().set(&submission.id, value).await?;
        Ok(())
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Accept a public submission: write the record, then append its id
    /// to the type's pending index. Returns the generated id, the only
    /// handle the caller gets.
    pub async fn submit(&self, new: NewSubmission) -> Result<String, SubmissionError> {
        if new.content_type.trim().is_empty() {
            return Err(SubmissionError::Validation(
                "Missing required fields".to_string(),
            ));
        }
        let data = match new.data {
            Some(data) if !data.is_null() => data,
            _ => {
                return Err(SubmissionError::Validation(
                    "Missing required fields".to_string(),
                ))
            }
        };

        let id = next_submission_id(&new.content_type);
        let submission = Submission {
            id: id.clone(),
            content_type: new.content_type.clone(),
            data,
            submitted_by: new
                .submitted_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
        };

        self.store_submission(&submission).await?;

        let lock = self.index_lock(&new.content_type);
        let _guard = lock.lock().await;

        let key = pending_key(&new.content_type);
        let mut index: PendingIndex = match self.store().get(&key).await? {
            Some(value) => serde_json::from_value(value)?,
            None => PendingIndex::default(),
        };
        index.submissions.push(id.clone());
        self.store().set(&key, serde_json::to_value(&index)?).await?;

        info!(submission_id = %id, content_type = %new.content_type, "Submission received");
        Ok(id)
    }

    // =========================================================================
    // ListPending
    // =========================================================================

    /// All outstanding submissions across the known types, in fixed type
    /// order then index order. Admin only. Ids whose record is missing
    /// or no longer pending are skipped, not errors.
    pub async fn list_pending(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Submission>, SubmissionError> {
        self.require_admin(token).await?;

        let mut all = Vec::new();
        for content_type in CONTENT_TYPES {
            let key = pending_key(content_type);
            let index: PendingIndex = match self.store().get(&key).await? {
                Some(value) => serde_json::from_value(value)?,
                None => continue,
            };

            for id in &index.submissions {
                match self.load_submission(id).await? {
                    Some(submission) if submission.status == SubmissionStatus::Pending => {
                        all.push(submission);
                    }
                    Some(_) => {
                        // Stale index entry left by an interrupted review
                        warn!(submission_id = %id, "Skipping non-pending record in pending index");
                    }
                    None => {
                        warn!(submission_id = %id, "Pending index references missing record");
                    }
                }
            }
        }
        Ok(all)
    }

    // =========================================================================
    // Review
    // =========================================================================

    /// Apply an admin verdict. Flips the record to its terminal status,
    /// publishes the payload on approval, and removes the id from the
    /// pending index. A record that already left `pending` cannot be
    /// reviewed again.
    pub async fn review(
        &self,
        token: Option<&str>,
        submission_id: &str,
        action: &str,
    ) -> Result<Submission, SubmissionError> {
        let admin = self.require_admin(token).await?;

        if submission_id.is_empty() || action.is_empty() {
            return Err(SubmissionError::Validation(
                "Missing required fields".to_string(),
            ));
        }

        let action = ReviewAction::parse(action).ok_or_else(|| {
            SubmissionError::Validation(format!(
                "Invalid action '{}': must be 'approve' or 'reject'",
                action
            ))
        })?;

        let mut submission = self
            .load_submission(submission_id)
            .await?
            .ok_or_else(|| SubmissionError::NotFound("Submission not found".to_string()))?;

        // Terminal states are final; re-approving would duplicate the
        // published payload.
        if submission.status.is_terminal() {
            return Err(SubmissionError::Conflict(format!(
                "Submission already {}",
                match submission.status {
                    SubmissionStatus::Approved => "approved",
                    _ => "rejected",
                }
            )));
        }

        submission.status = match action {
            ReviewAction::Approve => SubmissionStatus::Approved,
            ReviewAction::Reject => SubmissionStatus::Rejected,
        };
        submission.reviewed_by = Some(admin.email.clone());
        submission.reviewed_at = Some(Utc::now());

        // (a) record first: a crash past this point leaves stale index
        // entries, never a published-but-unreviewed record.
        self.store_submission(&submission).await?;

        let lock = self.index_lock(&submission.content_type);
        let _guard = lock.lock().await;

        // (b) publish on approval
        if action == ReviewAction::Approve {
            let key = approved_key(&submission.content_type);
            let mut index: ApprovedIndex = match self.store().get(&key).await? {
                Some(value) => serde_json::from_value(value)?,
                None => ApprovedIndex::default(),
            };
            index.items.push(submission.data.clone());
            self.store().set(&key, serde_json::to_value(&index)?).await?;
        }

        // (c) de-index; absence is a no-op
        let key = pending_key(&submission.content_type);
        if let Some(value) = self.store().get(&key).await? {
            let mut index: PendingIndex = serde_json::from_value(value)?;
            let before = index.submissions.len();
            index.submissions.retain(|id| id != submission_id);
            if index.submissions.len() != before {
                self.store().set(&key, serde_json::to_value(&index)?).await?;
            }
        }

        info!(
            submission_id = %submission.id,
            status = ?submission.status,
            reviewed_by = %admin.email,
            "Submission reviewed"
        );
        Ok(submission)
    }

    // =========================================================================
    // ListApproved
    // =========================================================================

    /// Published payloads for a type. Public; unknown or never-approved
    /// types yield an empty list.
    pub async fn list_approved(&self, content_type: &str) -> Result<Vec<Value>, SubmissionError> {
        let key = approved_key(content_type);
        match self.store().get(&key).await? {
            Some(value) => {
                let index: ApprovedIndex = serde_json::from_value(value)?;
                Ok(index.items)
            }
            None => Ok(Vec::new()),
        }
    }

    // =========================================================================
    // Admin signup
    // =========================================================================

    /// Provision an admin account if the shared secret matches. Identity
    /// creation itself is delegated to the provider.
    pub async fn signup_admin(&self, signup: AdminSignup) -> Result<Identity, SubmissionError> {
        if signup.email.trim().is_empty()
            || signup.password.is_empty()
            || signup.name.trim().is_empty()
        {
            return Err(SubmissionError::Validation(
                "Missing required fields".to_string(),
            ));
        }
        if signup.admin_secret != self.deps.admin_secret {
            return Err(SubmissionError::Authorization(
                "Invalid admin secret".to_string(),
            ));
        }

        let identity = self
            .deps
            .identity
            .create_admin_user(&signup.email, &signup.password, &signup.name)
            .await?;

        info!(email = %identity.email, "Admin account provisioned");
        Ok(identity)
    }

    // =========================================================================
    // Repair
    // =========================================================================

    /// Rebuild every pending index from a scan of the stored submission
    /// records. Idempotent; run at startup to close the crash window
    /// between a review's record write and its index writes. Returns the
    /// number of pending records indexed.
    pub async fn rebuild_pending_indices(&self) -> Result<usize, SubmissionError> {
        let mut by_type: HashMap<String, Vec<Submission>> = HashMap::new();

        let keys = self.store().keys().await?;
        for key in &keys {
            if !key.starts_with("submission_") {
                continue;
            }
            let Some(submission) = self.load_submission(key).await? else {
                continue;
            };
            if submission.status == SubmissionStatus::Pending {
                by_type
                    .entry(submission.content_type.clone())
                    .or_default()
                    .push(submission);
            }
        }

        // Existing indices with no live pending records get rewritten
        // empty, dropping any stale entries they still carry.
        for key in &keys {
            if let Some(content_type) = key.strip_prefix("pending_") {
                by_type.entry(content_type.to_string()).or_default();
            }
        }

        let mut indexed = 0;
        for (content_type, mut pending) in by_type {
            // keys() has no ordering guarantee; restore submission order
            pending.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));

            let lock = self.index_lock(&content_type);
            let _guard = lock.lock().await;

            let index = PendingIndex {
                submissions: pending.into_iter().map(|s| s.id).collect(),
            };
            indexed += index.submissions.len();
            self.store()
                .set(&pending_key(&content_type), serde_json::to_value(&index)?)
                .await?;
        }

        Ok(indexed)
    }
}
