//! Integration tests for the submission review state machine.

mod common;

use common::{TestHarness, ADMIN_EMAIL, ADMIN_TOKEN, USER_TOKEN};
use hub_core::common::pending_key;
use hub_core::domains::submissions::{
    AdminSignup, NewSubmission, SubmissionError, SubmissionStatus,
};
use hub_core::kernel::KvStore;
use serde_json::json;

fn cheatsheet(title: &str) -> NewSubmission {
    NewSubmission {
        content_type: "cheatsheet".to_string(),
        data: Some(json!({ "title": title })),
        submitted_by: Some("Alice".to_string()),
    }
}

// =============================================================================
// Submit
// =============================================================================

#[tokio::test]
async fn submit_then_list_pending_round_trips() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("Selenium")).await.unwrap();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].content_type, "cheatsheet");
    assert_eq!(pending[0].data, json!({ "title": "Selenium" }));
    assert_eq!(pending[0].submitted_by, "Alice");
    assert_eq!(pending[0].status, SubmissionStatus::Pending);
    assert!(pending[0].reviewed_by.is_none());
}

#[tokio::test]
async fn submit_defaults_attribution_to_anonymous() {
    let ctx = TestHarness::new();

    let id = ctx
        .service
        .submit(NewSubmission {
            content_type: "template".to_string(),
            data: Some(json!({ "name": "bug report" })),
            submitted_by: None,
        })
        .await
        .unwrap();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].submitted_by, "Anonymous");
}

#[tokio::test]
async fn submit_rejects_missing_fields_without_side_effects() {
    let ctx = TestHarness::new();

    let missing_type = ctx
        .service
        .submit(NewSubmission {
            content_type: "".to_string(),
            data: Some(json!({ "title": "T" })),
            submitted_by: None,
        })
        .await;
    assert!(matches!(missing_type, Err(SubmissionError::Validation(_))));

    let missing_data = ctx
        .service
        .submit(NewSubmission {
            content_type: "cheatsheet".to_string(),
            data: None,
            submitted_by: None,
        })
        .await;
    assert!(matches!(missing_data, Err(SubmissionError::Validation(_))));

    // No record, no index write
    assert!(ctx.store.is_empty());
}

#[tokio::test]
async fn concurrent_submits_all_land_in_the_index() {
    let ctx = TestHarness::new();

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = ctx.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .submit(NewSubmission {
                    content_type: "testcase".to_string(),
                    data: Some(json!({ "n": i })),
                    submitted_by: None,
                })
                .await
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    // The per-type lock means no submit can overwrite another's append
    let index = ctx
        .store
        .get(&pending_key("testcase"))
        .await
        .unwrap()
        .unwrap();
    let listed = index["submissions"].as_array().unwrap();
    assert_eq!(listed.len(), 10);
    for id in &ids {
        assert!(listed.iter().any(|v| v.as_str() == Some(id.as_str())));
    }
}

#[tokio::test]
async fn submit_surfaces_store_failures() {
    let ctx = TestHarness::new();

    ctx.store.fail_next_write();
    let result = ctx.service.submit(cheatsheet("T")).await;
    assert!(matches!(result, Err(SubmissionError::Store(_))));
}

// =============================================================================
// ListPending
// =============================================================================

#[tokio::test]
async fn list_pending_requires_authentication() {
    let ctx = TestHarness::new();

    let no_token = ctx.service.list_pending(None).await;
    assert!(matches!(no_token, Err(SubmissionError::Authentication(_))));

    let bad_token = ctx.service.list_pending(Some("garbage")).await;
    assert!(matches!(bad_token, Err(SubmissionError::Authentication(_))));
}

#[tokio::test]
async fn list_pending_requires_the_admin_flag() {
    let ctx = TestHarness::new();

    let result = ctx.service.list_pending(Some(USER_TOKEN)).await;
    assert!(matches!(result, Err(SubmissionError::Authorization(_))));
}

#[tokio::test]
async fn list_pending_is_empty_not_an_error() {
    let ctx = TestHarness::new();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn list_pending_orders_by_type_then_insertion() {
    let ctx = TestHarness::new();

    // Submitted out of scan order on purpose
    let template_id = ctx
        .service
        .submit(NewSubmission {
            content_type: "template".to_string(),
            data: Some(json!({ "t": 1 })),
            submitted_by: None,
        })
        .await
        .unwrap();
    let first_sheet = ctx.service.submit(cheatsheet("A")).await.unwrap();
    let second_sheet = ctx.service.submit(cheatsheet("B")).await.unwrap();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    let ids: Vec<String> = pending.iter().map(|s| s.id.clone()).collect();
    // cheatsheet scans before template; insertion order within the type
    assert_eq!(ids, vec![first_sheet, second_sheet, template_id]);
}

#[tokio::test]
async fn list_pending_filters_stale_index_entries() {
    let ctx = TestHarness::new();

    let keep = ctx.service.submit(cheatsheet("keep")).await.unwrap();
    let reviewed = ctx.service.submit(cheatsheet("reviewed")).await.unwrap();
    ctx.service
        .review(Some(ADMIN_TOKEN), &reviewed, "approve")
        .await
        .unwrap();

    // Simulate the crash window: put the reviewed id back into the index
    let key = pending_key("cheatsheet");
    let mut index = ctx.store.get(&key).await.unwrap().unwrap();
    index["submissions"]
        .as_array_mut()
        .unwrap()
        .push(json!(reviewed));
    ctx.store.set(&key, index).await.unwrap();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, keep);
}

#[tokio::test]
async fn list_pending_skips_dangling_ids() {
    let ctx = TestHarness::new();

    ctx.store
        .set(
            &pending_key("cheatsheet"),
            json!({ "submissions": ["submission_cheatsheet_404"] }),
        )
        .await
        .unwrap();

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert!(pending.is_empty());
}

// =============================================================================
// Review
// =============================================================================

#[tokio::test]
async fn approve_publishes_exactly_once() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();
    let reviewed = ctx
        .service
        .review(Some(ADMIN_TOKEN), &id, "approve")
        .await
        .unwrap();

    assert_eq!(reviewed.status, SubmissionStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some(ADMIN_EMAIL));
    assert!(reviewed.reviewed_at.is_some());

    let items = ctx.service.list_approved("cheatsheet").await.unwrap();
    assert_eq!(items, vec![json!({ "title": "T" })]);

    // De-indexed: queue is empty again
    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn reject_does_not_publish() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();
    let reviewed = ctx
        .service
        .review(Some(ADMIN_TOKEN), &id, "reject")
        .await
        .unwrap();

    assert_eq!(reviewed.status, SubmissionStatus::Rejected);
    let items = ctx.service.list_approved("cheatsheet").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn double_review_is_a_conflict() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();
    ctx.service
        .review(Some(ADMIN_TOKEN), &id, "approve")
        .await
        .unwrap();

    // A retry cannot flip the status again or double-publish
    let again = ctx.service.review(Some(ADMIN_TOKEN), &id, "approve").await;
    assert!(matches!(again, Err(SubmissionError::Conflict(_))));

    let items = ctx.service.list_approved("cheatsheet").await.unwrap();
    assert_eq!(items.len(), 1);

    // Rejected records are just as final
    let reject_after = ctx.service.review(Some(ADMIN_TOKEN), &id, "reject").await;
    assert!(matches!(reject_after, Err(SubmissionError::Conflict(_))));
}

#[tokio::test]
async fn review_validates_the_action_literal() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();
    let result = ctx.service.review(Some(ADMIN_TOKEN), &id, "publish").await;
    assert!(matches!(result, Err(SubmissionError::Validation(_))));

    // Record untouched
    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn review_of_unknown_id_is_not_found() {
    let ctx = TestHarness::new();

    let result = ctx
        .service
        .review(Some(ADMIN_TOKEN), "submission_cheatsheet_404", "approve")
        .await;
    assert!(matches!(result, Err(SubmissionError::NotFound(_))));
}

#[tokio::test]
async fn review_requires_admin() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();

    let no_token = ctx.service.review(None, &id, "approve").await;
    assert!(matches!(no_token, Err(SubmissionError::Authentication(_))));

    let non_admin = ctx.service.review(Some(USER_TOKEN), &id, "approve").await;
    assert!(matches!(non_admin, Err(SubmissionError::Authorization(_))));

    // Gate failures leave the record pending
    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 1);
}

// =============================================================================
// ListApproved
// =============================================================================

#[tokio::test]
async fn list_approved_tolerates_unknown_types() {
    let ctx = TestHarness::new();

    let items = ctx
        .service
        .list_approved("nonexistent-type")
        .await
        .unwrap();
    assert!(items.is_empty());
}

// =============================================================================
// Admin signup
// =============================================================================

#[tokio::test]
async fn signup_rejects_a_bad_secret() {
    let ctx = TestHarness::new();

    let result = ctx
        .service
        .signup_admin(AdminSignup {
            email: "new@example.org".to_string(),
            password: "hunter2!".to_string(),
            name: "New Admin".to_string(),
            admin_secret: "wrong".to_string(),
        })
        .await;

    assert!(matches!(result, Err(SubmissionError::Authorization(_))));
    assert!(ctx.identity.created_emails().is_empty());
}

#[tokio::test]
async fn signup_provisions_an_admin_identity() {
    let ctx = TestHarness::new();

    let user = ctx
        .service
        .signup_admin(AdminSignup {
            email: "new@example.org".to_string(),
            password: "hunter2!".to_string(),
            name: "New Admin".to_string(),
            admin_secret: common::ADMIN_SECRET.to_string(),
        })
        .await
        .unwrap();

    assert!(user.is_admin);
    assert_eq!(user.email, "new@example.org");
    assert_eq!(ctx.identity.created_emails(), vec!["new@example.org"]);
}

// =============================================================================
// Index repair
// =============================================================================

#[tokio::test]
async fn rebuild_restores_orphaned_pending_records() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("orphan")).await.unwrap();
    // Simulate the lost-append race: the index write never landed
    ctx.store
        .set(&pending_key("cheatsheet"), json!({ "submissions": [] }))
        .await
        .unwrap();
    assert!(ctx
        .service
        .list_pending(Some(ADMIN_TOKEN))
        .await
        .unwrap()
        .is_empty());

    let indexed = ctx.service.rebuild_pending_indices().await.unwrap();
    assert_eq!(indexed, 1);

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
}

#[tokio::test]
async fn rebuild_drops_stale_index_entries() {
    let ctx = TestHarness::new();

    let id = ctx.service.submit(cheatsheet("T")).await.unwrap();
    ctx.service
        .review(Some(ADMIN_TOKEN), &id, "reject")
        .await
        .unwrap();

    // Crash-window state: reviewed record still referenced by the index
    ctx.store
        .set(&pending_key("cheatsheet"), json!({ "submissions": [id] }))
        .await
        .unwrap();

    let indexed = ctx.service.rebuild_pending_indices().await.unwrap();
    assert_eq!(indexed, 0);

    let index = ctx
        .store
        .get(&pending_key("cheatsheet"))
        .await
        .unwrap()
        .unwrap();
    assert!(index["submissions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rebuild_is_idempotent() {
    let ctx = TestHarness::new();

    ctx.service.submit(cheatsheet("A")).await.unwrap();
    ctx.service.submit(cheatsheet("B")).await.unwrap();

    let first = ctx.service.rebuild_pending_indices().await.unwrap();
    let second = ctx.service.rebuild_pending_indices().await.unwrap();
    assert_eq!(first, 2);
    assert_eq!(second, 2);

    let pending = ctx.service.list_pending(Some(ADMIN_TOKEN)).await.unwrap();
    assert_eq!(pending.len(), 2);
}
