// tests/repository_tests.rs
//
// Runs against a real Postgres when TEST_DATABASE_URL is set, e.g.
// postgres://gzsurvey@localhost/gzsurvey_test. Without it every test returns early.

mod test_utils;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use gzsurvey_core::models::{
    AdminAuditLogEntry, AnswerValue, Answers, AuditAction, Completion, ProfileUpdate, Redemption,
    SurveyResponse, TicketStatus,
};
use gzsurvey_core::repositories::{
    PostgresAdminAuditLogRepository, PostgresAdminUserRepository, PostgresSurveyResponseRepository,
};
use gzsurvey_core::traits::{
    AdminAuditLogRepository, AdminUserRepository, SurveyResponseRepository,
};
use gzsurvey_core::Error;
use test_utils::{admin_user, setup_test_database};

fn completion(code: &str) -> Completion {
    let mut answers = Answers::new();
    answers.insert("overall_rating".into(), AnswerValue::Number(5.0));
    Completion {
        answers: Some(answers),
        reward_code: code.to_string(),
        completed_at: Utc::now(),
        brand: Some("Mendokoro".into()),
        branch: Some("Cebu".into()),
    }
}

#[tokio::test]
async fn test_survey_response_lifecycle() -> Result<(), Error> {
    let Some((db, _guard)) = setup_test_database().await? else {
        return Ok(());
    };
    let repo = PostgresSurveyResponseRepository::new(db.pool().clone());

    let open = SurveyResponse::new_open("MDKC-1", None, None);
    repo.create_response(&open).await?;

    // Second OPEN row for the same receipt hits the partial index.
    let dup = SurveyResponse::new_open("MDKC-1", None, None);
    assert!(matches!(repo.create_response(&dup).await, Err(Error::UniqueViolation(_))));

    assert_eq!(repo.find_open_by_receipt("MDKC-1").await?.map(|r| r.id), Some(open.id));
    assert!(repo.find_completed_by_receipt("MDKC-1").await?.is_none());

    assert!(repo.complete_response(open.id, &completion("GZ0123456789AB")).await?);
    // Already completed: no row matches.
    assert!(!repo.complete_response(open.id, &completion("GZ0123456789AC")).await?);

    let done = repo.get_response(open.id).await?.expect("row");
    assert_eq!(done.reward_code.as_deref(), Some("GZ0123456789AB"));
    assert_eq!(done.brand.as_deref(), Some("Mendokoro"));
    assert_eq!(done.answers["overall_rating"], AnswerValue::Number(5.0));

    // A new OPEN row is allowed next to the COMPLETED one, but it can never complete.
    let late = SurveyResponse::new_open("MDKC-1", None, None);
    repo.create_response(&late).await?;
    assert!(matches!(
        repo.complete_response(late.id, &completion("GZ0123456789AD")).await,
        Err(Error::UniqueViolation(_))
    ));

    let stamp = Redemption {
        claimed_at: Utc::now(),
        claimed_by: "validator@example.com".into(),
        claimed_branch: "Cebu".into(),
        claimed_brand: "Mendokoro".into(),
    };
    assert!(repo.mark_redeemed(open.id, &stamp).await?);
    assert!(!repo.mark_redeemed(open.id, &stamp).await?);
    assert!(!repo.mark_redeemed(late.id, &stamp).await?);

    assert!(repo.update_ticket_status(open.id, TicketStatus::Voc).await?);
    assert!(!repo.update_ticket_status(Uuid::new_v4(), TicketStatus::Voc).await?);
    assert_eq!(repo.get_response(open.id).await?.expect("row").ticket_status, TicketStatus::Voc);
    Ok(())
}

#[tokio::test]
async fn test_brand_branch_fill_only_touches_nulls() -> Result<(), Error> {
    let Some((db, _guard)) = setup_test_database().await? else {
        return Ok(());
    };
    let repo = PostgresSurveyResponseRepository::new(db.pool().clone());

    let row = SurveyResponse::new_open("YSKP-5", Some("Ramen Yushoken".into()), None);
    repo.create_response(&row).await?;

    let missing = repo.list_missing_brand_branch().await?;
    assert_eq!(missing.iter().map(|r| r.id).collect::<Vec<_>>(), vec![row.id]);

    assert!(repo.fill_brand_branch(row.id, None, Some("Pasay")).await?);
    let filled = repo.get_response(row.id).await?.expect("row");
    assert_eq!(filled.brand.as_deref(), Some("Ramen Yushoken"));
    assert_eq!(filled.branch.as_deref(), Some("Pasay"));
    assert!(repo.list_missing_brand_branch().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_users_and_audit_log() -> Result<(), Error> {
    let Some((db, _guard)) = setup_test_database().await? else {
        return Ok(());
    };
    let admins = PostgresAdminUserRepository::new(db.pool().clone());
    let audit = PostgresAdminAuditLogRepository::new(db.pool().clone());

    let admin = admin_user();
    sqlx::query(
        "INSERT INTO admin_users (id, email, password_hash, brand, branch, role, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(admin.id)
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(&admin.brand)
    .bind(&admin.branch)
    .bind(&admin.role)
    .bind(admin.is_active)
    .execute(db.pool())
    .await?;

    let found = admins
        .get_by_email(&admin.email.to_uppercase())
        .await?
        .expect("case-insensitive lookup");
    assert_eq!(found.id, admin.id);

    admins.update_password_hash(admin.id, "$argon2id$v=19$new").await?;
    let updated = admins
        .update_profile(
            admin.id,
            &ProfileUpdate { display_name: Some("Ana".into()), profile_pic: None },
        )
        .await?
        .expect("row");
    assert_eq!(updated.display_name.as_deref(), Some("Ana"));
    assert_eq!(updated.password_hash, "$argon2id$v=19$new");

    for action in [AuditAction::Login, AuditAction::Logout] {
        audit
            .insert_entry(&AdminAuditLogEntry::new(
                Some(admin.id),
                action,
                None,
                Some(json!({ "email": admin.email })),
            ))
            .await?;
    }
    let entries = audit.list_for_admin(admin.id, 10).await?;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.resource_type == "session"));

    // Append-only.
    let res = sqlx::query("DELETE FROM admin_audit_log").execute(db.pool()).await;
    assert!(res.is_err());
    Ok(())
}
