use chrono::Utc;
use domain::{DomainError, Role};
use tempfile::TempDir;
use tracker::{FailureKind, Session, TrackerError, TrackerService};

async fn setup() -> (TempDir, TrackerService) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let service = TrackerService::new(temp_dir.path().join("test.db"), 4)
        .await
        .expect("failed to create TrackerService");
    (temp_dir, service)
}

#[tokio::test]
async fn test_unknown_user_is_student() {
    let (_dir, service) = setup().await;
    assert_eq!(service.resolve_role(&"nobody".to_string()).await, Role::Student);
}

#[tokio::test]
async fn test_sign_in_grants_default_role_once() {
    let (_dir, service) = setup().await;
    let session = Session::new("ada");

    let user = service
        .sign_in(&session, Some("Ada Lovelace"))
        .await
        .expect("sign in failed");
    assert_eq!(user.display_name, "Ada Lovelace");

    // A later grant must survive the next sign-in untouched
    service
        .store()
        .grant_role("ada", Role::Researcher, Utc::now())
        .await
        .expect("grant failed");
    let again = service.sign_in(&session, None).await.expect("sign in failed");

    assert_eq!(again.display_name, "Ada Lovelace");
    assert_eq!(again.created_at, user.created_at);
    let grants = service.role_grants("ada").await.expect("grants failed");
    assert_eq!(grants.len(), 2);
    assert_eq!(service.resolve_role(&"ada".to_string()).await, Role::Researcher);
}

#[tokio::test]
async fn test_configured_default_role() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let service = TrackerService::new(temp_dir.path().join("test.db"), 2)
        .await
        .expect("failed to create TrackerService")
        .with_default_role(Role::Researcher);

    service
        .sign_in(&Session::new("grace"), None)
        .await
        .expect("sign in failed");
    assert_eq!(
        service.resolve_role(&"grace".to_string()).await,
        Role::Researcher
    );
}

#[tokio::test]
async fn test_grant_role_requires_advisor() {
    let (_dir, service) = setup().await;
    let student = Session::new("student");
    let advisor = Session::new("advisor");
    service
        .store()
        .grant_role("advisor", Role::Advisor, Utc::now())
        .await
        .expect("bootstrap grant failed");

    let err = service
        .grant_role(&student, "student", Role::Advisor)
        .await
        .expect_err("students cannot grant roles");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::NotAuthorized { .. })
    ));
    assert_eq!(err.kind(), FailureKind::DomainRule);

    assert!(service
        .grant_role(&advisor, "student", Role::Researcher)
        .await
        .expect("grant failed"));
    assert!(!service
        .grant_role(&advisor, "student", Role::Researcher)
        .await
        .expect("regrant failed"));
    assert_eq!(
        service.resolve_role(&"student".to_string()).await,
        Role::Researcher
    );
}

#[tokio::test]
async fn test_highest_grant_wins() {
    let (_dir, service) = setup().await;
    let now = Utc::now();
    for role in [Role::Researcher, Role::Advisor, Role::Student] {
        service
            .store()
            .grant_role("u1", role, now)
            .await
            .expect("grant failed");
    }
    assert_eq!(service.resolve_role(&"u1".to_string()).await, Role::Advisor);
}
