use chrono::Utc;
use domain::{AchievementKind, DomainError, Role, ACHIEVEMENT_CATALOG};
use tempfile::TempDir;
use tracker::{Session, TrackerError, TrackerEvent, TrackerService};

async fn setup() -> (TempDir, TrackerService) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let service = TrackerService::new(temp_dir.path().join("test.db"), 4)
        .await
        .expect("failed to create TrackerService");
    service
        .store()
        .grant_role("prof", Role::Advisor, Utc::now())
        .await
        .expect("bootstrap grant failed");
    (temp_dir, service)
}

#[tokio::test]
async fn test_listing_covers_the_whole_catalog() {
    let (_dir, service) = setup().await;

    for user in ["u1", "", "never-signed-in"] {
        let views = service.list_achievements(user).await.expect("list failed");
        assert_eq!(views.len(), ACHIEVEMENT_CATALOG.len());
        assert!(views.iter().all(|v| !v.is_unlocked()));
        assert!(views.windows(2).all(|w| w[0].points >= w[1].points));
    }
}

#[tokio::test]
async fn test_award_unlocks_once() {
    let (_dir, service) = setup().await;
    let advisor = Session::new("prof");
    let mut events = service.subscribe();

    assert!(service
        .award_achievement(&advisor, "u1", AchievementKind::BlogPosted)
        .await
        .expect("award failed"));
    let first = service.list_achievements("u1").await.expect("list failed");
    let earned_at = first
        .iter()
        .find(|v| v.kind == AchievementKind::BlogPosted)
        .and_then(|v| v.earned_at)
        .expect("blog badge unlocked");

    assert!(!service
        .award_achievement(&advisor, "u1", AchievementKind::BlogPosted)
        .await
        .expect("award failed"));
    let second = service.list_achievements("u1").await.expect("list failed");
    assert_eq!(second.len(), ACHIEVEMENT_CATALOG.len());
    assert_eq!(second.iter().filter(|v| v.is_unlocked()).count(), 1);
    assert_eq!(
        second
            .iter()
            .find(|v| v.kind == AchievementKind::BlogPosted)
            .and_then(|v| v.earned_at),
        Some(earned_at)
    );
    assert_eq!(domain::total_points(&second), 80);

    let received: Vec<_> = std::iter::from_fn(|| events.try_next()).collect();
    assert_eq!(
        received,
        vec![TrackerEvent::AchievementAwarded {
            user_id: "u1".into(),
            kind: AchievementKind::BlogPosted,
        }]
    );

    let other = service.list_achievements("u2").await.expect("list failed");
    assert!(other.iter().all(|v| !v.is_unlocked()));
}

#[tokio::test]
async fn test_award_requires_advisor() {
    let (_dir, service) = setup().await;
    let err = service
        .award_achievement(&Session::new("u1"), "u1", AchievementKind::BestPaper)
        .await
        .expect_err("students cannot award themselves");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::NotAuthorized { .. })
    ));
    let views = service.list_achievements("u1").await.expect("list failed");
    assert!(views.iter().all(|v| !v.is_unlocked()));
}
