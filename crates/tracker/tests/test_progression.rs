use chrono::Utc;
use domain::{DeliverableKind, DomainError, Project, Role, Stage};
use std::sync::Arc;
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

async fn paper_project(service: &TrackerService, owner: &Session) -> Project {
    let projects = service
        .create_project(owner, "Thesis", "desc")
        .await
        .expect("create failed");
    projects
        .into_iter()
        .find(|p| p.kind == DeliverableKind::Paper)
        .expect("paper sibling")
}

async fn complete_active_stage(service: &TrackerService, session: &Session, project: &Project) {
    let checklist = service
        .stage_checklist(session, &project.id)
        .await
        .expect("checklist failed");
    for item in &checklist.items {
        service
            .toggle_task(session, &item.task.id, true)
            .await
            .expect("toggle failed");
    }
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let (_dir, service) = setup().await;
    let project = paper_project(&service, &Session::new("u1")).await;

    let first = service
        .seed_tasks_if_empty(&project.id, Stage::Overview)
        .await
        .expect("seed failed");
    let second = service
        .seed_tasks_if_empty(&project.id, Stage::Overview)
        .await
        .expect("seed failed");

    let expected = domain::tasks_for(DeliverableKind::Paper, Stage::Overview).len();
    assert_eq!(first, expected);
    assert_eq!(second, 0);
    let tasks = service
        .store()
        .tasks_for_stage(&project.id, Stage::Overview)
        .await
        .expect("tasks failed");
    assert_eq!(tasks.len(), expected);
    assert!(tasks.iter().all(|t| t.assignee_id == "u1" && !t.is_completed()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_views_seed_once() {
    let (_dir, service) = setup().await;
    let service = Arc::new(service);
    let project = paper_project(&service, &Session::new("u1")).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = service.clone();
            let id = project.id;
            tokio::spawn(async move { svc.seed_tasks_if_empty(&id, Stage::Research).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        inserted += handle.await.expect("task panicked").expect("seed failed");
    }

    let expected = domain::tasks_for(DeliverableKind::Paper, Stage::Research).len();
    assert_eq!(inserted, expected);
    let tasks = service
        .store()
        .tasks_for_stage(&project.id, Stage::Research)
        .await
        .expect("tasks failed");
    assert_eq!(tasks.len(), expected);
}

#[tokio::test]
async fn test_seeding_rejects_foreign_stage() {
    let (_dir, service) = setup().await;
    let project = paper_project(&service, &Session::new("u1")).await;

    let err = service
        .seed_tasks_if_empty(&project.id, Stage::Demo)
        .await
        .expect_err("demo is not a paper stage");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::StageNotInSequence { .. })
    ));
}

#[tokio::test]
async fn test_paper_walks_to_final_stage() {
    let (_dir, service) = setup().await;
    let advisor = Session::new("prof");
    let project = paper_project(&service, &Session::new("u1")).await;
    assert_eq!(project.stage, Stage::Overview);

    complete_active_stage(&service, &advisor, &project).await;
    let advanced = service
        .advance_stage(&advisor, &project.id)
        .await
        .expect("advance failed");
    assert_eq!(advanced.stage, Stage::Research);

    let mut visited = vec![Stage::Overview, Stage::Research];
    for _ in 0..3 {
        complete_active_stage(&service, &advisor, &project).await;
        let advanced = service
            .advance_stage(&advisor, &project.id)
            .await
            .expect("advance failed");
        visited.push(advanced.stage);
    }
    assert_eq!(visited, DeliverableKind::Paper.stages());

    complete_active_stage(&service, &advisor, &project).await;
    let err = service
        .advance_stage(&advisor, &project.id)
        .await
        .expect_err("final stage has no successor");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::AlreadyAtFinalStage(Stage::Final))
    ));
    let stored = service.get_project(&project.id).await.expect("get failed");
    assert_eq!(stored.stage, Stage::Final);
}

#[tokio::test]
async fn test_advance_requires_advisor_and_complete_stage() {
    let (_dir, service) = setup().await;
    let owner = Session::new("u1");
    let advisor = Session::new("prof");
    let project = paper_project(&service, &owner).await;

    service
        .stage_checklist(&owner, &project.id)
        .await
        .expect("checklist failed");
    let err = service
        .advance_stage(&advisor, &project.id)
        .await
        .expect_err("stage still open");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::StageIncomplete { remaining: 3, .. })
    ));

    complete_active_stage(&service, &owner, &project).await;
    let err = service
        .advance_stage(&owner, &project.id)
        .await
        .expect_err("students cannot advance");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::NotAuthorized { .. })
    ));

    let stored = service.get_project(&project.id).await.expect("get failed");
    assert_eq!(stored.stage, Stage::Overview);
}

#[tokio::test]
async fn test_advance_seeds_a_never_viewed_stage() {
    let (_dir, service) = setup().await;
    let advisor = Session::new("prof");
    let project = paper_project(&service, &Session::new("u1")).await;

    let err = service
        .advance_stage(&advisor, &project.id)
        .await
        .expect_err("overview checklist is untouched");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::StageIncomplete {
            stage: Stage::Overview,
            remaining: 3,
        })
    ));

    let stored = service.get_project(&project.id).await.expect("get failed");
    assert_eq!(stored.stage, Stage::Overview);
    let tasks = service
        .store()
        .tasks_for_stage(&project.id, Stage::Overview)
        .await
        .expect("tasks failed");
    assert_eq!(tasks.len(), 3);
}

#[tokio::test]
async fn test_review_request_on_a_new_project() {
    let (_dir, service) = setup().await;
    let owner = Session::new("u1");
    let project = paper_project(&service, &owner).await;

    let err = service
        .request_review(&owner, &project.id)
        .await
        .expect_err("overview checklist is untouched");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::StageIncomplete {
            stage: Stage::Overview,
            ..
        })
    ));

    let stored = service.get_project(&project.id).await.expect("get failed");
    assert_eq!(stored.status, domain::ProjectStatus::Draft);
}

#[tokio::test]
async fn test_late_subscriber_sees_only_new_events() {
    let (_dir, service) = setup().await;
    let owner = Session::new("u1");

    for i in 0..(tracker::EVENT_CHANNEL_CAPACITY + 10) {
        service
            .post_update(&owner, &format!("week {i}"))
            .await
            .expect("post failed");
    }

    let mut events = service.subscribe();
    assert!(events.try_next().is_none());

    paper_project(&service, &owner).await;
    let received: Vec<_> = std::iter::from_fn(|| events.try_next()).collect();
    assert_eq!(received.len(), 1);
    assert!(matches!(received[0], TrackerEvent::ProjectCreated { .. }));
}

#[tokio::test]
async fn test_toggle_is_limited_to_active_stage() {
    let (_dir, service) = setup().await;
    let advisor = Session::new("prof");
    let project = paper_project(&service, &Session::new("u1")).await;

    let overview = service
        .stage_checklist(&advisor, &project.id)
        .await
        .expect("checklist failed");
    complete_active_stage(&service, &advisor, &project).await;
    service
        .advance_stage(&advisor, &project.id)
        .await
        .expect("advance failed");

    let err = service
        .toggle_task(&advisor, &overview.items[0].task.id, false)
        .await
        .expect_err("overview is no longer active");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::StageNotActive {
            task_stage: Stage::Overview,
            active_stage: Stage::Research,
        })
    ));
}

#[tokio::test]
async fn test_locked_items_need_the_required_role() {
    let (_dir, service) = setup().await;
    let owner = Session::new("u1");
    let advisor = Session::new("prof");
    let project = paper_project(&service, &owner).await;

    for _ in 0..4 {
        complete_active_stage(&service, &advisor, &project).await;
        service
            .advance_stage(&advisor, &project.id)
            .await
            .expect("advance failed");
    }

    let checklist = service
        .stage_checklist(&owner, &project.id)
        .await
        .expect("checklist failed");
    assert_eq!(checklist.stage, Stage::Final);
    let submit = checklist
        .items
        .iter()
        .find(|i| i.task.title == "Submit Paper")
        .expect("submit item");
    assert!(submit.locked);
    assert!(checklist.items.iter().filter(|i| i.locked).count() == 1);

    let err = service
        .toggle_task(&owner, &submit.task.id, true)
        .await
        .expect_err("students cannot submit");
    assert!(matches!(
        err,
        TrackerError::Domain(DomainError::RoleTooLow {
            required: Role::Advisor,
            actual: Role::Student,
        })
    ));

    let task = service
        .toggle_task(&advisor, &submit.task.id, true)
        .await
        .expect("advisor toggle failed");
    assert!(task.is_completed());
}

#[tokio::test]
async fn test_progression_events() {
    let (_dir, service) = setup().await;
    let advisor = Session::new("prof");
    let mut events = service.subscribe();
    let project = paper_project(&service, &Session::new("u1")).await;

    complete_active_stage(&service, &advisor, &project).await;
    service
        .advance_stage(&advisor, &project.id)
        .await
        .expect("advance failed");

    let received: Vec<_> = std::iter::from_fn(|| events.try_next()).collect();
    assert!(matches!(received[0], TrackerEvent::ProjectCreated { .. }));
    assert!(received.iter().any(|e| matches!(
        e,
        TrackerEvent::TasksSeeded {
            stage: Stage::Overview,
            count: 3,
            ..
        }
    )));
    assert_eq!(
        received
            .iter()
            .filter(|e| matches!(e, TrackerEvent::TaskToggled { completed: true, .. }))
            .count(),
        3
    );
    assert!(matches!(
        received.last(),
        Some(TrackerEvent::StageAdvanced {
            from: Stage::Overview,
            to: Stage::Research,
            ..
        })
    ));
}
