/// Integration tests for project, task, team, and note authorization
///
/// Exercises the manager/member/author rule set end-to-end: masked
/// denials, the member/manager split on tasks, completion attribution,
/// and list consistency on delete. Requires DATABASE_URL; tests skip when
/// it is not set.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use uuid::Uuid;

/// Seeds a manager with a project, plus a team member and an outsider.
/// Returns (ctx, manager session, member session, outsider session,
/// project id).
async fn project_fixture() -> Option<(TestContext, String, String, String, Uuid)> {
    let ctx = TestContext::new().await?;

    let manager = ctx
        .seed_user(&TestContext::unique_email("manager"), "manager-pass-1", true)
        .await;
    let member = ctx
        .seed_user(&TestContext::unique_email("member"), "member-pass-1", true)
        .await;
    let outsider = ctx
        .seed_user(&TestContext::unique_email("outsider"), "outsider-pass-1", true)
        .await;

    let manager_session = ctx.session_for(manager.id);
    let member_session = ctx.session_for(member.id);
    let outsider_session = ctx.session_for(outsider.id);

    let (status, body) = ctx
        .request(
            "POST",
            "/api/projects",
            Some(&manager_session),
            Some(json!({
                "project_name": "Billing rewrite",
                "client_name": "Acme",
                "description": "Replace the legacy billing stack",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let project_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/api/projects/{}/team", project_id),
            Some(&manager_session),
            Some(json!({ "id": member.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    Some((
        ctx,
        manager_session,
        member_session,
        outsider_session,
        project_id,
    ))
}

/// Creates a task as the manager and returns its id.
async fn create_task(ctx: &TestContext, session: &str, project_id: Uuid, name: &str) -> Uuid {
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/api/projects/{}/tasks", project_id),
            Some(session),
            Some(json!({ "name": name, "description": "integration fixture" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_project_visibility_and_masking() {
    let Some((ctx, manager, member, outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let uri = format!("/api/projects/{}", project_id);

    // Manager and member can read
    let (status, _) = ctx.request("GET", &uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.request("GET", &uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);

    // An outsider sees the same 404 as a missing project
    let (status, _) = ctx.request("GET", &uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/api/projects/{}", Uuid::new_v4()),
            Some(&outsider),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing is filtered per account
    let (_, body) = ctx.request("GET", "/api/projects", Some(&member), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = ctx
        .request("GET", "/api/projects", Some(&outsider), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_project_update_is_manager_only() {
    let Some((ctx, manager, member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let uri = format!("/api/projects/{}", project_id);
    let update = json!({
        "project_name": "Billing rewrite v2",
        "client_name": "Acme Corp",
        "description": "Scope grew",
    });

    // A team member's update is denied as absence
    let (status, _) = ctx
        .request("PUT", &uri, Some(&member), Some(update.clone()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The manager's identical request succeeds and persists
    let (status, body) = ctx.request("PUT", &uri, Some(&manager), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_name"], "Billing rewrite v2");

    let (_, body) = ctx.request("GET", &uri, Some(&manager), None).await;
    assert_eq!(body["project_name"], "Billing rewrite v2");
    assert_eq!(body["client_name"], "Acme Corp");
}

#[tokio::test]
async fn test_task_mutation_is_manager_only_reads_are_member() {
    let Some((ctx, manager, member, outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let tasks_uri = format!("/api/projects/{}/tasks", project_id);
    let payload = json!({ "name": "Draft schema", "description": "First pass" });

    // Member may not create tasks, regardless of team membership
    let (status, _) = ctx
        .request("POST", &tasks_uri, Some(&member), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let task_id = create_task(&ctx, &manager, project_id, "Draft schema").await;
    let task_uri = format!("/api/projects/{}/tasks/{}", project_id, task_id);

    // Member reads are allowed; outsiders are masked out
    let (status, _) = ctx.request("GET", &tasks_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.request("GET", &task_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.request("GET", &task_uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Member update/delete/status are denied
    let (status, _) = ctx
        .request("PUT", &task_uri, Some(&member), Some(payload))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx
        .request(
            "POST",
            &format!("{}/status", task_uri),
            Some(&member),
            Some(json!({ "status": "inProgress" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx.request("DELETE", &task_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_attribution_set_and_cleared() {
    let Some((ctx, manager, _member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let task_id = create_task(&ctx, &manager, project_id, "Ship it").await;
    let status_uri = format!("/api/projects/{}/tasks/{}/status", project_id, task_id);

    // Completing records the actor
    let (status, body) = ctx
        .request(
            "POST",
            &status_uri,
            Some(&manager),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["completed_by"].is_string());

    // Back to pending clears the attribution
    let (status, body) = ctx
        .request(
            "POST",
            &status_uri,
            Some(&manager),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(body["completed_by"].is_null());
}

#[tokio::test]
async fn test_task_delete_leaves_project_list_consistent() {
    let Some((ctx, manager, _member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let keep = create_task(&ctx, &manager, project_id, "Keep me").await;
    let doomed = create_task(&ctx, &manager, project_id, "Drop me").await;

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/projects/{}/tasks/{}", project_id, doomed),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = ctx
        .request(
            "GET",
            &format!("/api/projects/{}", project_id),
            Some(&manager),
            None,
        )
        .await;
    let ids: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&keep.to_string().as_str()));
    assert!(!ids.contains(&doomed.to_string().as_str()));
}

#[tokio::test]
async fn test_cross_project_task_access_is_rejected() {
    let Some((ctx, manager, _member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let task_id = create_task(&ctx, &manager, project_id, "Homebound").await;

    // A second project managed by the same account
    let (_, body) = ctx
        .request(
            "POST",
            "/api/projects",
            Some(&manager),
            Some(json!({
                "project_name": "Other project",
                "client_name": "Acme",
                "description": "Unrelated",
            })),
        )
        .await;
    let other_project: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    // Addressing the task under the wrong project is a consistency error
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/api/projects/{}/tasks/{}", other_project, task_id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_team_membership_conflicts() {
    let Some((ctx, manager, member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let team_uri = format!("/api/projects/{}/team", project_id);

    // The fixture member is already on the team
    let (_, body) = ctx.request("GET", &team_uri, Some(&member), None).await;
    let member_id = body.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "POST",
            &team_uri,
            Some(&manager),
            Some(json!({ "id": member_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Team mutation is manager-only
    let (status, _) = ctx
        .request(
            "POST",
            &team_uri,
            Some(&member),
            Some(json!({ "id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Removing someone who is not on the team conflicts
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("{}/{}", team_uri, Uuid::new_v4()),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Removal works and the list shrinks
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("{}/{}", team_uri, member_id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = ctx.request("GET", &team_uri, Some(&manager), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_note_deletion_is_author_only() {
    let Some((ctx, manager, member, _outsider, project_id)) = project_fixture().await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let task_id = create_task(&ctx, &manager, project_id, "Discussed").await;
    let notes_uri = format!("/api/projects/{}/tasks/{}/notes", project_id, task_id);

    // Any member may write a note
    let (status, body) = ctx
        .request(
            "POST",
            &notes_uri,
            Some(&member),
            Some(json!({ "content": "Client confirmed the deadline" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let note_id = body["id"].as_str().unwrap().to_string();
    let note_uri = format!("{}/{}", notes_uri, note_id);

    // Even the manager may not delete someone else's note — and the
    // denial is open (401), not masked
    let (status, _) = ctx.request("DELETE", &note_uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The author may
    let (status, _) = ctx.request("DELETE", &note_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);

    // And the task's note list is consistent
    let (_, body) = ctx.request("GET", &notes_uri, Some(&member), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
