mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ats_client::dto::candidate_dto::{CandidateQuery, CreateCandidatePayload};
use ats_client::error::Error;
use ats_client::models::job::JobStatus;
use ats_client::services::preferences_service::PreferencesStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Default)]
struct Backend {
    jobs: Vec<Value>,
    candidates: Vec<Value>,
    archived: Vec<Uuid>,
    last_job_query: HashMap<String, String>,
}

type Shared = Arc<Mutex<Backend>>;

fn job(id: Uuid, title: &str, department_id: Uuid) -> Value {
    json!({"id": id, "title": title, "status": "Published", "department_id": department_id})
}

async fn list_jobs(
    State(b): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut backend = b.lock().unwrap();
    backend.last_job_query = params.clone();
    let jobs: Vec<Value> = backend
        .jobs
        .iter()
        .filter(|j| {
            params
                .get("department_id")
                .map_or(true, |d| j["department_id"].as_str() == Some(d.as_str()))
        })
        .cloned()
        .collect();
    Json(Value::Array(jobs))
}

async fn clone_job(
    State(b): State<Shared>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    let mut backend = b.lock().unwrap();
    let source = backend
        .jobs
        .iter()
        .find(|j| j["id"] == json!(id))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    let mut copy = source;
    copy["id"] = json!(Uuid::new_v4());
    copy["title"] = json!(format!("{} (Copy)", copy["title"].as_str().unwrap_or_default()));
    copy["status"] = json!("Draft");
    backend.jobs.push(copy.clone());
    Ok(Json(copy))
}

async fn archive_job(State(b): State<Shared>, Path(id): Path<Uuid>) -> StatusCode {
    b.lock().unwrap().archived.push(id);
    StatusCode::NO_CONTENT
}

async fn list_candidates(
    State(b): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let backend = b.lock().unwrap();
    let search = params.get("search").map(|s| s.to_lowercase());
    let hits: Vec<Value> = backend
        .candidates
        .iter()
        .filter(|c| {
            search.as_ref().map_or(true, |q| {
                c["first_name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(q)
            })
        })
        .cloned()
        .collect();
    Json(Value::Array(hits))
}

async fn create_candidate(State(b): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut created = body;
    created["id"] = json!(Uuid::new_v4());
    b.lock().unwrap().candidates.push(created.clone());
    Json(created)
}

async fn setup() -> (String, Shared, Uuid, Uuid) {
    let engineering = Uuid::new_v4();
    let source_job = Uuid::new_v4();
    let backend = Arc::new(Mutex::new(Backend {
        jobs: vec![
            job(source_job, "Backend Engineer", engineering),
            job(Uuid::new_v4(), "Account Executive", Uuid::new_v4()),
        ],
        ..Default::default()
    }));
    let router = Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/:id", axum::routing::delete(archive_job))
        .route("/api/jobs/:id/clone", post(clone_job))
        .route(
            "/api/candidates/",
            get(list_candidates).post(create_candidate),
        )
        .with_state(backend.clone());
    (common::spawn_backend(router).await, backend, engineering, source_job)
}

#[tokio::test]
async fn jobs_filter_clone_and_archive() {
    let (base, backend, engineering, source_job) = setup().await;
    let state = common::app_state(&base, Some("token"));

    let all = state.job_service.list_jobs(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(backend.lock().unwrap().last_job_query.is_empty());

    let filtered = state.job_service.list_jobs(Some(engineering)).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Backend Engineer");

    let copy = state.job_service.clone_job(source_job).await.unwrap();
    assert_eq!(copy.title, "Backend Engineer (Copy)");
    assert_eq!(copy.status, JobStatus::Draft);

    state.job_service.archive_job(source_job).await.unwrap();
    assert_eq!(backend.lock().unwrap().archived, vec![source_job]);

    let missing = state.job_service.clone_job(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing, Error::NotFound(_)));
}

#[tokio::test]
async fn candidates_are_validated_then_created() {
    let (base, _, _, _) = setup().await;
    let state = common::app_state(&base, Some("token"));

    let invalid = CreateCandidatePayload {
        first_name: "Lola".into(),
        last_name: "Pérez".into(),
        email: "lola-at-example".into(),
        ..Default::default()
    };
    let err = state
        .candidate_service
        .create_candidate(&invalid)
        .await
        .unwrap_err();
    assert_eq!(err.inline_message(), "email: Enter a valid email address");

    let payload = CreateCandidatePayload {
        email: "lola@example.com".into(),
        skills: vec!["rust".into(), "sql".into()],
        experience_years: 4.5,
        ..invalid
    };
    let created = state
        .candidate_service
        .create_candidate(&payload)
        .await
        .unwrap();
    assert_eq!(created.full_name(), "Lola Pérez");

    let query = CandidateQuery {
        search: Some("lol".into()),
        ..Default::default()
    };
    let found = state.candidate_service.list_candidates(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].skills, vec!["rust", "sql"]);
}

#[tokio::test]
async fn logout_forgets_token_and_preferences() {
    let (base, _, _, _) = setup().await;
    let state = common::app_state(&base, Some("token"));
    let path = std::env::temp_dir()
        .join(format!("ats-logout-{}", Uuid::new_v4()))
        .join("prefs.json");

    let mut prefs = PreferencesStore::load(&path).await.unwrap();
    prefs.mark_welcome_seen().await.unwrap();
    assert!(path.exists());

    state.logout(&mut prefs).await.unwrap();
    assert!(!state.api.has_token());
    assert!(prefs.should_show_welcome());
    assert!(!path.exists());
}
