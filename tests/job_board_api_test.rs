mod common;

use std::sync::{Arc, Mutex};

use ats_client::error::Error;
use ats_client::models::job::{JobStatus, PipelineStage};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

struct JobBackend {
    job_id: Uuid,
    status: String,
    pipeline: Value,
    stages: Vec<(Uuid, String)>,
    stage_requests: Vec<Value>,
}

type Shared = Arc<Mutex<JobBackend>>;

fn job_body(backend: &JobBackend) -> Value {
    json!({
        "id": backend.job_id,
        "title": "Backend Engineer",
        "job_code": "ENG-42",
        "status": backend.status,
        "headcount": 2,
        "min_salary": 4000,
        "max_salary": 6500.5,
        "pipeline_config": backend.pipeline,
        "activities": [
            {"id": "a1", "action_type": "CREATED", "details": {"title": "Backend Engineer"},
             "timestamp": "2024-01-05T15:07:00"},
            {"id": "a2", "action_type": "UPDATED",
             "details": {"status": {"old": "Draft", "new": "Published"},
                         "max_salary": {"old": 6000, "new": 6500.5}},
             "timestamp": "2024-01-06T10:00:00"},
            {"id": "a3", "action_type": "PIPELINE_UPDATED", "details": null,
             "timestamp": "2024-01-07T08:15:00"}
        ],
        "created_at": "2024-01-05T15:07:00"
    })
}

async fn get_job(State(backend): State<Shared>) -> Json<Value> {
    Json(job_body(&backend.lock().unwrap()))
}

async fn update_job(State(backend): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut backend = backend.lock().unwrap();
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        backend.status = status.to_string();
    }
    Json(job_body(&backend))
}

async fn job_candidates(State(backend): State<Shared>) -> Json<Value> {
    let backend = backend.lock().unwrap();
    let apps: Vec<Value> = backend
        .stages
        .iter()
        .map(|(candidate_id, stage)| {
            json!({
                "id": Uuid::new_v4(),
                "job_id": backend.job_id,
                "candidate_id": candidate_id,
                "current_stage": stage,
                "applied_at": "2024-01-10T12:00:00",
                "candidate": {
                    "id": candidate_id,
                    "first_name": "Kim",
                    "last_name": "Lee",
                    "email": format!("{}@example.com", candidate_id)
                }
            })
        })
        .collect();
    Json(Value::Array(apps))
}

async fn update_stage(
    State(backend): State<Shared>,
    Path((_job_id, candidate_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut backend = backend.lock().unwrap();
    backend.stage_requests.push(body.clone());
    let stage = body["stage"].as_str().unwrap_or_default().to_string();
    if stage == "hired" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Candidate must receive an offer first"})),
        ));
    }
    for (id, current) in backend.stages.iter_mut() {
        if *id == candidate_id {
            *current = stage.clone();
        }
    }
    Ok(Json(json!({
        "message": "Stage updated",
        "application_id": Uuid::new_v4().to_string(),
        "current_stage": stage
    })))
}

async fn update_pipeline(State(backend): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut backend = backend.lock().unwrap();
    backend.pipeline = body;
    Json(job_body(&backend))
}

async fn setup(stages: Vec<(Uuid, &str)>) -> (String, Shared, Uuid) {
    let job_id = Uuid::new_v4();
    let backend = Arc::new(Mutex::new(JobBackend {
        job_id,
        status: "Draft".into(),
        pipeline: Value::Null,
        stages: stages.into_iter().map(|(id, s)| (id, s.to_string())).collect(),
        stage_requests: Vec::new(),
    }));
    let router = Router::new()
        .route("/api/jobs/:id", get(get_job).put(update_job))
        .route("/api/jobs/:id/candidates", get(job_candidates))
        .route(
            "/api/jobs/:id/candidates/:candidate_id/stage",
            put(update_stage),
        )
        .route("/api/jobs/:id/pipeline", put(update_pipeline))
        .with_state(backend.clone());
    (common::spawn_backend(router).await, backend, job_id)
}

#[tokio::test]
async fn stage_move_is_persisted_and_visible_after_reload() {
    let cand = Uuid::new_v4();
    let (base, backend, job_id) = setup(vec![(cand, "new")]).await;
    let state = common::app_state(&base, Some("token"));
    let board = state.job_board(job_id);
    board.load().await.unwrap();

    board.move_candidate(cand, "technical_review").await.unwrap();
    assert_eq!(board.stage_of(cand).as_deref(), Some("technical_review"));
    assert_eq!(
        backend.lock().unwrap().stage_requests,
        vec![json!({"stage": "technical_review"})]
    );

    board.load().await.unwrap();
    let column = board
        .columns()
        .into_iter()
        .find(|c| c.stage.id == "technical_review")
        .unwrap();
    assert_eq!(column.applications.len(), 1);
    assert_eq!(column.applications[0].candidate_name(), "Kim Lee");
}

#[tokio::test]
async fn rejected_move_reverts_with_backend_message() {
    let cand = Uuid::new_v4();
    let (base, _, job_id) = setup(vec![(cand, "interview_round_2")]).await;
    let state = common::app_state(&base, None);
    let board = state.job_board(job_id);
    board.load().await.unwrap();

    let err = board.move_candidate(cand, "hired").await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
    assert_eq!(board.stage_of(cand).as_deref(), Some("interview_round_2"));
    assert_eq!(
        board.error().as_deref(),
        Some("Candidate must receive an offer first")
    );
}

#[tokio::test]
async fn reordered_pipeline_round_trips() {
    let (base, _, job_id) = setup(vec![]).await;
    let state = common::app_state(&base, None);
    let board = state.job_board(job_id);
    board.load().await.unwrap();

    let mut stages = board.stages();
    stages.swap(1, 2);
    stages.push(PipelineStage {
        id: "reference_check".into(),
        name: "Reference Check".into(),
        color: Some("#7c3aed".into()),
    });
    board.update_pipeline_config(stages.clone()).await.unwrap();
    assert_eq!(board.stages(), stages);

    let fresh = state.job_board(job_id);
    fresh.load().await.unwrap();
    assert_eq!(fresh.stages(), stages);
    assert_eq!(fresh.stages()[1].id, "technical_review");
}

#[tokio::test]
async fn timeline_and_status_toggle() {
    let (base, _, job_id) = setup(vec![]).await;
    let state = common::app_state(&base, None);
    let board = state.job_board(job_id);
    board.load().await.unwrap();

    let headlines: Vec<_> = board
        .activity_timeline()
        .into_iter()
        .map(|e| e.headline)
        .collect();
    assert_eq!(
        headlines,
        vec![
            "Hiring pipeline configuration updated",
            "changed status from Draft to Published, updated Max Salary",
            "Job created with title \"Backend Engineer\"",
        ]
    );

    assert_eq!(board.toggle_status().await.unwrap(), JobStatus::Published);
    assert_eq!(board.toggle_status().await.unwrap(), JobStatus::Draft);
}
