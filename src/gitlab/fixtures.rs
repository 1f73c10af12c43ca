//! In-process stand-in for the GitLab admin and Sidekiq endpoints.

use super::instance_variables::InstanceVariable;
use crate::core::{config::Config, test_server};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DEFAULT_PER_PAGE: usize = 20;

#[derive(Default)]
struct Inner {
    variables: Vec<InstanceVariable>,
    requested_keys: Vec<String>,
    last_sudo: Option<String>,
    hits: HashMap<String, usize>,
    overrides: HashMap<String, Value>,
}

#[derive(Clone, Default)]
pub struct FakeGitlab {
    state: Arc<Mutex<Inner>>,
}

impl FakeGitlab {
    pub fn with_variables(variables: Vec<InstanceVariable>) -> Self {
        let server = Self::default();
        server.state.lock().unwrap().variables = variables;
        server
    }

    pub fn variables(&self) -> Vec<InstanceVariable> {
        self.state.lock().unwrap().variables.clone()
    }

    /// Decoded `{key}` path segments, in request order.
    pub fn requested_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().requested_keys.clone()
    }

    pub fn last_sudo(&self) -> Option<String> {
        self.state.lock().unwrap().last_sudo.clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    /// Replaces the body served for a Sidekiq path such as `/sidekiq/job_stats`.
    pub fn override_response(&self, path: &str, body: Value) {
        self.state.lock().unwrap().overrides.insert(path.to_owned(), body);
    }

    pub async fn spawn(&self) -> Config {
        let host = test_server::spawn(self.router()).await;

        Config {
            host,
            auth_token: test_server::TOKEN.to_owned(),
            timeout: Some(5),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route(
                "/api/v4/admin/ci/variables",
                get(list_variables).post(create_variable),
            )
            .route(
                "/api/v4/admin/ci/variables/:key",
                get(get_variable).put(update_variable).delete(remove_variable),
            )
            .route("/api/v4/sidekiq/:metric", get(sidekiq_metric))
            .with_state(self.clone())
    }
}

pub fn queue_metrics() -> Value {
    json!({
        "queues": {
            "default": { "backlog": 0, "latency": 0 },
            "mailers": { "backlog": 12, "latency": 3 }
        }
    })
}

pub fn process_metrics() -> Value {
    json!({
        "processes": [{
            "hostname": "gitlab.example.com",
            "pid": 5649,
            "tag": "gitlab",
            "started_at": "2016-06-14T10:45:07Z",
            "queues": ["post_receive", "mailers"],
            "labels": [],
            "concurrency": 25,
            "busy": 0
        }]
    })
}

pub fn job_stats() -> Value {
    json!({
        "jobs": { "processed": 2, "failed": 0, "enqueued": 0 }
    })
}

pub fn compound_metrics() -> Value {
    let mut compound = serde_json::Map::new();

    for part in [queue_metrics(), process_metrics(), job_stats()] {
        if let Value::Object(fields) = part {
            compound.extend(fields);
        }
    }

    Value::Object(compound)
}

fn error(status: StatusCode, message: Value) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, json!("404 Variable Not Found"))
}

fn apply_fields(variable: &mut InstanceVariable, body: &Value) {
    if let Some(value) = body.get("value").and_then(Value::as_str) {
        variable.value = value.to_owned();
    }
    if let Some(description) = body.get("description").and_then(Value::as_str) {
        variable.description = Some(description.to_owned());
    }
    if let Some(protected) = body.get("protected").and_then(Value::as_bool) {
        variable.protected = protected;
    }
    if let Some(masked) = body.get("masked").and_then(Value::as_bool) {
        variable.masked = masked;
    }
    if let Some(raw) = body.get("raw").and_then(Value::as_bool) {
        variable.raw = raw;
    }
    if let Some(variable_type) = body.get("variable_type") {
        variable.variable_type = serde_json::from_value(variable_type.clone()).unwrap_or_default();
    }
}

async fn list_variables(
    State(server): State<FakeGitlab>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let param = |name: &str, default: usize| {
        params
            .get(name)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default)
            .max(1)
    };
    let page = param("page", 1);
    let per_page = param("per_page", DEFAULT_PER_PAGE);

    let (items, total) = {
        let state = server.state.lock().unwrap();
        let items: Vec<InstanceVariable> = state
            .variables
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();

        (items, state.variables.len())
    };

    let total_pages = total.div_ceil(per_page).max(1);
    let next_page = if page < total_pages {
        (page + 1).to_string()
    } else {
        String::new()
    };

    let mut headers = HeaderMap::new();
    headers.insert("x-page", page.into());
    headers.insert("x-per-page", per_page.into());
    headers.insert("x-total", total.into());
    headers.insert("x-total-pages", total_pages.into());
    headers.insert("x-next-page", next_page.parse().unwrap());

    (headers, Json(items)).into_response()
}

async fn create_variable(
    State(server): State<FakeGitlab>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = server.state.lock().unwrap();
    state.last_sudo = headers
        .get("sudo")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let Some(key) = body.get("key").and_then(Value::as_str) else {
        return error(StatusCode::BAD_REQUEST, json!({ "key": ["is missing"] }));
    };

    if state.variables.iter().any(|v| v.key == key) {
        let taken = format!("({key}) has already been taken");
        return error(StatusCode::BAD_REQUEST, json!({ "key": [taken] }));
    }

    let mut variable = InstanceVariable {
        key: key.to_owned(),
        value: String::new(),
        variable_type: Default::default(),
        protected: false,
        masked: false,
        raw: false,
        description: None,
    };
    apply_fields(&mut variable, &body);
    state.variables.push(variable.clone());

    (StatusCode::CREATED, Json(variable)).into_response()
}

async fn get_variable(State(server): State<FakeGitlab>, Path(key): Path<String>) -> Response {
    let mut state = server.state.lock().unwrap();
    state.requested_keys.push(key.clone());

    let found = state.variables.iter().find(|v| v.key == key).cloned();

    match found {
        Some(variable) => Json(variable).into_response(),
        None => not_found(),
    }
}

async fn update_variable(
    State(server): State<FakeGitlab>,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = server.state.lock().unwrap();
    state.requested_keys.push(key.clone());

    let updated = state
        .variables
        .iter_mut()
        .find(|v| v.key == key)
        .map(|variable| {
            apply_fields(variable, &body);
            variable.clone()
        });

    match updated {
        Some(variable) => Json(variable).into_response(),
        None => not_found(),
    }
}

async fn remove_variable(State(server): State<FakeGitlab>, Path(key): Path<String>) -> Response {
    let mut state = server.state.lock().unwrap();
    state.requested_keys.push(key.clone());

    let index = state.variables.iter().position(|v| v.key == key);

    match index {
        Some(index) => {
            state.variables.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}

async fn sidekiq_metric(State(server): State<FakeGitlab>, Path(metric): Path<String>) -> Response {
    let path = format!("/sidekiq/{metric}");

    let overridden = {
        let mut state = server.state.lock().unwrap();
        *state.hits.entry(path.clone()).or_default() += 1;
        state.overrides.get(&path).cloned()
    };

    if let Some(body) = overridden {
        return Json(body).into_response();
    }

    let body = match metric.as_str() {
        "queue_metrics" => queue_metrics(),
        "process_metrics" => process_metrics(),
        "job_stats" => job_stats(),
        "compound_metrics" => compound_metrics(),
        _ => return error(StatusCode::NOT_FOUND, json!("404 Not Found")),
    };

    Json(body).into_response()
}
