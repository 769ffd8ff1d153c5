use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub script: String,
    pub enabled: bool,
    pub order: i32,
    pub stage: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRule {
    pub name: String,
    pub script: String,
    pub enabled: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRule {
    pub name: Option<String>,
    pub script: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub connection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub blocked: bool,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub connection: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub blocked: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub blocked: Option<bool>,
}

#[derive(Default)]
pub struct Store {
    pub rules: BTreeMap<String, Rule>,
    pub users: BTreeMap<String, User>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<String>,
    db: Db,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

/// Management API error body: `{statusCode, error, message, errorCode}`.
fn api_error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "error": status.canonical_reason().unwrap_or(""),
            "message": message,
            "errorCode": code,
        })),
    )
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::new(token.to_string()),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/api/v2/rules", get(list_rules).post(create_rule))
        .route(
            "/api/v2/rules/{id}",
            get(get_rule).patch(update_rule).delete(delete_rule),
        )
        .route("/api/v2/stats/active-users", get(active_users))
        .route("/api/v2/stats/daily", get(daily_stats))
        .route("/api/v2/users", get(list_users).post(create_user))
        .route(
            "/api/v2/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/api/v2/users-by-email", get(users_by_email))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match presented {
        Some(value) if value == expected => next.run(request).await,
        Some(_) => api_error(StatusCode::UNAUTHORIZED, "invalid_token", "Invalid token").into_response(),
        None => api_error(
            StatusCode::UNAUTHORIZED,
            "missing_authorization",
            "Missing authentication",
        )
        .into_response(),
    }
}

fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params.get(name).map(|v| v == "true").unwrap_or(false)
}

/// Apply `page`/`per_page` and wrap in the totals envelope when asked.
fn paginate<T: Serialize>(items: Vec<T>, params: &HashMap<String, String>, key: &str) -> ApiResult<Json<Value>> {
    let parse = |name: &str| -> ApiResult<Option<usize>> {
        params
            .get(name)
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|_| api_error(StatusCode::BAD_REQUEST, "invalid_query_string", &format!("Invalid {name}")))
    };
    let page = parse("page")?.unwrap_or(0);
    let per_page = parse("per_page")?;
    let total = items.len();
    let (start, selected): (usize, Vec<T>) = match per_page {
        Some(per_page) => {
            let start = page * per_page;
            (start, items.into_iter().skip(start).take(per_page).collect())
        }
        None => (0, items),
    };
    if flag(params, "include_totals") {
        let limit = per_page.unwrap_or(total);
        let mut envelope = json!({
            "start": start,
            "limit": limit,
            "length": selected.len(),
            "total": total,
        });
        envelope[key] = json!(selected);
        Ok(Json(envelope))
    } else {
        Ok(Json(json!(selected)))
    }
}

async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let mut rules: Vec<Rule> = store
        .rules
        .values()
        .filter(|r| match params.get("enabled") {
            Some(enabled) => r.enabled.to_string() == *enabled,
            None => true,
        })
        .cloned()
        .collect();
    rules.sort_by_key(|r| r.order);
    paginate(rules, &params, "rules")
}

async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<CreateRule>,
) -> ApiResult<(StatusCode, Json<Rule>)> {
    let mut store = state.db.write().await;
    if store.rules.values().any(|r| r.name == input.name) {
        return Err(api_error(
            StatusCode::CONFLICT,
            "rule_conflict",
            "A rule with the same name already exists",
        ));
    }
    let next_order = store.rules.values().map(|r| r.order).max().unwrap_or(0) + 1;
    let rule = Rule {
        id: format!("rul_{}", &Uuid::new_v4().simple().to_string()[..16]),
        name: input.name,
        script: input.script,
        enabled: input.enabled.unwrap_or(true),
        order: input.order.unwrap_or(next_order),
        stage: "login_success".to_string(),
    };
    store.rules.insert(rule.id.clone(), rule.clone());
    Ok((StatusCode::CREATED, Json(rule)))
}

fn rule_not_found() -> (StatusCode, Json<Value>) {
    api_error(StatusCode::NOT_FOUND, "inexistent_rule", "The rule does not exist.")
}

async fn get_rule(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Rule>> {
    let store = state.db.read().await;
    store.rules.get(&id).cloned().map(Json).ok_or_else(rule_not_found)
}

async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRule>,
) -> ApiResult<Json<Rule>> {
    let mut store = state.db.write().await;
    let rule = store.rules.get_mut(&id).ok_or_else(rule_not_found)?;
    if let Some(name) = input.name {
        rule.name = name;
    }
    if let Some(script) = input.script {
        rule.script = script;
    }
    if let Some(enabled) = input.enabled {
        rule.enabled = enabled;
    }
    if let Some(order) = input.order {
        rule.order = order;
    }
    Ok(Json(rule.clone()))
}

async fn delete_rule(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store
        .rules
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(rule_not_found)
}

async fn active_users(State(state): State<AppState>) -> Json<usize> {
    let store = state.db.read().await;
    Json(store.users.values().filter(|u| !u.blocked).count())
}

/// `YYYYMMDD` into `YYYY-MM-DDT00:00:00.000Z`.
fn iso_day(compact: &str) -> Option<String> {
    if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}T00:00:00.000Z",
        &compact[..4],
        &compact[4..6],
        &compact[6..]
    ))
}

async fn daily_stats(Query(params): Query<HashMap<String, String>>) -> ApiResult<Json<Value>> {
    let day = |name: &str| {
        params
            .get(name)
            .and_then(|v| iso_day(v))
            .ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_query_string",
                    &format!("Query validation error: '{name}' must be YYYYMMDD"),
                )
            })
    };
    let from = day("from")?;
    let to = day("to")?;
    let mut days = vec![from];
    if to != days[0] {
        days.push(to);
    }
    let stats: Vec<Value> = days
        .into_iter()
        .map(|date| {
            json!({
                "date": date,
                "logins": 0,
                "signups": 0,
                "leaked_passwords": 0,
                "created_at": date,
                "updated_at": date,
            })
        })
        .collect();
    Ok(Json(Value::Array(stats)))
}

fn user_not_found() -> (StatusCode, Json<Value>) {
    api_error(StatusCode::NOT_FOUND, "inexistent_user", "The user does not exist.")
}

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let users: Vec<User> = store.users.values().cloned().collect();
    paginate(users, &params, "users")
}

async fn users_by_email(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<User>>> {
    let email = params.get("email").ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "invalid_query_string",
            "Query validation error: 'email' is required",
        )
    })?;
    let store = state.db.read().await;
    let matches = store
        .users
        .values()
        .filter(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
        .cloned()
        .collect();
    Ok(Json(matches))
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let connection = input.connection.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            "Payload validation error: 'Missing required property: connection'.",
        )
    })?;
    let user = User {
        user_id: format!("auth0|{}", Uuid::new_v4().simple()),
        connection,
        email: input.email,
        name: input.name,
        blocked: input.blocked.unwrap_or(false),
    };
    let mut store = state.db.write().await;
    store.users.insert(user.user_id.clone(), user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
    let store = state.db.read().await;
    store.users.get(&id).cloned().map(Json).ok_or_else(user_not_found)
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<Json<User>> {
    let mut store = state.db.write().await;
    let user = store.users.get_mut(&id).ok_or_else(user_not_found)?;
    if let Some(email) = input.email {
        user.email = Some(email);
    }
    if let Some(name) = input.name {
        user.name = Some(name);
    }
    if let Some(blocked) = input.blocked {
        user.blocked = blocked;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    store
        .users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(user_not_found)
}
