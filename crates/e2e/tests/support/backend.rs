//! In-process fake of the Pump Master REST API
//!
//! Holds pumps and sessions in memory and mirrors the status codes the
//! real backend uses: 201/204 for create/delete, 400 for invalid bodies,
//! 401 without a live token, 404 for unknown ids.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

pub const PUMP_TYPES: [&str; 4] = ["Centrifugal", "Submersible", "Positive Displacement", "Turbine"];

const NUMERIC_FIELDS: [&str; 6] = [
    "latitude",
    "longitude",
    "offset",
    "currentPressure",
    "minPressure",
    "maxPressure",
];

/// Accounts the fake accepts, as (username, password)
const ACCOUNTS: [(&str, &str); 4] = [
    ("test@pumpmaster.com", "Test@123"),
    ("testuser@pumpmaster.com", "Test@123"),
    ("engineer@pumpmaster.com", "Engineer@123"),
    ("admin@pumpmaster.com", "Admin@123"),
];

#[derive(Default)]
struct Store {
    pumps: BTreeMap<u64, Map<String, Value>>,
    next_id: u64,
    tokens: HashSet<String>,
    issued: u64,
}

type Shared = Arc<Mutex<Store>>;

/// A running fake; the server task lives as long as the test runtime
pub struct FakeBackend {
    addr: SocketAddr,
    store: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let store = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend addr");
        let app = Router::new().nest("/api", routes(store.clone()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend crashed");
        });
        Self { addr, store }
    }

    /// Root the API client should use, ending in `/api`
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn pump_count(&self) -> usize {
        self.store.lock().pumps.len()
    }

    pub fn live_sessions(&self) -> usize {
        self.store.lock().tokens.len()
    }
}

fn routes(store: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/validate", get(validate))
        .route("/pumps", get(list_pumps).post(create_pump))
        .route("/pumps/search", get(search_pumps))
        .route("/pumps/filter", get(filter_pumps))
        .route(
            "/pumps/bulk",
            post(bulk_create).put(bulk_update).delete(bulk_delete),
        )
        .route("/pumps/export", get(export_pumps))
        .route("/pumps/import", post(import_pumps))
        .route("/pumps/statistics", get(statistics))
        .route("/pumps/statistics/status", get(status_counts))
        .route("/pumps/statistics/type", get(type_counts))
        .route(
            "/pumps/:id",
            get(get_pump).put(update_pump).delete(delete_pump),
        )
        .with_state(store)
}

// --- helpers ---

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn validation_error(errors: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Validation failed", "errors": errors })),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(String::from)
}

fn authorize(store: &Shared, headers: &HeaderMap) -> Result<String, Response> {
    match bearer(headers) {
        Some(token) if store.lock().tokens.contains(&token) => Ok(token),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, Response> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(error(StatusCode::BAD_REQUEST, "Expected a JSON object")),
        Err(_) => Err(error(StatusCode::BAD_REQUEST, "Malformed JSON")),
    }
}

fn issue_token(store: &mut Store, username: &str) -> String {
    store.issued += 1;
    let payload: String = format!("{}:{}", username, store.issued)
        .bytes()
        .map(|b| format!("{:02x}", b))
        .collect();
    let token = format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.{}",
        payload,
        uuid::Uuid::new_v4().simple()
    );
    store.tokens.insert(token.clone());
    token
}

fn session(token: String, username: &str) -> Value {
    json!({
        "token": token,
        "user": {
            "id": format!("user-{}", username.split('@').next().unwrap_or(username)),
            "username": username,
            "email": username,
            "tenantId": "tenant-1"
        },
        "expiresIn": 3600
    })
}

fn non_empty_str(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn validate_pump(map: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    for key in ["name", "area", "flowRate"] {
        if !non_empty_str(map, key) {
            errors.push(format!("{} is required", key));
        }
    }
    match map.get("type").and_then(Value::as_str) {
        Some(t) if PUMP_TYPES.contains(&t) => {}
        Some(t) => errors.push(format!("type {:?} is not supported", t)),
        None => errors.push("type is required".to_string()),
    }
    for key in NUMERIC_FIELDS {
        if !map.get(key).is_some_and(Value::is_number) {
            errors.push(format!("{} must be a number", key));
        }
    }
    errors
}

fn now() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

/// Validate and store a new pump, returning it with id and timestamps
fn insert_pump(store: &mut Store, mut map: Map<String, Value>) -> Result<Value, Vec<String>> {
    let errors = validate_pump(&map);
    if !errors.is_empty() {
        return Err(errors);
    }
    store.next_id += 1;
    let id = store.next_id;
    map.insert("id".to_string(), Value::String(id.to_string()));
    map.entry("status")
        .or_insert_with(|| Value::String("Active".to_string()));
    map.insert("createdAt".to_string(), now());
    map.insert("updatedAt".to_string(), now());
    store.pumps.insert(id, map.clone());
    Ok(Value::Object(map))
}

enum UpdateError {
    NotFound,
    Invalid(Vec<String>),
}

fn apply_update(store: &mut Store, id: &str, changes: &Map<String, Value>) -> Result<Value, UpdateError> {
    let key: u64 = id.parse().map_err(|_| UpdateError::NotFound)?;
    let existing = store.pumps.get(&key).ok_or(UpdateError::NotFound)?;

    let mut merged = existing.clone();
    for (field, value) in changes {
        if field != "id" {
            merged.insert(field.clone(), value.clone());
        }
    }
    let errors = validate_pump(&merged);
    if !errors.is_empty() {
        return Err(UpdateError::Invalid(errors));
    }
    merged.insert("updatedAt".to_string(), now());
    store.pumps.insert(key, merged.clone());
    Ok(Value::Object(merged))
}

fn field_str<'a>(pump: &'a Map<String, Value>, key: &str) -> &'a str {
    pump.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn paginate(pumps: Vec<Value>, params: &HashMap<String, String>) -> Value {
    let page: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let limit: u32 = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .filter(|l| *l > 0)
        .unwrap_or(10);
    let total = pumps.len() as u64;
    let total_pages = total.div_ceil(u64::from(limit)) as u32;
    let data: Vec<Value> = pumps
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();
    json!({
        "data": data,
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": total_pages
    })
}

fn matching<F>(store: &Shared, keep: F) -> Vec<Value>
where
    F: Fn(&Map<String, Value>) -> bool,
{
    store
        .lock()
        .pumps
        .values()
        .filter(|p| keep(p))
        .map(|p| Value::Object(p.clone()))
        .collect()
}

fn counts_by(store: &Shared, key: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for pump in store.lock().pumps.values() {
        *counts.entry(field_str(pump, key).to_string()).or_insert(0) += 1;
    }
    counts
}

// --- auth handlers ---

async fn login(State(store): State<Shared>, body: Bytes) -> Response {
    let map = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    if !non_empty_str(&map, "username") || !non_empty_str(&map, "password") {
        return error(StatusCode::BAD_REQUEST, "Username and password are required");
    }
    let username = field_str(&map, "username");
    let password = field_str(&map, "password");
    if !ACCOUNTS.contains(&(username, password)) {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let token = issue_token(&mut store.lock(), username);
    (StatusCode::OK, Json(session(token, username))).into_response()
}

async fn logout(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let token = match authorize(&store, &headers) {
        Ok(token) => token,
        Err(resp) => return resp,
    };
    store.lock().tokens.remove(&token);
    (StatusCode::OK, Json(json!({ "message": "Logged out" }))).into_response()
}

async fn refresh(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let old = match authorize(&store, &headers) {
        Ok(token) => token,
        Err(resp) => return resp,
    };
    // Payload is hex of "username:n"
    let username = old
        .split('.')
        .nth(1)
        .and_then(|hex| {
            (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
                .collect::<Option<Vec<u8>>>()
        })
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| s.rsplit_once(':').map(|(user, _)| user.to_string()))
        .unwrap_or_default();

    let mut guard = store.lock();
    guard.tokens.remove(&old);
    let token = issue_token(&mut guard, &username);
    drop(guard);
    (StatusCode::OK, Json(session(token, &username))).into_response()
}

async fn validate(State(store): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&store, &headers) {
        Ok(_) => (StatusCode::OK, Json(json!({ "valid": true }))).into_response(),
        Err(resp) => resp,
    }
}

// --- pump handlers ---

async fn list_pumps(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    Json(paginate(matching(&store, |_| true), &params)).into_response()
}

async fn create_pump(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let map = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    match insert_pump(&mut store.lock(), map) {
        Ok(pump) => (StatusCode::CREATED, Json(pump)).into_response(),
        Err(errors) => validation_error(errors),
    }
}

async fn get_pump(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let found = id
        .parse::<u64>()
        .ok()
        .and_then(|key| store.lock().pumps.get(&key).cloned());
    match found {
        Some(pump) => Json(Value::Object(pump)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Pump not found"),
    }
}

async fn update_pump(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let changes = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let result = apply_update(&mut store.lock(), &id, &changes);
    match result {
        Ok(pump) => Json(pump).into_response(),
        Err(UpdateError::NotFound) => error(StatusCode::NOT_FOUND, "Pump not found"),
        Err(UpdateError::Invalid(errors)) => validation_error(errors),
    }
}

async fn delete_pump(
    State(store): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let removed = id
        .parse::<u64>()
        .ok()
        .and_then(|key| store.lock().pumps.remove(&key));
    match removed {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Pump not found"),
    }
}

async fn search_pumps(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let term = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let hits = matching(&store, |p| {
        ["name", "area", "type"]
            .iter()
            .any(|key| field_str(p, key).to_lowercase().contains(&term))
    });
    Json(paginate(hits, &params)).into_response()
}

async fn filter_pumps(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let wanted_type = params.get("type").cloned();
    let wanted_status = params.get("status").cloned();
    let hits = matching(&store, |p| {
        wanted_type
            .as_deref()
            .map_or(true, |t| field_str(p, "type").eq_ignore_ascii_case(t))
            && wanted_status
                .as_deref()
                .map_or(true, |s| field_str(p, "status").eq_ignore_ascii_case(s))
    });
    Json(paginate(hits, &params)).into_response()
}

async fn bulk_create(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let map = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let Some(items) = map.get("pumps").and_then(Value::as_array) else {
        return error(StatusCode::BAD_REQUEST, "pumps array is required");
    };
    let objects: Vec<Map<String, Value>> =
        items.iter().filter_map(|v| v.as_object().cloned()).collect();
    if objects.len() != items.len() {
        return error(StatusCode::BAD_REQUEST, "every pump must be an object");
    }
    let errors: Vec<String> = objects.iter().flat_map(validate_pump).collect();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let mut guard = store.lock();
    let created: Vec<Value> = objects
        .into_iter()
        .filter_map(|p| insert_pump(&mut guard, p).ok())
        .collect();
    drop(guard);
    (StatusCode::CREATED, Json(Value::Array(created))).into_response()
}

async fn bulk_update(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let map = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let Some(updates) = map.get("updates").and_then(Value::as_array) else {
        return error(StatusCode::BAD_REQUEST, "updates array is required");
    };

    let mut guard = store.lock();
    let mut updated = Vec::new();
    for update in updates {
        let id = update.get("id").and_then(Value::as_str).unwrap_or_default();
        let Some(changes) = update.get("data").and_then(Value::as_object) else {
            return error(StatusCode::BAD_REQUEST, "update data must be an object");
        };
        match apply_update(&mut guard, id, changes) {
            Ok(pump) => updated.push(pump),
            Err(UpdateError::NotFound) => {
                return error(StatusCode::NOT_FOUND, &format!("Pump {} not found", id))
            }
            Err(UpdateError::Invalid(errors)) => return validation_error(errors),
        }
    }
    drop(guard);
    Json(Value::Array(updated)).into_response()
}

async fn bulk_delete(State(store): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let map = match parse_object(&body) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let Some(ids) = map.get("ids").and_then(Value::as_array) else {
        return error(StatusCode::BAD_REQUEST, "ids array is required");
    };
    let mut guard = store.lock();
    for id in ids.iter().filter_map(Value::as_str) {
        if let Ok(key) = id.parse::<u64>() {
            guard.pumps.remove(&key);
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

const CSV_COLUMNS: [&str; 11] = [
    "name",
    "type",
    "area",
    "latitude",
    "longitude",
    "flowRate",
    "offset",
    "currentPressure",
    "minPressure",
    "maxPressure",
    "status",
];

fn to_csv(pumps: &[Value]) -> String {
    let mut out = CSV_COLUMNS.join(",");
    out.push('\n');
    for pump in pumps {
        let row: Vec<String> = CSV_COLUMNS
            .iter()
            .map(|col| match pump.get(*col) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn from_csv(text: &str) -> Vec<Map<String, Value>> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header_line.split(',').map(str::trim).collect();
    lines
        .map(|line| {
            columns
                .iter()
                .zip(line.split(','))
                .map(|(col, raw)| {
                    let raw = raw.trim();
                    let value = if NUMERIC_FIELDS.contains(col) {
                        raw.parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(Value::Number)
                            .unwrap_or_else(|| Value::String(raw.to_string()))
                    } else {
                        Value::String(raw.to_string())
                    };
                    (col.to_string(), value)
                })
                .collect()
        })
        .collect()
}

async fn export_pumps(
    State(store): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let pumps = matching(&store, |_| true);
    match params.get("format").map(String::as_str).unwrap_or("json") {
        "json" => Json(Value::Array(pumps)).into_response(),
        "csv" => ([(header::CONTENT_TYPE, "text/csv")], to_csv(&pumps)).into_response(),
        "xlsx" => {
            // Zip signature followed by the CSV rendering
            let mut bytes = b"PK\x03\x04".to_vec();
            bytes.extend_from_slice(to_csv(&pumps).as_bytes());
            (
                [(
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                )],
                bytes,
            )
                .into_response()
        }
        other => error(
            StatusCode::BAD_REQUEST,
            &format!("unsupported export format {}", other),
        ),
    }
}

async fn import_pumps(
    State(store): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }

    let mut file: Option<Bytes> = None;
    let mut format = String::from("json");
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("file") => file = field.bytes().await.ok(),
            Some("format") => format = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }
    let Some(file) = file else {
        return error(StatusCode::BAD_REQUEST, "file is required");
    };

    let rows: Vec<Map<String, Value>> = match format.as_str() {
        "json" => match serde_json::from_slice::<Vec<Value>>(&file) {
            Ok(items) => items
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect(),
            Err(_) => return error(StatusCode::BAD_REQUEST, "Malformed JSON import"),
        },
        "csv" => from_csv(&String::from_utf8_lossy(&file)),
        other => {
            return error(
                StatusCode::BAD_REQUEST,
                &format!("unsupported import format {}", other),
            )
        }
    };

    let mut imported = 0u64;
    let mut errors = Vec::new();
    let mut guard = store.lock();
    for (row, pump) in rows.into_iter().enumerate() {
        match insert_pump(&mut guard, pump) {
            Ok(_) => imported += 1,
            Err(problems) => errors.push(json!({ "row": row + 1, "errors": problems })),
        }
    }
    drop(guard);
    Json(json!({ "imported": imported, "errors": errors })).into_response()
}

async fn statistics(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    let total = store.lock().pumps.len();
    Json(json!({
        "total": total,
        "byStatus": counts_by(&store, "status"),
        "byType": counts_by(&store, "type"),
    }))
    .into_response()
}

async fn status_counts(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    Json(counts_by(&store, "status")).into_response()
}

async fn type_counts(State(store): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&store, &headers) {
        return resp;
    }
    Json(counts_by(&store, "type")).into_response()
}
