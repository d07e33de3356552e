//! In-process stand-in for the prescription REST API

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use prescription_console::models::{Gender, Prescription};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin123";

#[derive(Default)]
pub struct MockState {
    pub today: NaiveDate,
    pub records: BTreeMap<i64, Prescription>,
    pub next_id: i64,
    /// Status the analytics route fails with, as a server without it would
    pub analytics_error: Option<StatusCode>,
    /// `METHOD path` of every request that passed authentication
    pub requests: Vec<String>,
    pub rejected: usize,
    /// Delay applied to list requests for a given page, in milliseconds
    pub slow_pages: BTreeMap<u32, u64>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub fn new_state(today: NaiveDate) -> Shared {
    Arc::new(Mutex::new(MockState {
        today,
        next_id: 1,
        ..MockState::default()
    }))
}

pub fn sample(day: NaiveDate, name: &str, age: i32, gender: Gender) -> Prescription {
    Prescription {
        id: None,
        prescription_date: day,
        patient_name: name.to_string(),
        patient_age: age,
        patient_gender: gender,
        diagnosis: "Seasonal flu".to_string(),
        medicines: "Paracetamol".to_string(),
        next_visit_date: day + Duration::days(14),
    }
}

pub fn seed(state: &Shared, mut record: Prescription) -> i64 {
    let mut s = state.lock().unwrap();
    let id = s.next_id;
    s.next_id += 1;
    record.id = Some(id);
    s.records.insert(id, record);
    id
}

fn authorized(state: &Shared, headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Basic {}", STANDARD.encode(format!("{}:{}", USERNAME, PASSWORD)));
    let ok = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        state.lock().unwrap().rejected += 1;
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn log(state: &Shared, entry: String) {
    state.lock().unwrap().requests.push(entry);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page: Option<u32>,
    size: Option<u32>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(10).max(1);
    log(&state, format!("GET /api/prescriptions?page={}&size={}", page, size));

    let delay = state.lock().unwrap().slow_pages.get(&page).copied();
    if let Some(ms) = delay {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }

    let matching: Vec<Prescription> = state
        .lock()
        .unwrap()
        .records
        .values()
        .filter(|p| params.start_date.map_or(true, |d| p.prescription_date >= d))
        .filter(|p| params.end_date.map_or(true, |d| p.prescription_date <= d))
        .cloned()
        .collect();

    let total = matching.len() as u32;
    let total_pages = (total + size - 1) / size;
    let content: Vec<Prescription> = matching
        .into_iter()
        .skip((page * size) as usize)
        .take(size as usize)
        .collect();

    Ok(Json(json!({
        "content": content,
        "pageable": { "pageNumber": page, "pageSize": size },
        "totalElements": total,
        "totalPages": total_pages,
        "size": size,
        "number": page,
        "first": page == 0,
        "last": page + 1 >= total_pages,
        "empty": content.is_empty()
    })))
}

async fn create(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(record): Json<Prescription>,
) -> Result<Json<Prescription>, StatusCode> {
    authorized(&state, &headers)?;
    log(&state, "POST /api/prescriptions".to_string());
    let id = seed(&state, record);
    let saved = state.lock().unwrap().records[&id].clone();
    Ok(Json(saved))
}

async fn get_one(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Prescription>, StatusCode> {
    authorized(&state, &headers)?;
    log(&state, format!("GET /api/prescriptions/{}", id));
    let s = state.lock().unwrap();
    s.records.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut record): Json<Prescription>,
) -> Result<Json<Prescription>, StatusCode> {
    authorized(&state, &headers)?;
    log(&state, format!("PUT /api/prescriptions/{}", id));
    let mut s = state.lock().unwrap();
    if !s.records.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    record.id = Some(id);
    s.records.insert(id, record.clone());
    Ok(Json(record))
}

async fn delete(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    authorized(&state, &headers)?;
    log(&state, format!("DELETE /api/prescriptions/{}", id));
    let mut s = state.lock().unwrap();
    match s.records.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Server-side summary anchored on `MockState::today`
async fn analytics(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorized(&state, &headers)?;
    log(&state, "GET /api/prescriptions/analytics".to_string());
    let s = state.lock().unwrap();
    if let Some(status) = s.analytics_error {
        return Err(status);
    }

    let today = s.today;
    let week_start = today - Duration::days(7);
    let mut daily = BTreeMap::new();
    for offset in 0..7 {
        let day = today - Duration::days(offset);
        let count = s.records.values().filter(|p| p.prescription_date == day).count();
        if count > 0 {
            daily.insert(day.format("%Y-%m-%d").to_string(), count);
        }
    }

    Ok(Json(json!({
        "totalPrescriptions": s.records.len(),
        "todayPrescriptions": s.records.values().filter(|p| p.prescription_date == today).count(),
        "thisWeekPrescriptions": s
            .records
            .values()
            .filter(|p| p.prescription_date >= week_start && p.prescription_date <= today)
            .count(),
        "dailyBreakdown": daily
    })))
}

/// Bind the mock on an ephemeral port and return its base URL
pub async fn spawn(state: Shared) -> String {
    let app = Router::new()
        .route("/api/prescriptions", get(list).post(create))
        .route("/api/prescriptions/analytics", get(analytics))
        .route(
            "/api/prescriptions/:id",
            get(get_one).put(update).delete(delete),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
