//! Integration tests against an in-process mock of the prescription API

mod mock_api;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};

use prescription_console::{
    cli::{self, Command, PrescriptionArgs},
    config::{AnalyticsSource, ApiConfig, AppConfig},
    error::{AppError, ErrorCode},
    models::{dates::FixedClock, Gender, PrescriptionForm, ReportSource},
    repository::ApiClient,
    services::{analytics::AnalyticsOptions, storage::MemoryStore, Services},
    views::{
        charts::ChartsView, form::PrescriptionFormView, list::PrescriptionListView,
        login::LoginView,
    },
    AppState,
};

use mock_api::{new_state, sample, seed, spawn, Shared, PASSWORD, USERNAME};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

async fn setup() -> (Shared, Services, String) {
    let state = new_state(today());
    let base_url = spawn(state.clone()).await;
    let api = ApiClient::new(&ApiConfig {
        base_url: base_url.clone(),
        timeout_secs: 5,
    })
    .unwrap();
    let services = Services::new(api, Arc::new(MemoryStore::new()), Arc::new(FixedClock(today())));
    (state, services, base_url)
}

async fn logged_in() -> (Shared, Services, String) {
    let (state, services, base_url) = setup().await;
    services.session.login(USERNAME, PASSWORD).await.unwrap();
    (state, services, base_url)
}

fn valid_form() -> PrescriptionForm {
    PrescriptionForm {
        prescription_date: Some(today()),
        patient_name: Some("Ada Lovelace".to_string()),
        patient_age: Some(36),
        patient_gender: Some(Gender::Female),
        diagnosis: Some("Migraine".to_string()),
        medicines: Some("Ibuprofen 400mg".to_string()),
        next_visit_date: Some(today() + Duration::days(14)),
    }
}

fn request_count(state: &Shared, prefix: &str) -> usize {
    state
        .lock()
        .unwrap()
        .requests
        .iter()
        .filter(|r| r.starts_with(prefix))
        .count()
}

#[tokio::test]
async fn test_login_success_persists_credentials() {
    let (_state, services, _) = setup().await;
    let mut view = LoginView::new(services.session.clone());
    let mut changes = services.session.subscribe();

    let note = view.submit(USERNAME, PASSWORD).await;

    assert!(!note.is_error(), "{}", note);
    assert!(view.is_logged_in());
    assert!(*changes.borrow_and_update());
    let stored = services.session.current_credential().unwrap().unwrap();
    assert_eq!(stored.username, USERNAME);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let (state, services, _) = setup().await;
    let mut view = LoginView::new(services.session.clone());

    let note = view.submit(USERNAME, "wrong").await;

    assert!(note.is_error());
    assert_eq!(note.message, "Invalid username or password");
    assert_eq!(note.code, ErrorCode::NotAuthorized);
    assert!(!services.session.is_logged_in());
    assert_eq!(state.lock().unwrap().rejected, 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (_state, services, _) = logged_in().await;
    let mut view = LoginView::new(services.session.clone());

    let note = view.logout();

    assert!(!note.is_error());
    assert!(!services.session.is_logged_in());
    assert!(services.session.current_credential().unwrap().is_none());
}

#[tokio::test]
async fn test_requests_without_session_never_reach_the_server() {
    let (state, services, _) = setup().await;
    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);

    let note = list.load(0).await.expect("expected a notification");

    assert_eq!(note.message, "Please log in to continue");
    assert_eq!(note.code, ErrorCode::NotLoggedIn);
    assert!(state.lock().unwrap().requests.is_empty());
    assert_eq!(state.lock().unwrap().rejected, 0);
}

#[tokio::test]
async fn test_create_edit_and_delete_through_views() {
    let (state, services, _) = logged_in().await;

    let mut create = PrescriptionFormView::create(services.prescriptions.clone(), today());
    create.form_mut().patch(valid_form());
    let (saved, note) = create.submit().await.unwrap();
    assert_eq!(note.message, "Prescription created successfully");
    let id = saved.id.expect("server assigns an id");

    let mut edit = PrescriptionFormView::edit(services.prescriptions.clone(), id);
    assert!(edit.load().await.is_none());
    assert_eq!(edit.form().patient_name.as_deref(), Some("Ada Lovelace"));
    edit.form_mut().diagnosis = Some("Tension headache".to_string());
    let (updated, note) = edit.submit().await.unwrap();
    assert_eq!(note.message, "Prescription updated successfully");
    assert_eq!(updated.diagnosis, "Tension headache");
    assert_eq!(state.lock().unwrap().records[&id].diagnosis, "Tension headache");

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    assert!(list.load(0).await.is_none());
    assert_eq!(list.rows().len(), 1);

    let note = list.delete(id).await;
    assert_eq!(note.message, "Prescription deleted successfully");
    assert!(list.rows().is_empty());
    assert!(state.lock().unwrap().records.is_empty());
}

#[tokio::test]
async fn test_invalid_form_sends_no_request() {
    let (state, services, _) = logged_in().await;
    let before = request_count(&state, "POST");

    let mut view = PrescriptionFormView::create(services.prescriptions.clone(), today());
    view.form_mut().patient_name = Some("A".to_string());
    let note = view.submit().await.unwrap_err();

    assert!(note.is_error());
    assert_eq!(view.errors()[0], "Patient Name must be at least 2 characters");
    assert!(view.errors().contains(&"Diagnosis is required".to_string()));
    assert_eq!(request_count(&state, "POST"), before);
}

#[tokio::test]
async fn test_missing_prescription_reports_error() {
    let (_state, services, _) = logged_in().await;

    let mut edit = PrescriptionFormView::edit(services.prescriptions.clone(), 999);
    let note = edit.load().await.expect("expected a notification");
    assert_eq!(note.message, "Error loading prescription");
    assert_eq!(note.code, ErrorCode::NoSuchPrescription);

    let err = services.prescriptions.get(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_pagination() {
    let (state, services, _) = logged_in().await;
    for i in 0..25 {
        seed(
            &state,
            sample(today() - Duration::days(i), &format!("Patient {}", i), 30, Gender::Male),
        );
    }

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    assert!(list.load(0).await.is_none());
    assert_eq!(list.total_elements(), 25);
    assert_eq!(list.total_pages(), 3);
    assert_eq!(list.rows().len(), 10);

    assert!(list.next_page().await.is_none());
    assert!(list.next_page().await.is_none());
    assert_eq!(list.page_index(), 2);
    assert_eq!(list.rows().len(), 5);

    // Already on the last page
    let before = request_count(&state, "GET /api/prescriptions?");
    assert!(list.next_page().await.is_none());
    assert_eq!(request_count(&state, "GET /api/prescriptions?"), before);

    assert!(list.previous_page().await.is_none());
    assert_eq!(list.page_index(), 1);
}

#[tokio::test]
async fn test_deleting_last_row_steps_back_a_page() {
    let (state, services, _) = logged_in().await;
    for i in 0..11 {
        seed(&state, sample(today(), &format!("Patient {}", i), 30, Gender::Male));
    }

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    assert!(list.load(1).await.is_none());
    assert_eq!(list.rows().len(), 1);
    let id = list.rows()[0].id.unwrap();

    let note = list.delete(id).await;
    assert_eq!(note.message, "Prescription deleted successfully");
    assert_eq!(list.page_index(), 0);
    assert_eq!(list.rows().len(), 10);
    assert_eq!(list.total_pages(), 1);
}

#[tokio::test]
async fn test_date_filters() {
    let (state, services, _) = logged_in().await;
    for i in 0..10 {
        seed(&state, sample(today() - Duration::days(i), "Grace Hopper", 50, Gender::Female));
    }

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 20);
    let start = today() - Duration::days(2);
    assert!(list.apply_filters(Some(start), Some(today())).await.is_none());
    assert_eq!(list.total_elements(), 3);
    assert!(list.rows().iter().all(|p| p.prescription_date >= start));

    assert!(list.clear_filters().await.is_none());
    assert_eq!(list.total_elements(), 10);
    assert_eq!(list.filters(), (None, None));
}

#[tokio::test]
async fn test_inverted_date_range_sends_no_request() {
    let (state, services, _) = logged_in().await;
    let before = state.lock().unwrap().requests.len();

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    let note = list
        .apply_filters(Some(today()), Some(today() - Duration::days(1)))
        .await
        .expect("expected a notification");

    assert!(note.is_error());
    assert_eq!(state.lock().unwrap().requests.len(), before);
    assert_eq!(list.filters(), (None, None));
}

#[tokio::test]
async fn test_stale_list_response_is_discarded() {
    let (state, services, _) = logged_in().await;
    for i in 0..15 {
        seed(&state, sample(today(), &format!("Patient {}", i), 20, Gender::Other));
    }
    state.lock().unwrap().slow_pages.insert(0, 300);

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    let slow = tokio::spawn(list.start_load(0).resolve());
    let fast = list.start_load(1).resolve().await;
    assert!(list.finish_load(fast).is_none());
    assert_eq!(list.page_index(), 1);
    assert_eq!(list.rows().len(), 5);

    let late = slow.await.unwrap();
    assert!(late.result.is_ok());
    assert!(list.finish_load(late).is_none());
    assert_eq!(list.page_index(), 1);
    assert_eq!(list.rows().len(), 5);
}

#[tokio::test]
async fn test_leaving_screen_drops_inflight_load() {
    let (state, services, _) = logged_in().await;
    seed(&state, sample(today(), "Alan Turing", 41, Gender::Male));

    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    let pending = list.start_load(0);
    list.leave();
    let completed = pending.resolve().await;

    assert!(list.finish_load(completed).is_none());
    assert!(list.rows().is_empty());
    assert!(!list.is_loading());
}

#[tokio::test]
async fn test_charts_use_server_summary() {
    let (state, services, _) = logged_in().await;
    seed(&state, sample(today(), "A", 10, Gender::Male));
    seed(&state, sample(today(), "B", 40, Gender::Female));
    seed(&state, sample(today() - Duration::days(3), "C", 70, Gender::Male));
    seed(&state, sample(today() - Duration::days(40), "D", 25, Gender::Other));

    let mut view = ChartsView::new(services.analytics.clone(), AnalyticsOptions::default());
    assert!(view.load().await.is_none());

    let report = view.report().unwrap();
    assert_eq!(report.source, ReportSource::ServerSummary);
    assert_eq!(report.summary.total_prescriptions, 4);
    assert_eq!(report.summary.today_prescriptions, 2);
    assert_eq!(report.summary.this_week_prescriptions, 3);
    assert_eq!(report.daily.entries.len(), 7);
    assert_eq!(report.daily.values(), vec![0, 0, 0, 1, 0, 0, 2]);
    assert!(report.gender.is_none());
    assert_eq!(request_count(&state, "GET /api/prescriptions?"), 1);
}

#[tokio::test]
async fn test_charts_fall_back_to_client_aggregation() {
    let (state, services, _) = logged_in().await;
    state.lock().unwrap().analytics_error = Some(StatusCode::NOT_FOUND);
    seed(&state, sample(today(), "A", 10, Gender::Male));
    seed(&state, sample(today() - Duration::days(1), "B", 40, Gender::Female));
    seed(&state, sample(today() - Duration::days(1), "C", 70, Gender::Female));

    let mut view = ChartsView::new(services.analytics.clone(), AnalyticsOptions::default());
    assert!(view.load().await.is_none());

    let report = view.report().unwrap();
    assert_eq!(report.source, ReportSource::ClientAggregation);
    assert_eq!(view.metrics().total_prescriptions, 3);
    assert_eq!(report.daily.values(), vec![0, 0, 0, 0, 0, 2, 1]);

    let gender = report.gender.as_ref().unwrap();
    assert_eq!(gender.labels(), vec!["Male", "Female", "Other"]);
    assert_eq!(gender.values(), vec![1, 2, 0]);
    assert_eq!(report.age.as_ref().unwrap().total(), 3);
    assert_eq!(report.monthly.as_ref().unwrap().total(), 3);
}

#[tokio::test]
async fn test_charts_fall_back_when_analytics_route_is_rejected() {
    let (state, services, _) = logged_in().await;
    state.lock().unwrap().analytics_error = Some(StatusCode::BAD_REQUEST);
    seed(&state, sample(today(), "A", 10, Gender::Male));

    let mut view = ChartsView::new(services.analytics.clone(), AnalyticsOptions::default());
    assert!(view.load().await.is_none());

    let report = view.report().unwrap();
    assert_eq!(report.source, ReportSource::ClientAggregation);
    assert_eq!(report.summary.total_prescriptions, 1);
}

#[tokio::test]
async fn test_charts_server_error_is_reported() {
    let (state, services, _) = logged_in().await;
    state.lock().unwrap().analytics_error = Some(StatusCode::INTERNAL_SERVER_ERROR);

    let mut view = ChartsView::new(services.analytics.clone(), AnalyticsOptions::default());
    let note = view.load().await.expect("expected a notification");

    assert_eq!(note.message, "Error loading analytics");
    assert!(view.report().is_none());
}

#[tokio::test]
async fn test_oversized_chart_window_is_rejected_before_any_request() {
    let (state, services, _) = logged_in().await;
    let before = state.lock().unwrap().requests.len();

    let options = AnalyticsOptions {
        daily_window_days: 100_000_000,
        ..AnalyticsOptions::default()
    };
    let mut view = ChartsView::new(services.analytics.clone(), options);
    let note = view.load().await.expect("expected a notification");

    assert_eq!(note.code, ErrorCode::BadValue);
    assert_eq!(state.lock().unwrap().requests.len(), before);
}

#[tokio::test]
async fn test_client_source_skips_analytics_endpoint() {
    let (state, services, _) = logged_in().await;
    seed(&state, sample(today(), "A", 10, Gender::Male));

    let options = AnalyticsOptions {
        source: AnalyticsSource::Client,
        ..AnalyticsOptions::default()
    };
    let mut view = ChartsView::new(services.analytics.clone(), options);
    assert!(view.load().await.is_none());

    assert_eq!(view.report().unwrap().source, ReportSource::ClientAggregation);
    assert_eq!(request_count(&state, "GET /api/prescriptions/analytics"), 0);
}

#[tokio::test]
async fn test_cli_commands_end_to_end() {
    let (state, services, base_url) = setup().await;
    let mut config = AppConfig::default();
    config.api.base_url = base_url;
    let app = AppState::new(config, services);

    let mut out = Vec::new();
    let err = cli::run(&app, Command::Status, &mut out).await;
    assert!(err.is_ok());
    assert!(String::from_utf8_lossy(&out).contains("Not logged in"));

    let err = cli::run(
        &app,
        Command::List {
            page: 0,
            size: None,
            start_date: None,
            end_date: None,
        },
        &mut Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotLoggedIn);

    let login = Command::Login {
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
    };
    cli::run(&app, login, &mut Vec::new()).await.unwrap();

    let create = Command::Create(PrescriptionArgs {
        name: Some("Ada Lovelace".to_string()),
        age: Some(36),
        gender: Some(Gender::Female),
        diagnosis: Some("Migraine".to_string()),
        medicines: Some("Ibuprofen".to_string()),
        next_visit: Some(today() + Duration::days(7)),
        ..PrescriptionArgs::default()
    });
    let mut out = Vec::new();
    cli::run(&app, create, &mut out).await.unwrap();
    let printed = String::from_utf8_lossy(&out).to_string();
    assert!(printed.contains("Prescription created successfully"));
    assert!(printed.contains("Prescription date: 2025-01-10"));
    assert_eq!(state.lock().unwrap().records.len(), 1);

    let before = request_count(&state, "GET /api/prescriptions?");
    let list = Command::List {
        page: 1,
        size: Some(5),
        start_date: None,
        end_date: None,
    };
    let mut out = Vec::new();
    cli::run(&app, list, &mut out).await.unwrap();
    assert_eq!(request_count(&state, "GET /api/prescriptions?"), before + 1);
    assert!(state
        .lock()
        .unwrap()
        .requests
        .last()
        .unwrap()
        .ends_with("page=1&size=5"));
    assert!(String::from_utf8_lossy(&out).contains("(1 prescriptions)"));

    let invalid = Command::Create(PrescriptionArgs::default());
    let err = cli::run(&app, invalid, &mut Vec::new()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadValue);

    let mut out = Vec::new();
    let charts = Command::Charts {
        window: None,
        months: None,
        source: None,
    };
    cli::run(&app, charts, &mut out).await.unwrap();
    let printed = String::from_utf8_lossy(&out).to_string();
    assert!(printed.contains("Total prescriptions:     1"));
    assert!(printed.contains("Daily Prescriptions (Last 7 Days)"));

    let err = cli::run(&app, Command::Delete { id: 42 }, &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchPrescription);
}

// Live server tests, run manually with `cargo test -- --ignored`

const LIVE_BASE_URL: &str = "http://localhost:8080";

#[tokio::test]
#[ignore]
async fn test_live_login_and_list() {
    let api = ApiClient::new(&ApiConfig {
        base_url: LIVE_BASE_URL.to_string(),
        timeout_secs: 10,
    })
    .unwrap();
    let services = Services::new(api, Arc::new(MemoryStore::new()), Arc::new(FixedClock(today())));

    services.session.login(USERNAME, PASSWORD).await.unwrap();
    let mut list = PrescriptionListView::new(services.prescriptions.clone(), 10);
    assert!(list.load(0).await.is_none());
}
