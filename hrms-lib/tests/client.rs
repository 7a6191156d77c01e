//! Client tests against a local mock API server.
//!
//! Each test binds a hyper server on `127.0.0.1:0`, points an `HrmsClient`
//! at it and inspects the requests the server recorded.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use hrms_lib::model::{AttendanceFilter, AttendanceStatus, NewAttendance};
use hrms_lib::retry::RetryConfig;
use hrms_lib::{Error, HrmsClient};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    body: String,
}

type Handler = Arc<dyn Fn(&Recorded) -> (u16, String) + Send + Sync>;

async fn serve(handler: Handler) -> (HrmsClient, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let server_log = Arc::clone(&log);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&server_log);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let handler = Arc::clone(&handler);
                    let log = Arc::clone(&log);
                    async move {
                        let method = req.method().to_string();
                        let path = req.uri().path().to_string();
                        let query = req.uri().query().map(str::to_string);
                        let bytes = req
                            .into_body()
                            .collect()
                            .await
                            .map(|body| body.to_bytes())
                            .unwrap_or_default();
                        let recorded = Recorded {
                            method,
                            path,
                            query,
                            body: String::from_utf8_lossy(&bytes).to_string(),
                        };

                        let (status, body) = handler(&recorded);
                        log.lock().unwrap().push(recorded);

                        let mut response = Response::new(Full::new(Bytes::from(body)));
                        *response.status_mut() = StatusCode::from_u16(status).unwrap();
                        response
                            .headers_mut()
                            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                        Ok::<_, Infallible>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    let client = HrmsClient::builder()
        .base_url(format!("http://{addr}/api"))
        .timeout(Duration::from_secs(5))
        .retry(
            RetryConfig::default()
                .max_retries(2)
                .initial_delay(Duration::from_millis(1)),
        )
        .build()
        .unwrap();
    (client, log)
}

fn respond(status: u16, body: impl Into<String>) -> Handler {
    let body = body.into();
    Arc::new(move |_| (status, body.clone()))
}

const EMPLOYEES: &str = r#"[
    {"id": 1, "employee_id": "EMP001", "full_name": "Alice Moreau", "email": "alice@example.com",
     "department": "HR", "created_at": "2025-01-02T08:00:00Z"},
    {"id": 2, "employee_id": "EMP002", "full_name": "Bob Stone", "email": "bob@example.com",
     "department": "Engineering", "created_at": "2025-01-03T08:00:00Z"}
]"#;

const RECORD: &str = r#"{"id": 7, "employee": 2, "employee_name": "Bob Stone",
    "employee_emp_id": "EMP002", "employee_department": "Engineering",
    "date": "2025-02-10", "status": "Absent"}"#;

// =============================================================================
// Employees
// =============================================================================

#[tokio::test]
async fn test_list_employees_sends_search() {
    let (client, log) = serve(respond(200, EMPLOYEES)).await;

    let employees = client.list_employees(Some("  eng ")).await.unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[1].full_name, "Bob Stone");

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "GET");
    assert_eq!(log[0].path, "/api/employees/");
    assert_eq!(log[0].query.as_deref(), Some("search=eng"));
}

#[tokio::test]
async fn test_blank_search_is_omitted() {
    let (client, log) = serve(respond(200, "[]")).await;
    client.list_employees(Some("   ")).await.unwrap();
    assert_eq!(log.lock().unwrap()[0].query, None);
}

#[tokio::test]
async fn test_duplicate_employee_message() {
    let (client, _log) = serve(respond(
        400,
        r#"{"employee_id": ["employee with this employee id already exists."]}"#,
    ))
    .await;

    let error = client
        .add_employee(&hrms_lib::model::NewEmployee {
            employee_id: "EMP001".to_string(),
            full_name: "Alice Again".to_string(),
            email: "alice2@example.com".to_string(),
            department: "HR".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), Some(400));
    assert_eq!(
        error.user_message(&["employee_id", "email"], "Failed to add employee."),
        "employee with this employee id already exists."
    );
}

#[tokio::test]
async fn test_delete_employee_no_content() {
    let (client, log) = serve(respond(204, "")).await;
    client.delete_employee(4).await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "DELETE");
    assert_eq!(log[0].path, "/api/employees/4/");
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn test_list_attendance_filter_query() {
    let (client, log) = serve(respond(200, format!("[{RECORD}]"))).await;

    let filter = AttendanceFilter::new()
        .employee(2)
        .start_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    let records = client.list_attendance(&filter).await.unwrap();

    assert_eq!(records[0].id, 7);
    assert_eq!(
        log.lock().unwrap()[0].query.as_deref(),
        Some("employee_id=2&start_date=2025-02-01")
    );
}

#[tokio::test]
async fn test_update_attendance_patches_status() {
    let (client, log) = serve(respond(200, RECORD)).await;

    let record = client
        .update_attendance(7, AttendanceStatus::Absent)
        .await
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Absent);

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "PATCH");
    assert_eq!(log[0].path, "/api/attendance/7/");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&log[0].body).unwrap(),
        serde_json::json!({"status": "Absent"})
    );
}

#[tokio::test]
async fn test_future_attendance_rejected_without_request() {
    let (client, log) = serve(respond(201, RECORD)).await;
    let tomorrow = Local::now().date_naive().checked_add_days(Days::new(1)).unwrap();

    let result = client
        .mark_attendance(&NewAttendance {
            employee: 2,
            date: tomorrow,
            status: AttendanceStatus::Present,
        })
        .await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_attendance_message() {
    let (client, _log) = serve(respond(
        400,
        r#"{"non_field_errors": ["Attendance already marked as 'Present' for this employee on 2025-02-10. Use the Edit button to update the existing record."]}"#,
    ))
    .await;

    let error = client
        .mark_attendance(&NewAttendance {
            employee: 2,
            date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            status: AttendanceStatus::Absent,
        })
        .await
        .unwrap_err();

    assert!(
        error
            .user_message(&["date", "employee"], "Failed to mark attendance.")
            .starts_with("Attendance already marked")
    );
}

#[tokio::test]
async fn test_missing_record_detail() {
    let (client, _log) = serve(respond(404, r#"{"detail": "No Attendance matches the given query."}"#)).await;

    let error = client
        .update_attendance(99, AttendanceStatus::Present)
        .await
        .unwrap_err();
    assert_eq!(
        error.user_message(&[], "Update failed."),
        "No Attendance matches the given query."
    );
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (client, log) = serve(respond(
        200,
        r#"{"total_employees": 5, "present_today": 3, "absent_today": 1, "not_marked_today": 1}"#,
    ))
    .await;

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.present_today, 3);
    assert_eq!(stats.not_marked_today, 1);
    assert_eq!(log.lock().unwrap()[0].path, "/api/attendance/dashboard_stats/");
}

#[tokio::test]
async fn test_statistics_path() {
    let (client, log) = serve(respond(200, "[]")).await;
    let stats = client
        .attendance_statistics(&AttendanceFilter::new().employee(1))
        .await
        .unwrap();
    assert!(stats.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log[0].path, "/api/attendance/statistics/");
    assert_eq!(log[0].query.as_deref(), Some("employee_id=1"));
}

// =============================================================================
// Retry and decoding
// =============================================================================

#[tokio::test]
async fn test_get_retried_after_server_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let handler: Handler = Arc::new(move |_| {
        if c.fetch_add(1, Ordering::SeqCst) == 0 {
            (503, String::new())
        } else {
            (200, "[]".to_string())
        }
    });
    let (client, _log) = serve(handler).await;

    assert!(client.list_employees(None).await.unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let (client, log) = serve(respond(500, "")).await;

    let error = client.dashboard_stats().await.unwrap_err();
    assert_eq!(error.status_code(), Some(500));
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_patch_not_retried() {
    let (client, log) = serve(respond(502, "")).await;

    let error = client
        .update_attendance(7, AttendanceStatus::Absent)
        .await
        .unwrap_err();
    assert_eq!(error.status_code(), Some(502));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_json_is_parse_error() {
    let (client, _log) = serve(respond(200, "{not json")).await;

    let error = client.dashboard_stats().await.unwrap_err();
    assert!(matches!(
        error,
        Error::Api(hrms_lib::ApiError::Parse { body: Some(_), .. })
    ));
}
