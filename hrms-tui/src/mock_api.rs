//! In-process stand-in for the HRMS API, for tests.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use hrms_lib::HrmsClient;
use hrms_lib::retry::RetryConfig;

/// `(method, path, query, body)` of a request the server saw.
pub type Seen = (String, String, Option<String>, String);

pub type Route = Arc<dyn Fn(&str, &str) -> (u16, String) + Send + Sync>;

pub struct MockApi {
    pub client: HrmsClient,
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockApi {
    pub async fn start(route: Route) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let route = Arc::clone(&route);
                        let log = Arc::clone(&log);
                        async move {
                            let method = req.method().to_string();
                            let path = req.uri().path().to_string();
                            let query = req.uri().query().map(str::to_string);
                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|b| b.to_bytes())
                                .unwrap_or_default();
                            let (status, reply) = route(&method, &path);
                            log.lock().unwrap().push((
                                method,
                                path,
                                query,
                                String::from_utf8_lossy(&body).to_string(),
                            ));

                            let mut response = Response::new(Full::new(Bytes::from(reply)));
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
            .base_url(format!("http://{addr}/api/"))
            .timeout(Duration::from_secs(5))
            .retry(RetryConfig::no_retry())
            .build()
            .unwrap();
        Self { client, seen }
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(method, path, _, _)| (method.clone(), path.clone()))
            .collect()
    }
}

pub const RECORDS: &str = r#"[
    {"id": 7, "employee": 2, "employee_name": "Bob Stone", "employee_emp_id": "EMP002",
     "employee_department": "Engineering", "date": "2025-02-10", "status": "Absent"},
    {"id": 6, "employee": 1, "employee_name": "Alice Moreau", "employee_emp_id": "EMP001",
     "employee_department": "HR", "date": "2025-02-10", "status": "Present"}
]"#;

pub const STATS: &str =
    r#"{"total_employees": 2, "present_today": 1, "absent_today": 1, "not_marked_today": 0}"#;

pub const EMPLOYEES: &str = r#"[
    {"id": 1, "employee_id": "EMP001", "full_name": "Alice Moreau", "email": "alice@example.com",
     "department": "HR", "created_at": "2025-01-02T08:00:00Z"},
    {"id": 2, "employee_id": "EMP002", "full_name": "Bob Stone", "email": "bob@example.com",
     "department": "Engineering", "created_at": "2025-01-03T08:00:00Z"}
]"#;

pub const PATCHED: &str = r#"{"id": 7, "employee": 2, "employee_name": "Bob Stone",
    "employee_emp_id": "EMP002", "employee_department": "Engineering",
    "date": "2025-02-10", "status": "Present"}"#;

/// A healthy API: lists, stats and updates all succeed.
pub fn healthy() -> Route {
    Arc::new(|method, path| match (method, path) {
        ("GET", "/api/attendance/") => (200, RECORDS.to_string()),
        ("GET", "/api/attendance/dashboard_stats/") => (200, STATS.to_string()),
        ("GET", "/api/employees/") => (200, EMPLOYEES.to_string()),
        ("PATCH", _) => (200, PATCHED.to_string()),
        _ => (404, r#"{"detail": "Not found."}"#.to_string()),
    })
}
