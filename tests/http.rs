use activity_signup::errors::ErrorKind;
use activity_signup::models::{Activity, LoginRequest};
use activity_signup::{
    ActivityClient, Dialogs, DirectoryApi, HttpDirectory, MemorySessionStore, Reply,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::io::Write;
use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

const TEACHER: &str = "teacher";
const PASSWORD: &str = "secret";
const TOKEN: &str = "tok-teacher";

static SEED: Lazy<Value> = Lazy::new(|| {
    json!({
        "Chess Club": {
            "description": "Learn strategies and compete in chess tournaments",
            "schedule": "Fridays, 3:30 PM - 5:00 PM",
            "max_participants": 12,
            "participants": ["michael@mergington.edu", "daniel@mergington.edu"]
        },
        "Art Studio": {
            "description": "Painting and drawing",
            "schedule": "Tuesdays, 4:00 PM - 5:30 PM",
            "max_participants": 2,
            "participants": []
        },
        "Programming Class": {
            "description": "Learn programming fundamentals",
            "schedule": "Mondays, 3:30 PM - 4:30 PM",
            "max_participants": 20,
            "participants": ["emma@mergington.edu"]
        }
    })
});

#[derive(Default)]
struct MockState {
    activities: Vec<(String, Activity)>,
    logouts: usize,
}

/// Stand-in for the Activity Directory Service.
#[derive(Clone)]
struct MockDirectory {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: String,
}

impl MockDirectory {
    fn seeded() -> Self {
        let activities = SEED
            .as_object()
            .unwrap()
            .iter()
            .map(|(name, details)| {
                (
                    name.clone(),
                    serde_json::from_value::<Activity>(details.clone()).unwrap(),
                )
            })
            .collect();
        Self {
            state: Arc::new(Mutex::new(MockState {
                activities,
                logouts: 0,
            })),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/activities", get(list_activities))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/activities/:name/signup", post(signup))
            .route("/activities/:name/unregister", delete(unregister))
            .with_state(self.clone())
    }

    fn participants(&self, name: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .activities
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, activity)| activity.participants.clone())
            .unwrap_or_default()
    }

    fn logouts(&self) -> usize {
        self.state.lock().unwrap().logouts
    }
}

fn detail(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "detail": text }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(TOKEN)
}

async fn list_activities(State(mock): State<MockDirectory>) -> Json<Map<String, Value>> {
    let state = mock.state.lock().unwrap();
    let mut map = Map::new();
    for (name, activity) in &state.activities {
        map.insert(name.clone(), serde_json::to_value(activity).unwrap());
    }
    Json(map)
}

async fn login(Json(request): Json<LoginRequest>) -> Response {
    if request.username == TEACHER && request.password == PASSWORD {
        Json(json!({ "token": TOKEN, "username": TEACHER })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Invalid username or password")
    }
}

async fn logout(State(mock): State<MockDirectory>) -> StatusCode {
    mock.state.lock().unwrap().logouts += 1;
    StatusCode::OK
}

async fn signup(
    State(mock): State<MockDirectory>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let mut state = mock.state.lock().unwrap();
    let Some((_, activity)) = state.activities.iter_mut().find(|(n, _)| *n == name) else {
        return detail(StatusCode::NOT_FOUND, "Activity not found");
    };
    if activity.participants.contains(&query.email) {
        return detail(StatusCode::BAD_REQUEST, "Student is already signed up");
    }
    activity.participants.push(query.email.clone());
    Json(json!({ "message": format!("Signed up {} for {}", query.email, name) })).into_response()
}

async fn unregister(
    State(mock): State<MockDirectory>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Authentication required");
    }
    let mut state = mock.state.lock().unwrap();
    let Some((_, activity)) = state.activities.iter_mut().find(|(n, _)| *n == name) else {
        return detail(StatusCode::NOT_FOUND, "Activity not found");
    };
    let before = activity.participants.len();
    activity.participants.retain(|email| *email != query.email);
    if activity.participants.len() == before {
        return detail(StatusCode::BAD_REQUEST, "Student is not signed up for this activity");
    }
    Json(json!({ "message": format!("Unregistered {} from {}", query.email, name) }))
        .into_response()
}

async fn spawn_directory() -> (Url, MockDirectory) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().unwrap();
    let mock = MockDirectory::seeded();
    let app = mock.router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base_url = Url::parse(&format!("http://{addr}")).unwrap();
    (base_url, mock)
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_session_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "activity_signup_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

struct AcceptAll;

impl Dialogs for AcceptAll {
    fn alert(&self, _text: &str) {}

    async fn confirm(&self, _text: &str) -> bool {
        true
    }
}

#[tokio::test]
async fn http_list_keeps_server_order() {
    let (base_url, _mock) = spawn_directory().await;
    let api = HttpDirectory::new(base_url);

    let activities = api.list_activities().await.unwrap();
    let names: Vec<&str> = activities.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Chess Club", "Art Studio", "Programming Class"]);
    assert_eq!(activities[0].1.spots_left(), 10);
}

#[tokio::test]
async fn http_login_reports_detail_on_rejection() {
    let (base_url, _mock) = spawn_directory().await;
    let api = HttpDirectory::new(base_url);

    let reply = api
        .login(&LoginRequest {
            username: TEACHER.into(),
            password: "wrong".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Rejected {
            status: 401,
            detail: Some("Invalid username or password".into()),
        }
    );

    let reply = api
        .login(&LoginRequest {
            username: TEACHER.into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    match reply {
        Reply::Accepted(resp) => {
            assert_eq!(resp.token, TOKEN);
            assert_eq!(resp.username, TEACHER);
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn http_signup_encodes_names_and_needs_token() {
    let (base_url, mock) = spawn_directory().await;
    let api = HttpDirectory::new(base_url);

    let reply = api
        .signup("stale", "Chess Club", "new+1@mergington.edu")
        .await
        .unwrap();
    assert!(matches!(reply, Reply::Rejected { status: 401, .. }));

    let reply = api
        .signup(TOKEN, "Chess Club", "new+1@mergington.edu")
        .await
        .unwrap();
    match reply {
        Reply::Accepted(resp) => {
            assert_eq!(resp.message, "Signed up new+1@mergington.edu for Chess Club")
        }
        other => panic!("unexpected reply: {other:?}"),
    }
    assert!(mock
        .participants("Chess Club")
        .contains(&"new+1@mergington.edu".to_string()));

    let reply = api
        .unregister(TOKEN, "Chess Club", "nobody@mergington.edu")
        .await
        .unwrap();
    assert_eq!(
        reply,
        Reply::Rejected {
            status: 400,
            detail: Some("Student is not signed up for this activity".into()),
        }
    );
}

#[tokio::test]
async fn http_unreachable_directory_is_transport_error() {
    let base_url = Url::parse(&format!("http://127.0.0.1:{}", pick_free_port())).unwrap();
    let api = HttpDirectory::new(base_url);
    let err = api.list_activities().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
}

#[tokio::test]
async fn http_client_login_signup_unregister_flow() {
    let (base_url, mock) = spawn_directory().await;
    let store = MemorySessionStore::default();
    let mut client = ActivityClient::new(HttpDirectory::new(base_url), store.clone(), AcceptAll);
    client.start().await;
    assert_eq!(client.snapshot().await.activities.cards().len(), 3);

    client.login(TEACHER, PASSWORD).await;
    assert_eq!(store.snapshot().auth_token.as_deref(), Some(TOKEN));

    client.signup("new@mergington.edu", "Art Studio").await;
    let page = client.snapshot().await;
    assert_eq!(page.message.text, "Signed up new@mergington.edu for Art Studio");
    let art = &page.activities.cards()[1];
    assert_eq!(art.name, "Art Studio");
    assert_eq!(art.spots_left, 1);
    assert!(art.participants[0].delete.is_some());

    client.unregister("Art Studio", "new@mergington.edu").await;
    let page = client.snapshot().await;
    assert_eq!(page.message.text, "Unregistered new@mergington.edu from Art Studio");
    assert!(page.activities.cards()[1].participants.is_empty());
    assert!(mock.participants("Art Studio").is_empty());
}

#[tokio::test]
async fn http_expired_token_logs_out() {
    let (base_url, mock) = spawn_directory().await;
    let store = MemorySessionStore::with_session("expired", TEACHER);
    let mut client = ActivityClient::new(HttpDirectory::new(base_url), store.clone(), AcceptAll);
    client.start().await;
    assert!(client.snapshot().await.auth.logged_in);

    client.unregister("Chess Club", "michael@mergington.edu").await;

    let page = client.snapshot().await;
    assert_eq!(page.message.text, "Authentication required");
    assert!(!page.auth.logged_in);
    assert!(store.snapshot().auth_token.is_none());
    assert_eq!(mock.logouts(), 1);
    assert!(mock
        .participants("Chess Club")
        .contains(&"michael@mergington.edu".to_string()));
}

fn run_binary(base_url: &Url, session_path: &str, script: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_activity_signup"))
        .env("ACTIVITY_API_URL", base_url.as_str())
        .env("ACTIVITY_SESSION_PATH", session_path)
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn client");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("client did not exit");
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn http_binary_persists_session_between_runs() {
    let (base_url, mock) = spawn_directory().await;
    let session_path = unique_session_path();
    let page_path = format!("{session_path}.html");
    let script = format!(
        "signup early@mergington.edu Chess Club\n\
         login teacher secret\n\
         signup new@mergington.edu Chess Club\n\
         html {page_path}\n\
         quit\n"
    );

    let first = {
        let base_url = base_url.clone();
        let session_path = session_path.clone();
        tokio::task::spawn_blocking(move || run_binary(&base_url, &session_path, &script))
            .await
            .unwrap()
    };
    assert!(first.contains("! You must be logged in as a teacher to register students."));
    assert!(first.contains("[Logged in as teacher]"));
    assert!(first.contains("(success) Signed up new@mergington.edu for Chess Club"));
    assert!(first.contains("  - new@mergington.edu [x]"));
    assert!(!mock
        .participants("Chess Club")
        .contains(&"early@mergington.edu".to_string()));

    assert!(first.contains(&format!("Wrote page to {page_path}")));
    let page = std::fs::read_to_string(&page_path).unwrap();
    assert!(page.contains(
        r#"<span id="user-status" class="logged-in">Logged in as teacher</span>"#
    ));
    assert!(page.contains(r#"data-activity="Chess Club" data-email="new@mergington.edu""#));

    let stored = std::fs::read_to_string(&session_path).unwrap();
    assert!(stored.contains("\"authToken\""));

    let second = {
        let base_url = base_url.clone();
        let session_path = session_path.clone();
        tokio::task::spawn_blocking(move || {
            run_binary(&base_url, &session_path, "account\ny\nquit\n")
        })
        .await
        .unwrap()
    };
    assert!(second.contains("[Logged in as teacher]"));
    assert!(second.contains("Logged in as teacher. Do you want to logout? [y/N]"));
    assert!(second.contains("[not logged in]"));
    assert!(!std::path::Path::new(&session_path).exists());
    assert_eq!(mock.logouts(), 1);
}
