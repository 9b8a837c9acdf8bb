use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct PeriodBody {
    name: String,
    #[serde(default)]
    principle: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlatBody {
    periods: Vec<PeriodBody>,
    current_period_number: usize,
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct BusinessRefBody {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct BusinessCycleBody {
    business: BusinessRefBody,
    periods: Vec<PeriodBody>,
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct BusinessListBody {
    business_cycles: Vec<BusinessCycleBody>,
}

#[derive(Debug, Deserialize)]
struct ViewBody {
    progress: f64,
    period_name: String,
    periods: Vec<PeriodBody>,
}

#[derive(Debug, Deserialize)]
struct CycleViewBody {
    view: ViewBody,
    ring_html: String,
    cards_html: String,
    summary_html: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("lifecycles_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/user_cycle/daily/"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_lifecycles"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

/// GET / and pull the csrftoken value out of the Set-Cookie header.
async fn fetch_csrf_token(client: &Client, base_url: &str) -> String {
    let response = client.get(base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("index should set a csrftoken cookie")
        .to_str()
        .unwrap()
        .to_string();
    let token = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("csrftoken="))
        .expect("malformed csrftoken cookie");
    token.to_string()
}

#[tokio::test]
async fn http_daily_cycle_has_seven_periods() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: FlatBody = client
        .get(format!("{}/api/user_cycle/daily/", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.periods.len(), 7);
    assert!((1..=7).contains(&body.current_period_number));
    assert!((0.0..=100.0).contains(&body.progress));
    assert_eq!(body.periods[0].name, "The Morning Period");
    assert!(body.periods[0].principle.is_some());
}

#[tokio::test]
async fn http_unknown_cycle_type_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/user_cycle/cosmic/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unsupported_cycle_type");
}

#[tokio::test]
async fn http_profile_update_unlocks_birth_cycles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = client
        .get(format!("{}/api/user_cycle/human/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(before.status(), 400);
    let body: serde_json::Value = before.json().await.unwrap();
    assert_eq!(body["error"], "birth_date_missing");

    // a future birth date is rejected with field errors
    let future = reqwest::multipart::Form::new().text("date_of_birth", "2999-01-01");
    let rejected = client
        .post(format!("{}/profile/update/", server.base_url))
        .header("X-Requested-With", "XMLHttpRequest")
        .multipart(future)
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);
    let body: serde_json::Value = rejected.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["date_of_birth"].is_string());

    let form = reqwest::multipart::Form::new()
        .text("date_of_birth", "1990-04-12")
        .text("timezone", "UTC");
    let updated = client
        .post(format!("{}/profile/update/", server.base_url))
        .header("X-Requested-With", "XMLHttpRequest")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(updated.status().is_success());
    let body: serde_json::Value = updated.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["date_of_birth"], "1990-04-12");

    for cycle in ["human", "yearly", "health", "reincarnation"] {
        let after: FlatBody = client
            .get(format!("{}/api/user_cycle/{cycle}/", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(!after.periods.is_empty(), "{cycle} should have periods");
        assert!((0.0..=100.0).contains(&after.progress));
    }
}

#[tokio::test]
async fn http_business_add_and_delete_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/businesses/add/", server.base_url))
        .form(&[("name", "Acme"), ("establishment_date", "2020-01-15")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["success"], true);
    let id = created["id"].as_u64().expect("created business id");

    let listed: BusinessListBody = client
        .get(format!("{}/api/user_cycle/business/", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let record = listed
        .business_cycles
        .iter()
        .find(|item| item.business.id == id)
        .expect("new business should appear in the cycle list");
    assert_eq!(record.business.name, "Acme");
    assert_eq!(record.periods.len(), 7);
    assert!((0.0..=100.0).contains(&record.progress));

    // narrowing to one business returns a single-item list
    let narrowed: BusinessListBody = client
        .get(format!(
            "{}/api/user_cycle/business/?business_id={id}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(narrowed.business_cycles.len(), 1);

    let missing = client
        .get(format!(
            "{}/api/user_cycle/business/?business_id=999999",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    // a delete without the CSRF token is refused and changes nothing
    let refused = client
        .post(format!("{}/businesses/{id}/delete/json/", server.base_url))
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), 403);

    let token = fetch_csrf_token(&client, &server.base_url).await;
    let deleted: serde_json::Value = client
        .post(format!("{}/businesses/{id}/delete/json/", server.base_url))
        .header("X-Requested-With", "XMLHttpRequest")
        .header("X-CSRFToken", &token)
        .header("Cookie", format!("csrftoken={token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["success"], true);

    let remaining: BusinessListBody = client
        .get(format!("{}/api/user_cycle/business/", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(remaining
        .business_cycles
        .iter()
        .all(|item| item.business.id != id));
}

#[tokio::test]
async fn http_cycle_view_returns_rendered_fragments() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: CycleViewBody = client
        .get(format!("{}/api/cycle_view/soul/", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!((0.0..=100.0).contains(&body.view.progress));
    assert!(!body.view.period_name.is_empty());
    assert_eq!(body.view.periods.len(), 7);
    assert!(body.ring_html.contains("<svg"));
    assert!(body.ring_html.contains("stroke-dashoffset"));
    assert!(body.cards_html.contains("period-card"));
    assert!(body.cards_html.contains("data-period-id"));
    assert!(body.summary_html.contains(&body.view.period_name));
}

#[tokio::test]
async fn http_index_serves_dashboard_shell() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client.get(&server.base_url).send().await.unwrap();
    assert!(response.status().is_success());
    let has_cookie = response.headers().get("set-cookie").is_some();
    let html = response.text().await.unwrap();

    assert!(has_cookie);
    assert!(html.contains(r#"id="cycleRing""#));
    assert!(html.contains(r#"id="fullTemplateModal""#));
    assert!(html.contains(r#"data-cycle="soul""#));
    assert!(html.contains(r#"id="toastContainer""#));
}
