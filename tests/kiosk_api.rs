mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use foodbot::kiosk::{
    CardRegistration, HttpKioskApi, KioskApi, KioskController, KioskDisplay, KioskError,
    MenuChoice, MenuChoiceSession, MenuView, PersonalNumberRegistration, StatusMessage,
};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Captured {
    path: &'static str,
    headers: HeaderMap,
    body: String,
    query: Option<String>,
}

type Log = Arc<Mutex<Vec<Captured>>>;

fn capture(log: &Log, path: &'static str, headers: HeaderMap, body: String, query: Option<String>) {
    log.lock().unwrap().push(Captured {
        path,
        headers,
        body,
        query,
    });
}

async fn rfid_scan(State(log): State<Log>) -> Json<Value> {
    capture(&log, "/rfid_scan", HeaderMap::new(), String::new(), None);
    Json(json!({"card_id": "ABC123"}))
}

async fn register(State(log): State<Log>, headers: HeaderMap, body: String) -> Json<Value> {
    let resolving = body.contains("menu_choice");
    capture(&log, "/register", headers, body, None);
    if resolving {
        Json(json!({"status": "success", "message": "Max, du bist angemeldet!", "name": "Soup"}))
    } else {
        Json(json!({"need_menu_choice": true, "user_id": 7, "menu1": "Soup", "menu2": "Salad"}))
    }
}

async fn api_register(
    State(log): State<Log>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let number = body["personal_number"].as_str().unwrap_or_default().to_string();
    capture(&log, "/api/register", headers, body.to_string(), None);
    if number == "4711" {
        (
            StatusCode::OK,
            Json(json!({"success": true, "registered": true, "user": {"name": "Erika"}})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "User nicht gefunden"})),
        )
    }
}

async fn menu_data(State(log): State<Log>, RawQuery(query): RawQuery) -> Json<Value> {
    capture(&log, "/menu/data", HeaderMap::new(), String::new(), query);
    Json(json!({"zwei_menues_aktiv": false, "menu1": null, "menu2": null, "menu": "Pasta Bolognese"}))
}

async fn backend() -> (String, Log) {
    let log = Log::default();
    let router = Router::new()
        .route("/rfid_scan", get(rfid_scan))
        .route("/register", post(register))
        .route("/api/register", post(api_register))
        .route("/menu/data", get(menu_data))
        .with_state(log.clone());
    (common::spawn_backend(router).await, log)
}

fn requests(log: &Log, path: &str) -> Vec<Captured> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|c| c.path == path)
        .cloned()
        .collect()
}

#[tokio::test]
async fn test_card_registration_is_a_marked_form_post() {
    let (base, log) = backend().await;
    let api = HttpKioskApi::new(&base).unwrap();

    let scan = api.scan().await.unwrap();
    assert_eq!(scan.card(), Some("ABC123"));

    let reply = api
        .register_card(&CardRegistration::scan("ABC123"))
        .await
        .unwrap();
    assert!(reply.needs_menu_choice());

    let posts = requests(&log, "/register");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body, "card_id=ABC123");
    assert_eq!(
        posts[0].headers["content-type"],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(posts[0].headers["x-requested-with"], "XMLHttpRequest");
    assert_eq!(posts[0].headers["accept"], "application/json");
}

#[tokio::test]
async fn test_unknown_personal_number_reads_error_body() {
    let (base, log) = backend().await;
    let api = HttpKioskApi::new(&base).unwrap();

    let reply = api
        .register_personal_number(&PersonalNumberRegistration::new("0000"))
        .await
        .unwrap();

    assert!(!reply.is_success());
    assert_eq!(reply.message.as_deref(), Some("User nicht gefunden"));
    let posts = requests(&log, "/api/register");
    assert_eq!(posts[0].headers["content-type"], "application/json");
    assert_eq!(posts[0].body, r#"{"personal_number":"0000"}"#);
}

#[tokio::test]
async fn test_menu_request_busts_caches() {
    let (base, log) = backend().await;
    let api = HttpKioskApi::new(&base).unwrap();

    let snapshot = api.menu().await.unwrap();
    assert_eq!(snapshot.view(), MenuView::Single("Pasta Bolognese".into()));

    let query = requests(&log, "/menu/data")[0].query.clone().unwrap();
    let millis: i64 = query.strip_prefix("t=").unwrap().parse().unwrap();
    assert!(millis > 0);
}

#[tokio::test]
async fn test_unreachable_backend_is_an_error() {
    let api = HttpKioskApi::new(&common::dead_backend().await).unwrap();

    assert!(matches!(api.scan().await, Err(KioskError::Http(_))));
    assert!(api.menu().await.is_err());
}

#[derive(Default)]
struct Screen {
    statuses: Mutex<Vec<StatusMessage>>,
    choices: Mutex<Vec<(String, String)>>,
}

impl KioskDisplay for Screen {
    fn show_status(&self, status: &StatusMessage) {
        self.statuses.lock().unwrap().push(status.clone());
    }

    fn hide_status(&self) {}

    fn show_menu_choice(&self, menu1: &str, menu2: &str) {
        self.choices
            .lock()
            .unwrap()
            .push((menu1.to_string(), menu2.to_string()));
    }

    fn hide_menu_choice(&self) {}

    fn render_menu(&self, _view: &MenuView) {}

    fn set_input_visible(&self, _visible: bool) {}
}

#[tokio::test]
async fn test_kiosk_resolves_card_choice_against_backend() {
    let (base, log) = backend().await;
    let screen = Arc::new(Screen::default());
    let mut kiosk = KioskController::new(
        HttpKioskApi::new(&base).unwrap(),
        screen.clone(),
        Duration::from_secs(3),
    );

    kiosk.poll_rfid().await;
    assert!(matches!(
        kiosk.session(),
        MenuChoiceSession::CardPending { .. }
    ));
    assert_eq!(
        screen.choices.lock().unwrap().clone(),
        vec![("Soup".to_string(), "Salad".to_string())]
    );

    kiosk.select_menu(MenuChoice::First).await;

    let posts = requests(&log, "/register");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].body, "user_id=7&card_id=ABC123&menu_choice=1");
    assert_eq!(kiosk.session(), &MenuChoiceSession::None);
    assert_eq!(
        screen.statuses.lock().unwrap()[0].title,
        "Max, du bist angemeldet!"
    );
    assert_eq!(requests(&log, "/menu/data").len(), 1);
}
