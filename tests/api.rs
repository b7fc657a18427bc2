use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use serde_json::{json, Value};

use studio_backend::api;
use studio_backend::email::{NotificationError, NotificationSender};
use studio_backend::models::{ContactFormRequest, Order};
use studio_backend::security::rate_limit::{IpRateLimiter, RateLimit};
use studio_backend::AppState;

/// Captures dispatched notifications instead of sending them; can be told
/// to fail so dispatch-failure paths are testable.
struct RecordingSender {
    contacts: Mutex<Vec<ContactFormRequest>>,
    fail: bool,
}

impl RecordingSender {
    fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

impl NotificationSender for RecordingSender {
    fn send_order_confirmation(&self, _order: &Order) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Dispatch("smtp unavailable".to_string()));
        }
        Ok(())
    }

    fn send_contact_form(&self, form: &ContactFormRequest) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Dispatch("smtp unavailable".to_string()));
        }
        self.contacts
            .lock()
            .expect("contacts lock")
            .push(ContactFormRequest {
                name: form.name.clone(),
                email: form.email.clone(),
                phone: form.phone.clone(),
                message: form.message.clone(),
                language: form.language.clone(),
            });
        Ok(())
    }
}

/// App state over a pool that never checks out a live connection. The tests
/// here exercise the surface that does not touch the database.
fn test_state(sender: Arc<RecordingSender>, admin_token: &str) -> web::Data<AppState> {
    let manager = ConnectionManager::<PgConnection>::new("postgres://localhost:1/unused");
    let pool = Pool::builder().max_size(1).build_unchecked(manager);
    web::Data::new(AppState {
        pool,
        sender,
        admin_token: admin_token.to_string(),
    })
}

fn contact_body() -> Value {
    json!({
        "name": "Анна",
        "email": "anna@example.com",
        "phone": "+7 900 000-00-00",
        "message": "Здравствуйте, хочу заказать гравировку",
    })
}

#[actix_web::test]
async fn contact_form_dispatches_and_confirms_in_russian() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender.clone(), ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(contact_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["message"], json!("Сообщение успешно отправлено"));

    let recorded = sender.contacts.lock().expect("contacts lock");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].email, "anna@example.com");
    assert_eq!(recorded[0].language.as_deref(), Some("ru"));
}

#[actix_web::test]
async fn contact_form_negotiates_language_from_header() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender.clone(), ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .insert_header(("Accept-Language", "en-GB,en;q=0.9"))
        .set_json(contact_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["message"], json!("Message sent successfully"));

    let recorded = sender.contacts.lock().expect("contacts lock");
    assert_eq!(recorded[0].language.as_deref(), Some("en"));
}

#[actix_web::test]
async fn contact_form_reports_field_errors() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender.clone(), ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| e["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, vec!["name", "email", "phone", "message"]);
    assert!(sender.contacts.lock().expect("contacts lock").is_empty());
}

#[actix_web::test]
async fn contact_form_rejects_malformed_email() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let mut body = contact_body();
    body["email"] = json!("not-an-email");
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], json!("email"));
    assert_eq!(body["errors"][0]["message"], json!("Некорректный формат email"));
}

#[actix_web::test]
async fn contact_form_dispatch_failure_is_a_server_error() {
    let sender = Arc::new(RecordingSender::failing());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(contact_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Ошибка при отправке сообщения"));
}

#[actix_web::test]
async fn order_validation_runs_before_any_database_work() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(json!({ "email": "broken" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| e["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, vec!["name", "email", "phone"]);
}

#[actix_web::test]
async fn mutating_endpoints_require_the_admin_token() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, "secret-token"))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let no_token = test::TestRequest::post()
        .uri("/api/products")
        .set_json(json!({ "category_id": 1, "translations": {} }))
        .to_request();
    let resp = test::call_service(&app, no_token).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let wrong_token = test::TestRequest::delete()
        .uri("/api/gallery/3")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, wrong_token).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Требуется авторизация"));
}

#[actix_web::test]
async fn empty_configured_token_locks_out_all_mutations() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/gallery")
        .insert_header(("Authorization", "Bearer "))
        .set_json(json!({ "category_id": 1, "translations": {} }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_json_gets_the_standard_envelope() {
    let sender = Arc::new(RecordingSender::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Некорректный формат запроса"));
}

#[actix_web::test]
async fn requests_over_the_burst_are_rejected() {
    let sender = Arc::new(RecordingSender::new());
    let limiter = Arc::new(IpRateLimiter::new(0.0, 2, 64));
    let app = test::init_service(
        App::new()
            .wrap(RateLimit(limiter))
            .app_data(test_state(sender, ""))
            .app_data(api::json_config())
            .configure(api::configure),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/contact")
            .set_json(contact_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(contact_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        json!("Превышено ограничение скорости запросов. Пожалуйста, повторите позже.")
    );
}
