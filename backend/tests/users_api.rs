//! End-to-end coverage of the users API over the in-memory store.
//!
//! Each test assembles the same application the server runs, minus metrics
//! and Swagger UI, and drives it through `actix_web::test`.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

use user_service::Trace;
use user_service::domain::ports::{UserEventPublisher, UserRepository};
use user_service::domain::{
    TRACE_ID_HEADER, UserEvent, UserId, UsersService, truncate_to_millis,
};
use user_service::inbound::http::{ErrorBody, HttpState, extractor_config, users};
use user_service::outbound::persistence::InMemoryUserRepository;
use user_service::test_support::{
    FailingUserEventPublisher, FixedClock, RecordingUserEventPublisher,
};

struct Harness {
    store: Arc<InMemoryUserRepository>,
    events: Arc<RecordingUserEventPublisher>,
}

#[fixture]
fn harness() -> Harness {
    Harness {
        store: Arc::new(InMemoryUserRepository::new()),
        events: Arc::new(RecordingUserEventPublisher::default()),
    }
}

fn state(store: Arc<dyn UserRepository>, publisher: Arc<dyn UserEventPublisher>) -> HttpState {
    let now = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let service = UsersService::new(store, publisher, Arc::new(FixedClock(now)));
    HttpState::from_service(Arc::new(service))
}

async fn app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(extractor_config)
            .wrap(Trace)
            .service(web::scope("/v1").configure(users::configure)),
    )
    .await
}

fn body(nickname: &str, country: &str) -> Value {
    json!({
        "first_name": format!("{nickname}-first"),
        "last_name": format!("{nickname}-last"),
        "nickname": nickname,
        "password": "s3cr3t",
        "email": format!("{nickname}@example.com"),
        "country": country,
    })
}

async fn create<S>(app: &S, payload: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/v1/users")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    test::read_body_json(response).await
}

fn id_of(user: &Value) -> String {
    user.get("id")
        .and_then(Value::as_str)
        .expect("user id")
        .to_owned()
}

#[rstest]
#[actix_web::test]
async fn create_publishes_created_event_with_stored_user(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;

    let user = create(&app, body("punisher", "US")).await;
    assert_eq!(user["created_at"], json!("2024-05-01T12:00:00.000Z"));
    assert_eq!(user["created_at"], user["updated_at"]);

    let events = harness.events.events();
    assert_eq!(events.len(), 1);
    let envelope = serde_json::to_value(&events[0]).expect("event encodes");
    assert_eq!(envelope["action"], json!("created"));
    assert_eq!(envelope["user_data"], user);
}

#[rstest]
#[actix_web::test]
async fn create_stamps_server_side_identifier_and_timestamps(harness: Harness) {
    let service = UsersService::new(
        harness.store.clone() as Arc<dyn UserRepository>,
        harness.events.clone() as Arc<dyn UserEventPublisher>,
        Arc::new(DefaultClock),
    );
    let app = app(HttpState::from_service(Arc::new(service))).await;
    let before = truncate_to_millis(Utc::now());

    let mut payload = body("punisher", "US");
    payload["id"] = json!(Uuid::nil());
    payload["created_at"] = json!("1999-01-01T00:00:00.000Z");
    let user = create(&app, payload).await;

    let id = Uuid::parse_str(&id_of(&user)).expect("uuid id");
    assert!(!id.is_nil());
    for field in ["created_at", "updated_at"] {
        let stamped: DateTime<Utc> = user[field]
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .expect("timestamp");
        assert!(stamped >= before, "{field} predates the request");
    }
    assert_eq!(harness.events.events().len(), 1);
}

#[rstest]
#[actix_web::test]
async fn invalid_create_is_rejected_without_side_effects(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    let mut payload = body("punisher", "US");
    payload["nickname"] = json!("");

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/v1/users")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let error: ErrorBody = test::read_body_json(response).await;
    assert_eq!(error.error, "nickname is required");
    assert!(harness.store.is_empty().await);
    assert!(harness.events.events().is_empty());
}

#[rstest]
#[actix_web::test]
async fn update_replaces_fields_and_keeps_created_at(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    let user = create(&app, body("punisher", "US")).await;
    let id = id_of(&user);

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/v1/users/{id}"))
            .set_json(body("frank", "UK"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(fetched["nickname"], json!("frank"));
    assert_eq!(fetched["country"], json!("UK"));
    assert_eq!(fetched["created_at"], user["created_at"]);

    let events = harness.events.events();
    assert_eq!(events.len(), 2);
    let UserEvent::Updated(updated) = &events[1] else {
        panic!("expected update event, got {:?}", events[1]);
    };
    assert_eq!(updated.details().nickname, "frank");
}

#[rstest]
#[actix_web::test]
async fn update_of_missing_user_is_not_found_and_silent(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/v1/users/{}", UserId::random()))
            .set_json(body("frank", "UK"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorBody = test::read_body_json(response).await;
    assert_eq!(error.error, "user not found");
    assert!(harness.events.events().is_empty());
}

#[rstest]
#[actix_web::test]
async fn update_of_undecodable_record_succeeds_without_event(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    let id = UserId::random();
    let Value::Object(document) = json!({ "id": id.to_string(), "created_at": "yesterday" }) else {
        panic!("object literal");
    };
    harness.store.insert_raw_document(id, document).await;

    let response = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/v1/users/{id}"))
            .set_json(body("frank", "UK"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(harness.events.events().is_empty());
}

#[rstest]
#[actix_web::test]
async fn delete_publishes_identifier_only_event(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    let id = id_of(&create(&app, body("punisher", "US")).await);

    let response = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let events = harness.events.events();
    assert_eq!(events.len(), 2);
    let envelope = serde_json::to_value(&events[1]).expect("event encodes");
    assert_eq!(
        envelope,
        json!({ "action": "deleted", "user_data": { "id": id } })
    );
}

#[rstest]
#[case("sortBy=nickname.asc&pageSize=2&page=0", &["alpha", "bravo"])]
#[case("sortBy=Nickname.DESC&pageSize=2&page=1", &["bravo", "alpha"])]
#[case("sortBy=nickname.asc&pageSize=0&page=3", &["alpha", "bravo", "charlie", "echo"])]
#[case("sortBy=nickname.asc&page=9", &[])]
#[actix_web::test]
async fn list_filters_sorts_and_paginates(
    harness: Harness,
    #[case] query: &str,
    #[case] expected: &[&str],
) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    for (nickname, country) in [
        ("echo", "UK"),
        ("alpha", "UK"),
        ("delta", "US"),
        ("charlie", "UK"),
        ("bravo", "UK"),
    ] {
        create(&app, body(nickname, country)).await;
    }

    let page: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/v1/users?country=UK&{query}"))
            .to_request(),
    )
    .await;
    let nicknames: Vec<&str> = page
        .iter()
        .filter_map(|user| user.get("nickname").and_then(Value::as_str))
        .collect();
    assert_eq!(nicknames, expected);
}

#[rstest]
#[actix_web::test]
async fn list_with_unsupported_sort_field_is_rejected(harness: Harness) {
    let app = app(state(harness.store.clone(), harness.events.clone())).await;
    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/v1/users?sortBy=id.asc")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = test::read_body_json(response).await;
    assert_eq!(error.error, "unsupported sorting field");
}

#[rstest]
#[actix_web::test]
async fn publish_failures_never_change_the_response(harness: Harness) {
    let app = app(state(
        harness.store.clone(),
        Arc::new(FailingUserEventPublisher),
    ))
    .await;

    let id = id_of(&create(&app, body("punisher", "US")).await);
    let updated = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/v1/users/{id}"))
            .set_json(body("frank", "UK"))
            .to_request(),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::NO_CONTENT);

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/v1/users/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(harness.store.is_empty().await);
}
