//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn details() -> UserDetails {
    UserDetails {
        first_name: "Frank".to_owned(),
        last_name: "Castle".to_owned(),
        nickname: "punisher".to_owned(),
        password: "s3cr3t".to_owned(),
        email: "frank.castle@example.com".to_owned(),
        country: "US".to_owned(),
    }
}

#[fixture]
fn document() -> Value {
    json!({
        "id": VALID_ID,
        "first_name": "Frank",
        "last_name": "Castle",
        "nickname": "punisher",
        "password": "s3cr3t",
        "email": "frank.castle@example.com",
        "country": "US",
        "created_at": "2024-05-01T10:15:30.123Z",
        "updated_at": "2024-05-02T08:00:00.000Z"
    })
}

#[rstest]
fn user_id_parse_accepts_uuid() {
    let id = UserId::parse(VALID_ID).expect("valid uuid");
    assert_eq!(id.to_string(), VALID_ID);
}

#[rstest]
#[case("")]
#[case("not-a-uuid")]
#[case("3fa85f64-5717-4562-b3fc")]
fn user_id_parse_rejects_garbage(#[case] raw: &str) {
    assert!(UserId::parse(raw).is_err());
}

#[rstest]
fn truncation_drops_sub_millisecond_precision() {
    let at = Utc
        .timestamp_opt(1_714_558_530, 123_456_789)
        .single()
        .expect("valid timestamp");
    let truncated = truncate_to_millis(at);
    assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
    assert_eq!(truncate_to_millis(truncated), truncated);
}

#[rstest]
fn new_truncates_timestamps(details: UserDetails) {
    let at = Utc
        .timestamp_opt(1_714_558_530, 987_654_321)
        .single()
        .expect("valid timestamp");
    let user = User::new(UserId::random(), details, at, at).expect("valid user");
    assert_eq!(user.created_at().timestamp_subsec_nanos(), 987_000_000);
    assert_eq!(user.updated_at(), user.created_at());
}

#[rstest]
fn new_rejects_invalid_details(mut details: UserDetails) {
    details.nickname.clear();
    let err = User::new(UserId::random(), details, Utc::now(), Utc::now())
        .expect_err("nickname missing");
    assert_eq!(err, UserValidationError::NicknameRequired);
}

#[rstest]
fn serialises_flat_snake_case_document(details: UserDetails, document: Value) {
    let created = DateTime::parse_from_rfc3339("2024-05-01T10:15:30.123Z")
        .expect("timestamp")
        .with_timezone(&Utc);
    let updated = DateTime::parse_from_rfc3339("2024-05-02T08:00:00Z")
        .expect("timestamp")
        .with_timezone(&Utc);
    let user = User::new(
        UserId::parse(VALID_ID).expect("id"),
        details,
        created,
        updated,
    )
    .expect("valid user");

    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(value, document);
}

#[rstest]
fn decodes_document(document: Value) {
    let user: User = serde_json::from_value(document).expect("decode user");
    assert_eq!(user.id().to_string(), VALID_ID);
    assert_eq!(user.details().nickname, "punisher");
}

#[rstest]
#[case("created_at")]
#[case("email")]
#[case("id")]
fn decoding_fails_when_field_missing(mut document: Value, #[case] field: &str) {
    document
        .as_object_mut()
        .expect("object")
        .remove(field);
    assert!(serde_json::from_value::<User>(document).is_err());
}

#[rstest]
fn decoding_fails_on_invalid_email(mut document: Value) {
    document["email"] = json!("no-at-sign");
    let err = serde_json::from_value::<User>(document).expect_err("invalid email");
    assert!(err.to_string().contains("email is invalid"));
}

#[rstest]
fn details_accept_partial_bodies() {
    let details: UserDetails =
        serde_json::from_value(json!({ "first_name": "Frank" })).expect("partial body");
    assert_eq!(details.first_name, "Frank");
    assert!(details.last_name.is_empty());
}
