//! Integration tests for the derive macros.
//!
//! These tests verify that `#[derive(Bind)]` and `#[derive(ParamEnum)]`
//! generate contracts the binders accept.

use reqbind::{
    Bind, BindError, Bindable, BodyBinder, Json, MediaType, ParamBinder, ParamEnum, RawValueMap,
    TypeDescriptor,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ParamEnum)]
enum Status {
    #[default]
    New,
    InProgress,
    #[param(rename = "DONE")]
    Completed,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct Sku(String);

#[derive(Debug, Default, Bind)]
struct Ticket {
    #[param(name = "title", required, message = "A title is required")]
    title: String,
    #[param(name = "status", default = "NEW")]
    status: Status,
    #[param(name = "labels")]
    labels: Vec<String>,
    #[param(name = "estimate")]
    estimate: Option<f64>,
    #[param]
    priority: i64,
    #[param(name = "sku")]
    sku: Option<Json<Sku>>,
    // Not bound.
    internal_note: String,
}

fn draft_factory() -> Draft {
    Draft {
        title: String::new(),
        note: "from factory".to_string(),
    }
}

#[derive(Debug, Bind)]
#[bind(factory = draft_factory)]
struct Draft {
    #[param(name = "title", required)]
    title: String,
    note: String,
}

#[derive(Debug, Default, Bind)]
#[bind(accept = "json")]
struct JsonOnly {
    #[param(name = "title", required)]
    title: String,
}

fn params(pairs: &[(&str, &str)]) -> RawValueMap {
    pairs.iter().copied().collect()
}

#[test]
fn test_contract_shape() {
    let contract = Ticket::contract();
    let names: Vec<_> = contract.fields().iter().map(|f| f.name()).collect();

    assert_eq!(
        names,
        vec!["title", "status", "labels", "estimate", "priority", "sku"]
    );
    assert_eq!(contract.type_name(), "Ticket");
    assert_eq!(
        contract.field("labels").unwrap().descriptor(),
        &TypeDescriptor::list(TypeDescriptor::String)
    );
    assert_eq!(contract.field("estimate").unwrap().descriptor(), &TypeDescriptor::Float);
    assert!(contract.field("title").unwrap().spec().required);
    assert!(std::ptr::eq(contract, Ticket::contract()));
}

#[test]
fn test_param_enum_cases() {
    assert_eq!(Status::CASES, &["NEW", "IN_PROGRESS", "DONE"]);
    assert_eq!(Status::NAME, "Status");
    assert_eq!(Status::from_case("DONE"), Some(Status::Completed));
    assert_eq!(Status::from_case("Completed"), None);
    assert_eq!(Status::InProgress.as_case(), "IN_PROGRESS");
}

#[test]
fn test_bind_params_with_derived_contract() {
    let ticket: Ticket = ParamBinder::default()
        .bind(&params(&[
            ("title", "Fix login"),
            ("status", "IN_PROGRESS"),
            ("labels", "auth, bug"),
            ("estimate", "1.5"),
            ("priority", "9000000000"),
            ("sku", "AB-1"),
        ]))
        .unwrap();

    assert_eq!(ticket.title, "Fix login");
    assert_eq!(ticket.status, Status::InProgress);
    assert_eq!(ticket.labels, vec!["auth", "bug"]);
    assert_eq!(ticket.estimate, Some(1.5));
    assert_eq!(ticket.priority, 9_000_000_000);
    assert_eq!(ticket.sku, Some(Json(Sku("AB-1".to_string()))));
    assert!(ticket.internal_note.is_empty());
}

#[test]
fn test_defaults_and_optional_fields() {
    let ticket: Ticket = ParamBinder::default()
        .bind(&params(&[("title", "Docs")]))
        .unwrap();

    assert_eq!(ticket.status, Status::New);
    assert!(ticket.labels.is_empty());
    assert_eq!(ticket.estimate, None);
    assert_eq!(ticket.sku, None);
}

#[test]
fn test_custom_message() {
    let err = BodyBinder::default()
        .bind::<Ticket>(b"{}", Some("application/json"))
        .unwrap_err();
    assert_eq!(err.to_string(), "missing required parameters: A title is required");
}

#[test]
fn test_enum_case_policy() {
    let err = ParamBinder::default()
        .bind::<Ticket, _>(&params(&[("title", "x"), ("status", "done")]))
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidFieldValue { .. }));

    let ticket: Ticket = BodyBinder::legacy()
        .bind(br#"{"title": "x", "status": "done"}"#, Some("application/json"))
        .unwrap();
    assert_eq!(ticket.status, Status::Completed);
}

#[test]
fn test_factory_and_accept_attributes() {
    let contract = Draft::contract();
    assert_eq!(contract.accepted(), MediaType::ALL);

    let draft: Draft = ParamBinder::default()
        .bind(&params(&[("title", "t")]))
        .unwrap();
    assert_eq!(draft.title, "t");
    assert_eq!(draft.note, "from factory");

    let json_only = JsonOnly::contract();
    assert!(json_only.accepts(MediaType::Json));
    assert!(!json_only.accepts(MediaType::FormUrlEncoded));

    let err = BodyBinder::default()
        .bind::<JsonOnly>(b"title=x", Some("application/x-www-form-urlencoded"))
        .unwrap_err();
    assert!(matches!(err, BindError::UnsupportedContentType { .. }));

    let bound: JsonOnly = BodyBinder::default()
        .bind(br#"{"title": "x"}"#, Some("application/json; charset=utf-8"))
        .unwrap();
    assert_eq!(bound.title, "x");
}

#[test]
fn test_verify_defaults_of_derived_contract() {
    assert!(Ticket::contract()
        .verify_defaults(BodyBinder::default().coercer())
        .is_ok());
}
