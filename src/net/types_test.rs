use super::*;

#[test]
fn query_pairs_skip_absent_values() {
    let query = Query::new().param("page", 2).maybe("per_page", None::<u32>).param("sort", "name");
    assert_eq!(query.pairs(), vec![("page", "2"), ("sort", "name")]);
}

#[test]
fn query_from_iter_preserves_order() {
    let query: Query = [("b", Some("2")), ("a", None), ("c", Some("3"))].into_iter().collect();
    assert_eq!(query.pairs(), vec![("b", "2"), ("c", "3")]);
}

#[test]
fn list_params_build_filter_keys() {
    let query = ListParams::new()
        .page(3)
        .sort("-created_at")
        .filter("status", "pending")
        .filter("name", "tarte")
        .to_query();
    assert_eq!(
        query.pairs(),
        vec![("page", "3"), ("sort", "-created_at"), ("filter[name]", "tarte"), ("filter[status]", "pending")]
    );
}

#[test]
fn empty_list_params_yield_no_pairs() {
    assert!(ListParams::new().to_query().pairs().is_empty());
}

#[test]
fn form_from_json_flattens_scalars_and_skips_null() {
    let form = FormPayload::from_json(&serde_json::json!({
        "name": "Sel",
        "quantity": 2,
        "optional": true,
        "measure": null,
    }));
    assert_eq!(form.text_value("name"), Some("Sel"));
    assert_eq!(form.text_value("quantity"), Some("2"));
    assert_eq!(form.text_value("optional"), Some("true"));
    assert_eq!(form.text_value("measure"), None);
}

#[test]
fn form_from_non_object_is_empty() {
    assert!(FormPayload::from_json(&serde_json::json!([1, 2])).is_empty());
}

#[test]
fn form_into_multipart_rejects_bad_mime() {
    let form = FormPayload::new().file("image", "a.png", vec![1, 2, 3], Some("not a mime".to_owned()));
    assert!(matches!(form.into_multipart(), Err(ApiError::Encode(_))));
}

#[test]
fn user_display_name_prefers_name_then_email() {
    let named = User(serde_json::json!({ "name": "Alice", "email": "a@example.test" }));
    assert_eq!(named.display_name(), Some("Alice"));
    let email_only = User(serde_json::json!({ "email": "a@example.test" }));
    assert_eq!(email_only.display_name(), Some("a@example.test"));
    assert_eq!(User(serde_json::json!("alice")).display_name(), None);
}

#[test]
fn login_response_accepts_access_token_alias() {
    let parsed: LoginResponse =
        serde_json::from_value(serde_json::json!({ "user": { "id": 1 }, "access_token": "tok" })).unwrap();
    assert_eq!(parsed.token, "tok");
    assert_eq!(parsed.user, User(serde_json::json!({ "id": 1 })));
}

#[test]
fn credentials_debug_redacts_password() {
    let creds = Credentials { email: "a@example.test".to_owned(), password: "hunter2".to_owned() };
    let rendered = format!("{creds:?}");
    assert!(rendered.contains("a@example.test"));
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn rejected_error_displays_message_and_status() {
    let err = ApiError::Rejected { status: 422, message: "The name field is required.".to_owned() };
    assert_eq!(err.to_string(), "The name field is required. (HTTP 422)");
}
