use clap::CommandFactory;
use recipe_admin::net::types::User;
use recipe_admin::state::storage::{MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};

use super::*;

fn signed_in_app() -> (AdminApp, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::with_entries([(TOKEN_KEY, "tok123"), (USER_KEY, r#"{"id":1}"#)]));
    let config = AdminConfig { api_url: "http://127.0.0.1:9/api".to_owned(), ..AdminConfig::default() };
    (AdminApp::new(&config, storage.clone()).unwrap(), storage)
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_key_val_splits_on_first_equals() {
    assert_eq!(parse_key_val("status=pending"), Ok(("status".to_owned(), "pending".to_owned())));
    assert_eq!(parse_key_val("note=a=b"), Ok(("note".to_owned(), "a=b".to_owned())));
    assert!(parse_key_val("novalue").is_err());
    assert!(parse_key_val(" =x").is_err());
}

#[test]
fn list_args_convert_to_params() {
    let cli = Cli::parse_from([
        "recipe-admin",
        "moderation",
        "list",
        "--page",
        "2",
        "--filter",
        "status=pending",
        "--sort",
        "name",
    ]);
    let Command::Moderation(ModerationCommand { command: ModerationSubcommand::List(args) }) = cli.command else {
        panic!("unexpected command");
    };
    let params: ListParams = args.into();
    assert_eq!(params, ListParams::new().page(2).sort("name").filter("status", "pending"));
}

#[test]
fn global_flags_override_config() {
    let cli = Cli::parse_from([
        "recipe-admin",
        "--api-url",
        "http://api.example.test/api/",
        "--session-file",
        "/tmp/s.json",
        "--method-override",
        "status",
    ]);
    let config = load_config(&cli).unwrap();
    assert_eq!(config.api_url, "http://api.example.test/api");
    assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
    assert!(config.form_method_override);
}

#[test]
fn build_form_attaches_fields_and_image() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("Tarte.PNG");
    std::fs::write(&image, [1_u8, 2, 3]).unwrap();

    let form = build_form(FormArgs {
        fields: vec![("name".to_owned(), "Tarte".to_owned())],
        image: Some(image),
    })
    .unwrap();

    assert_eq!(form.text_value("name"), Some("Tarte"));
    assert_eq!(form.fields().len(), 2);
}

#[test]
fn build_form_missing_image_is_reported() {
    let err = build_form(FormArgs { fields: vec![], image: Some(PathBuf::from("/definitely/missing.png")) })
        .unwrap_err();
    assert!(matches!(err, CliError::ReadFile { .. }));
}

#[test]
fn image_mime_by_extension() {
    assert_eq!(image_mime(Path::new("a.jpeg")), Some("image/jpeg"));
    assert_eq!(image_mime(Path::new("a.WEBP")), Some("image/webp"));
    assert_eq!(image_mime(Path::new("a.bmp")), None);
    assert_eq!(image_mime(Path::new("noext")), None);
}

#[tokio::test]
async fn login_while_signed_in_is_refused_without_touching_session() {
    let (mut app, storage) = signed_in_app();
    let command = Command::Login { email: "bob@example.test".to_owned(), password: "pw".to_owned() };

    let err = run(&mut app, command).await.unwrap_err();

    assert!(matches!(err, CliError::AlreadySignedIn(Route::Dashboard)));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok123"));
    assert!(app.session().is_authenticated());
}

#[tokio::test]
async fn resource_command_while_signed_out_is_refused() {
    let (mut app, _) = signed_in_app();
    app.session().expire();

    let command = Command::Recipes(RecipesCommand { command: RecipesSubcommand::Delete { id: 7 } });
    let err = run(&mut app, command).await.unwrap_err();

    assert!(matches!(err, CliError::NotAuthenticated(Route::Login)));
}

#[test]
fn session_summary_reads_authentication_from_session() {
    let user = User(serde_json::json!({ "id": 1 }));
    let incomplete = Session { user: Some(user.clone()), token: None };
    let complete = Session { user: Some(user), token: Some("tok".to_owned()) };

    let summary = session_summary(&incomplete, Route::Login);
    assert_eq!(summary["authenticated"], false);
    assert_eq!(summary["route"], "/login");

    let summary = session_summary(&complete, Route::Dashboard);
    assert_eq!(summary["authenticated"], true);
    assert_eq!(summary["user"]["id"], 1);
}
