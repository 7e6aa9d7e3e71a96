use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use recipe_admin::app::{AdminApp, AppError};
use recipe_admin::config::{AdminConfig, ConfigError, normalize_api_url};
use recipe_admin::net::dashboard::{self, IngredientInput, StepInput};
use recipe_admin::net::recipe_requests;
use recipe_admin::net::types::{ApiError, Credentials, FormPayload, ListParams};
use recipe_admin::router::Route;
use recipe_admin::state::session::Session;
use recipe_admin::state::storage::{FileStorage, StorageError};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not signed in; run `recipe-admin login` first (redirected to {0})")]
    NotAuthenticated(Route),
    #[error("already signed in; run `recipe-admin logout` first (redirected to {0})")]
    AlreadySignedIn(Route),
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "recipe-admin", about = "Administrative client for the recipe API")]
struct Cli {
    /// API base URL (overrides RECIPE_ADMIN_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Session mirror file (overrides RECIPE_ADMIN_SESSION_FILE).
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Send updates as POST + `_method=PUT` form fields.
    #[arg(long, default_value_t = false)]
    method_override: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, env = "RECIPE_ADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "RECIPE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Invalidate the session server-side (best effort) and forget it locally.
    Logout,
    /// Show the stored session.
    Status,
    /// Resolve a view path through the navigation guard.
    Open { path: String },
    Recipes(RecipesCommand),
    Ingredients(IngredientsCommand),
    Steps(StepsCommand),
    /// Recipe requests submitted by the signed-in user.
    Requests(RequestsCommand),
    /// Moderate recipe requests from all users.
    Moderation(ModerationCommand),
}

#[derive(Args, Debug, Clone, Default)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    sort: Option<String>,
    /// Filter as `field=value`, sent as `filter[field]=value`.
    #[arg(long = "filter", value_parser = parse_key_val)]
    filters: Vec<(String, String)>,
}

impl From<ListArgs> for ListParams {
    fn from(args: ListArgs) -> Self {
        Self { page: args.page, per_page: args.per_page, sort: args.sort, filters: args.filters.into_iter().collect() }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct FormArgs {
    /// Form field as `name=value`; repeatable.
    #[arg(long = "field", value_parser = parse_key_val)]
    fields: Vec<(String, String)>,
    /// Image file attached as the `image` field.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RecipesCommand {
    #[command(subcommand)]
    command: RecipesSubcommand,
}

#[derive(Subcommand, Debug)]
enum RecipesSubcommand {
    List(ListArgs),
    Create(FormArgs),
    Update {
        id: u64,
        #[command(flatten)]
        form: FormArgs,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct IngredientsCommand {
    #[command(subcommand)]
    command: IngredientsSubcommand,
}

#[derive(Args, Debug, Clone, Default)]
struct IngredientArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    quantity: Option<f64>,
    #[arg(long)]
    measure: Option<String>,
}

impl From<IngredientArgs> for IngredientInput {
    fn from(args: IngredientArgs) -> Self {
        Self { name: args.name, quantity: args.quantity, measure: args.measure }
    }
}

#[derive(Subcommand, Debug)]
enum IngredientsSubcommand {
    Add {
        recipe_id: u64,
        #[command(flatten)]
        ingredient: IngredientArgs,
    },
    Update {
        ingredient_id: u64,
        #[command(flatten)]
        ingredient: IngredientArgs,
    },
    Delete {
        ingredient_id: u64,
    },
}

#[derive(Args, Debug)]
struct StepsCommand {
    #[command(subcommand)]
    command: StepsSubcommand,
}

#[derive(Args, Debug, Clone, Default)]
struct StepArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Duration in minutes.
    #[arg(long)]
    duration: Option<u32>,
}

impl From<StepArgs> for StepInput {
    fn from(args: StepArgs) -> Self {
        Self { name: args.name, description: args.description, duration: args.duration }
    }
}

#[derive(Subcommand, Debug)]
enum StepsSubcommand {
    Add {
        recipe_id: u64,
        #[command(flatten)]
        step: StepArgs,
    },
    Update {
        step_id: u64,
        #[command(flatten)]
        step: StepArgs,
    },
    Delete {
        step_id: u64,
    },
}

#[derive(Args, Debug)]
struct RequestsCommand {
    #[command(subcommand)]
    command: RequestsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RequestsSubcommand {
    List(ListArgs),
    Create(FormArgs),
    Update {
        id: u64,
        #[command(flatten)]
        form: FormArgs,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct ModerationCommand {
    #[command(subcommand)]
    command: ModerationSubcommand,
}

#[derive(Subcommand, Debug)]
enum ModerationSubcommand {
    List(ListArgs),
    Show { id: u64 },
    Approve { id: u64 },
    Reject { id: u64 },
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let storage = Arc::new(FileStorage::open(&config.session_file)?);
    let mut app = AdminApp::new(&config, storage)?;

    let result = run(&mut app, cli.command).await;
    // Only an expiry can still be pending here; login/logout drain their own.
    if let Some(route) = app.process_events() {
        eprintln!("session ended; now at {route}");
    }
    result
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(cli: &Cli) -> Result<AdminConfig, CliError> {
    let mut config = AdminConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = normalize_api_url(url);
    }
    if let Some(path) = &cli.session_file {
        config.session_file.clone_from(path);
    }
    if cli.method_override {
        config.form_method_override = true;
    }
    Ok(config)
}

async fn run(app: &mut AdminApp, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            enter(app, Route::Login)?;
            let route = app.sign_in(&Credentials { email, password }).await?;
            print_json(&session_summary(&app.session().snapshot(), route))
        }
        Command::Logout => {
            let route = app.sign_out().await;
            print_json(&json!({ "authenticated": false, "route": route.path() }))
        }
        Command::Status => {
            let session = app.session().snapshot();
            print_json(&json!({
                "authenticated": session.is_authenticated(),
                "user": session.user,
                "api_url": app.client().base_url(),
            }))
        }
        Command::Open { path } => {
            let route = app.open_path(&path)?;
            print_json(&json!({ "requested": path, "route": route.path(), "name": route.name() }))
        }
        Command::Recipes(recipes) => run_recipes(app, recipes).await,
        Command::Ingredients(ingredients) => run_ingredients(app, ingredients).await,
        Command::Steps(steps) => run_steps(app, steps).await,
        Command::Requests(requests) => run_requests(app, requests).await,
        Command::Moderation(moderation) => run_moderation(app, moderation).await,
    }
}

async fn run_recipes(app: &mut AdminApp, recipes: RecipesCommand) -> Result<(), CliError> {
    match recipes.command {
        RecipesSubcommand::List(args) => {
            enter(app, Route::Recipes)?;
            let page = dashboard::list_recipes(app.client(), &args.into()).await?;
            print_json(&page)
        }
        RecipesSubcommand::Create(form) => {
            enter(app, Route::NewRecipe)?;
            let created = dashboard::create_recipe(app.client(), build_form(form)?).await?;
            print_optional(created)
        }
        RecipesSubcommand::Update { id, form } => {
            enter(app, Route::Recipes)?;
            let updated = dashboard::update_recipe(app.client(), id, build_form(form)?).await?;
            print_optional(updated)
        }
        RecipesSubcommand::Delete { id } => {
            enter(app, Route::Recipes)?;
            dashboard::delete_recipe(app.client(), id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn run_ingredients(app: &mut AdminApp, ingredients: IngredientsCommand) -> Result<(), CliError> {
    enter(app, Route::Recipes)?;
    match ingredients.command {
        IngredientsSubcommand::Add { recipe_id, ingredient } => {
            let created = dashboard::add_ingredient(app.client(), recipe_id, &ingredient.into()).await?;
            print_optional(created)
        }
        IngredientsSubcommand::Update { ingredient_id, ingredient } => {
            let updated = dashboard::update_ingredient(app.client(), ingredient_id, &ingredient.into()).await?;
            print_optional(updated)
        }
        IngredientsSubcommand::Delete { ingredient_id } => {
            dashboard::delete_ingredient(app.client(), ingredient_id).await?;
            print_json(&json!({ "deleted": ingredient_id }))
        }
    }
}

async fn run_steps(app: &mut AdminApp, steps: StepsCommand) -> Result<(), CliError> {
    enter(app, Route::Recipes)?;
    match steps.command {
        StepsSubcommand::Add { recipe_id, step } => {
            let created = dashboard::add_step(app.client(), recipe_id, &step.into()).await?;
            print_optional(created)
        }
        StepsSubcommand::Update { step_id, step } => {
            let updated = dashboard::update_step(app.client(), step_id, &step.into()).await?;
            print_optional(updated)
        }
        StepsSubcommand::Delete { step_id } => {
            dashboard::delete_step(app.client(), step_id).await?;
            print_json(&json!({ "deleted": step_id }))
        }
    }
}

async fn run_requests(app: &mut AdminApp, requests: RequestsCommand) -> Result<(), CliError> {
    enter(app, Route::RecipeRequests)?;
    match requests.command {
        RequestsSubcommand::List(args) => {
            let page = recipe_requests::list(app.client(), &args.into()).await?;
            print_json(&page)
        }
        RequestsSubcommand::Create(form) => {
            let created = recipe_requests::create(app.client(), build_form(form)?).await?;
            print_optional(created)
        }
        RequestsSubcommand::Update { id, form } => {
            let updated = recipe_requests::update(app.client(), id, build_form(form)?).await?;
            print_optional(updated)
        }
        RequestsSubcommand::Delete { id } => {
            recipe_requests::delete(app.client(), id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn run_moderation(app: &mut AdminApp, moderation: ModerationCommand) -> Result<(), CliError> {
    enter(app, Route::Dashboard)?;
    match moderation.command {
        ModerationSubcommand::List(args) => {
            let page = dashboard::list_recipe_requests(app.client(), &args.into()).await?;
            print_json(&page)
        }
        ModerationSubcommand::Show { id } => {
            let details = dashboard::recipe_request_details(app.client(), id).await?;
            print_json(&details)
        }
        ModerationSubcommand::Approve { id } => {
            let result = dashboard::approve_recipe_request(app.client(), id).await?;
            print_optional(result)
        }
        ModerationSubcommand::Reject { id } => {
            let result = dashboard::reject_recipe_request(app.client(), id).await?;
            print_optional(result)
        }
        ModerationSubcommand::Delete { id } => {
            dashboard::delete_recipe_request(app.client(), id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

/// Navigate to the view a command belongs to; refuse if the guard redirects.
fn enter(app: &mut AdminApp, route: Route) -> Result<(), CliError> {
    let reached = app.open(route);
    if reached == route {
        return Ok(());
    }
    if route.meta().requires_guest {
        return Err(CliError::AlreadySignedIn(reached));
    }
    Err(CliError::NotAuthenticated(reached))
}

fn session_summary(session: &Session, route: Route) -> Value {
    json!({ "authenticated": session.is_authenticated(), "user": session.user, "route": route.path() })
}

fn build_form(args: FormArgs) -> Result<FormPayload, CliError> {
    let mut form = FormPayload::new();
    for (name, value) in args.fields {
        form.push_text(name, value);
    }
    if let Some(path) = args.image {
        let bytes = std::fs::read(&path).map_err(|source| CliError::ReadFile { path: path.clone(), source })?;
        let file_name = path.file_name().map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
        form = form.file("image", file_name, bytes, image_mime(&path).map(ToOwned::to_owned));
    }
    Ok(form)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    if key.trim().is_empty() {
        return Err(format!("empty name in `{raw}`"));
    }
    Ok((key.trim().to_owned(), value.to_owned()))
}

fn print_optional(value: Option<Value>) -> Result<(), CliError> {
    print_json(&value.unwrap_or_else(|| json!({ "ok": true })))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;
