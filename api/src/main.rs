mod api_handlers;
mod database;
mod search_query;
mod validation;

use clap::{Parser, Subcommand};
use database::schema::model_by_name;
use database::{Database, DEFAULT_DATABASE_URL};
use poem::{
    get,
    listener::TcpListener,
    middleware::{Cors, Tracing},
    Endpoint, EndpointExt, Route, Server,
};
use query_filter::{registry, FilterError, QuerySet};
use search_query::parse_search_query;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Every route is mounted below this prefix.
pub const API_PREFIX: &str = "/bookstore/api/v1";

#[derive(Parser)]
#[command(name = "api-server")]
#[command(about = "Bookstore API Server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Print the SQL a search would run, without touching the database
    Explain {
        /// Table to search: books, users or roles
        #[arg(long)]
        model: String,
        /// Search object, e.g. '{"filters":[{"name":"price","op":"ge","val":20000}]}'
        #[arg(long)]
        q: Option<String>,
    },
    /// Assign a role (User, Publisher or Administrator) to a user
    GrantRole {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        role: String,
    },
}

struct AppContext {
    database: Arc<Database>,
}

async fn setup_app_context() -> Result<AppContext, std::io::Error> {
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let database = match Database::new(&database_url).await {
        Ok(db) => {
            tracing::info!("Database initialized at {}", database_url);
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!("Failed to initialize database at {}: {:#}", database_url, e);
            return Err(std::io::Error::other(format!(
                "Database initialization failed: {}",
                e
            )));
        }
    };

    Ok(AppContext { database })
}

fn build_app(database: Arc<Database>) -> impl Endpoint {
    let api = Route::new()
        .at("/health", get(api_handlers::health))
        .at(
            "/books",
            get(api_handlers::search_books).post(api_handlers::publish_book),
        )
        .at("/books/:id", get(api_handlers::get_book))
        .at(
            "/users",
            get(api_handlers::search_users).post(api_handlers::register_user),
        )
        .at("/users/:id", get(api_handlers::get_user))
        .at("/users/:id/books", get(api_handlers::get_user_books));

    Route::new()
        .nest(API_PREFIX, api)
        .data(database)
        .with(Tracing)
        .with(Cors::new())
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let cli = Cli::parse();

    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve => serve_command().await,
        Commands::Explain { model, q } => explain_command(&model, q.as_deref()),
        Commands::GrantRole { user_id, role } => grant_role_command(user_id, &role).await,
    }
}

async fn serve_command() -> Result<(), std::io::Error> {
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let ctx = setup_app_context().await?;

    tracing::info!("Starting Bookstore API server on {}{}", addr, API_PREFIX);

    let app = build_app(ctx.database);
    Server::new(TcpListener::bind(&addr)).run(app).await
}

/// Renders the query for `q` against `model`.
fn explain(model: &str, q: Option<&str>) -> anyhow::Result<(String, Vec<String>)> {
    let schema = model_by_name(model).ok_or_else(|| {
        anyhow::anyhow!("Unknown model \"{}\" (expected books, users or roles)", model)
    })?;
    let filters = parse_search_query(q)?;
    let query = query_filter::search(QuerySet::all(schema), schema, filters.as_deref())?;
    let (sql, binds) = query.to_sql();
    Ok((sql, binds.iter().map(ToString::to_string).collect()))
}

fn explain_error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<FilterError>() {
        Some(FilterError::UnknownOperator(_)) => format!(
            "Error: {}\nValid operators: {}",
            e,
            registry().names().join(", ")
        ),
        _ => format!("Error: {}", e),
    }
}

fn explain_command(model: &str, q: Option<&str>) -> Result<(), std::io::Error> {
    match explain(model, q) {
        Ok((sql, binds)) => {
            println!("SQL:   {}", sql);
            println!("Binds: [{}]", binds.join(", "));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", explain_error_message(&e));
            Err(std::io::Error::other(e.to_string()))
        }
    }
}

async fn grant_role(database: &Database, user_id: i64, role_name: &str) -> anyhow::Result<()> {
    let role = database
        .get_role_by_name(role_name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Unknown role \"{}\"", role_name))?;
    if database.get_user(user_id).await?.is_none() {
        anyhow::bail!("User {} not found", user_id);
    }
    database.set_user_role(user_id, role.id).await?;
    tracing::info!("Granted role {} to user {}", role.name, user_id);
    Ok(())
}

async fn grant_role_command(user_id: i64, role_name: &str) -> Result<(), std::io::Error> {
    let ctx = setup_app_context().await?;
    grant_role(&ctx.database, user_id, role_name)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))
}
