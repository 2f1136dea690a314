use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use chatrelay::chat::ChatRelay;
use chatrelay::cli::{commands::{Cli, Commands}, run_preset_command};
use chatrelay::config::AppConfig;
use chatrelay::db;
use chatrelay::llm::ProviderFactory;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(Commands::Preset { action }) = cli.command {
        run_preset_command(action, &config);
        return Ok(());
    }

    info!("Starting chat relay...");

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("No usable LLM provider configured for '{}'", config.llm.provider);
            std::process::exit(1);
        }
    };
    info!("Using {} provider (default model {})", provider.name(), provider.default_model());

    let relay = web::Data::new(ChatRelay::new(provider, config.chat.strict_params));
    let db_pool = web::Data::new(db_pool);

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(db_pool.clone())
            .app_data(relay.clone())
            .route("/health", web::get().to(health))
            .configure(chatrelay::api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
