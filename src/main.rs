use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::time::Duration;

use snaptune_server::clients::{OpenAiClient, VisionClient};
use snaptune_server::config::AppSettings;
use snaptune_server::routes::configure_routes;
use snaptune_server::CooldownLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings; missing API keys abort startup instead of
    // surfacing later as upstream 401s
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    // Upstream clients
    let vision_client = match VisionClient::new(&app_settings) {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            log::error!("Failed to initialize Vision client: {}", e);
            std::process::exit(1);
        }
    };
    let openai_client = match OpenAiClient::new(&app_settings) {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            log::error!("Failed to initialize OpenAI client: {}", e);
            std::process::exit(1);
        }
    };

    // One limiter for the whole process, created outside the worker factory
    // so every worker shares the same cooldown window
    let limiter = web::Data::new(CooldownLimiter::new(Duration::from_millis(
        app_settings.rate_limit.cooldown_ms,
    )));
    log::info!(
        "Cooldown gate armed: {} ms between accepted requests",
        app_settings.rate_limit.cooldown_ms
    );

    let host = &app_settings.server.host;
    let port = app_settings.server.port;
    log::info!("Starting server at http://{}:{}", host, port);

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;

    HttpServer::new(move || {
        // Configure CORS using actix-cors
        let mut cors = Cors::default();
        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(vision_client.clone())
            .app_data(openai_client.clone())
            .app_data(limiter.clone())
            .configure(configure_routes)
    })
    .listen(listener)?
    .run()
    .await
}
