use actix_web::{web, App, HttpServer};
use fodinha_server::config::Settings;
use fodinha_server::health;
use fodinha_server::state::app_state::AppState;
use fodinha_server::ws::session;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: set via docker-compose env_file or docker run --env-file
    // - Local dev: source env files manually (e.g., set -a; . ./.env; set +a)
    let settings = Settings::from_env();
    let host = settings.host.clone();
    let port = settings.port;

    println!("🚀 Starting Fodinha server on http://{}:{}", host, port);

    let data = web::Data::new(AppState::new(settings));

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/ws", web::get().to(session::upgrade))
            .configure(health::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
