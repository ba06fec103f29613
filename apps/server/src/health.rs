use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    rooms: usize,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        rooms: app_state.registry().len(),
    }))
}

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
