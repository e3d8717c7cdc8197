use actix_web::web;

use crate::handlers::health::health;

pub mod vacations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(web::scope("/api/v1").configure(vacations::configure));
}
