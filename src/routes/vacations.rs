use actix_web::web;

use crate::handlers::vacations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vacations")
            .route("", web::post().to(vacations::create_vacation))
            .route("", web::get().to(vacations::get_vacations))
            // Must precede "/{id}"
            .route("/stats", web::get().to(vacations::get_vacation_stats))
            .route("/{id}", web::get().to(vacations::get_vacation))
            .route("/{id}", web::put().to(vacations::update_vacation))
            .route("/{id}", web::delete().to(vacations::delete_vacation))
            .route(
                "/{id}/status",
                web::put().to(vacations::update_vacation_status),
            ),
    );
}
