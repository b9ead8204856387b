//! Relay Server
//!
//! Pairs two remote clients into an ephemeral room over persistent
//! WebSocket connections and relays session events between them. All
//! state is in-memory and lost on restart.
//!
//! ## Submodules
//!
//! - [`registry`] — Live connection tracking and direct send
//! - [`relay`] — Best-effort room fan-out
//! - [`session`] — WebSocket bridging and event handlers

pub mod registry;
pub mod relay;
pub mod session;

pub use registry::Registry;
pub use relay::Relay;
pub use session::Coordinator;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

async fn connect(
    coordinator: web::Data<Coordinator>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => match coordinator.bridge(session, stream).await {
            Ok(()) => response,
            Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
        },
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Listening port: PORT env var override, documented default otherwise.
fn port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(gambit_core::PORT)
}

pub async fn run() -> Result<(), std::io::Error> {
    let coordinator = web::Data::new(Coordinator::default());
    let port = port();
    log::info!("starting relay server on port {}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(coordinator.clone())
            .route("/health", web::get().to(health))
            .route("/ws", web::get().to(connect))
    })
    .workers(4)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
