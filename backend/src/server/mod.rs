//! HTTP server assembly.
//!
//! Wires the ledger service, persistence, middleware, and route tree into a
//! runnable `actix_web` server. The binary entry point builds a
//! [`ServerConfig`] and hands it to [`create_server`].

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, Scope, web};
use tracing::{info, warn};

use crate::domain::{InMemoryLedgerStore, LedgerService};
use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{escrow, investments, transactions, wallet};
use crate::middleware::Trace;
use crate::outbound::persistence::DieselLedgerStore;

mod config;

pub use config::ServerConfig;

/// The `/api/v1` scope with every ledger endpoint registered.
pub fn api_routes() -> Scope {
    web::scope("/api/v1")
        .service(wallet::get_wallet)
        .service(wallet::list_transactions)
        .service(transactions::create_deposit)
        .service(transactions::attach_proof)
        .service(transactions::create_withdrawal)
        .service(escrow::list_pending)
        .service(escrow::decide)
        .service(investments::create_investment)
        .service(investments::list_investments)
}

/// Build handler state backed by PostgreSQL when a pool is configured,
/// falling back to the in-memory store otherwise.
fn http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL-backed ledger store");
            HttpState::from_service(LedgerService::new(Arc::new(DieselLedgerStore::new(
                pool.clone(),
            ))))
        }
        None => {
            warn!("no database configured; ledger state will not survive restarts");
            HttpState::from_service(LedgerService::new(Arc::new(InMemoryLedgerStore::new())))
        }
    }
}

/// Create the HTTP server bound to the configured address.
///
/// Returns the unstarted [`Server`] alongside the shared [`HealthState`] so
/// the caller can flip readiness once startup completes.
pub fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let state = web::Data::new(http_state(&config));
    let health = web::Data::new(HealthState::new());
    let health_handle = health.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(Trace)
            .app_data(state.clone())
            .app_data(health.clone())
            .service(api_routes())
            .service(health::ready)
            .service(health::live);

        #[cfg(debug_assertions)]
        let app = {
            use utoipa::OpenApi;
            use utoipa_swagger_ui::SwaggerUi;

            use crate::doc::ApiDoc;

            app.service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
        };

        app
    })
    .bind(config.bind_addr)?
    .run();

    Ok((server, health_handle))
}
