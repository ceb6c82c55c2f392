//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{test::TestRequest, web};

use crate::domain::{InMemoryLedgerStore, LedgerService, Role, UserId};
use crate::inbound::http::auth::{PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER};
use crate::inbound::http::state::HttpState;

pub use crate::server::api_routes as api_scope;

/// Build handler state over an in-memory store.
pub fn in_memory_state(store: &Arc<InMemoryLedgerStore>) -> web::Data<HttpState> {
    web::Data::new(HttpState::from_service(LedgerService::new(Arc::clone(
        store,
    ))))
}

/// Attach gateway identity headers to a test request.
pub fn as_principal(req: TestRequest, user_id: UserId, role: Role) -> TestRequest {
    req.insert_header((PRINCIPAL_ID_HEADER, user_id.to_string()))
        .insert_header((PRINCIPAL_ROLE_HEADER, role.as_str()))
}
