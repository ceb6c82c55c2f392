//! Escrow verification HTTP handlers.
//!
//! ```text
//! GET  /api/v1/escrow/transactions
//! POST /api/v1/escrow/transactions/{id}/decision
//! ```
//!
//! Both endpoints require the `Admin` or `EscrowManager` role; the role
//! check lives in the domain service so it also covers non-HTTP callers.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{DecisionRequest, PendingTransaction};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::PrincipalContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::transactions::TransactionResponse;
use crate::inbound::http::validation::{parse_decision, parse_uuid};

/// A transaction awaiting a decision, with its wallet owner.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransactionResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub transaction: TransactionResponse,
}

impl From<PendingTransaction> for PendingTransactionResponse {
    fn from(value: PendingTransaction) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            transaction: TransactionResponse::from(value.transaction),
        }
    }
}

/// Request payload for an escrow decision.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    #[schema(example = "approve")]
    pub action: String,
    /// Replaces the transaction's notes when supplied.
    pub notes: Option<String>,
}

/// List transactions awaiting an escrow decision, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/escrow/transactions",
    responses(
        (
            status = 200,
            description = "Pending and verifying transactions, newest first",
            body = [PendingTransactionResponse]
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller lacks an escrow role", body = ErrorSchema)
    ),
    tags = ["escrow"],
    operation_id = "listPendingTransactions"
)]
#[get("/escrow/transactions")]
pub async fn list_pending(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
) -> ApiResult<web::Json<Vec<PendingTransactionResponse>>> {
    let pending = state.escrow.pending_transactions(principal.principal()).await?;
    Ok(web::Json(
        pending
            .into_iter()
            .map(PendingTransactionResponse::from)
            .collect(),
    ))
}

/// Approve or reject a transaction.
#[utoipa::path(
    post,
    path = "/api/v1/escrow/transactions/{id}/decision",
    request_body = DecisionPayload,
    params(("id" = String, Path, description = "Transaction UUID")),
    description = "Apply a terminal escrow decision. Approving a deposit credits the \
                   wallet; rejecting a withdrawal refunds the reserved amount.",
    responses(
        (status = 200, description = "Decision applied", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller lacks an escrow role", body = ErrorSchema),
        (status = 404, description = "Transaction not found", body = ErrorSchema),
        (status = 409, description = "Transaction already settled", body = ErrorSchema)
    ),
    tags = ["escrow"],
    operation_id = "decideTransaction"
)]
#[post("/escrow/transactions/{id}/decision")]
pub async fn decide(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
    path: web::Path<String>,
    payload: web::Json<DecisionPayload>,
) -> ApiResult<web::Json<TransactionResponse>> {
    let transaction_id = parse_uuid(&path.into_inner(), "id")?;
    let payload = payload.into_inner();
    let transaction = state
        .escrow
        .decide(
            principal.principal(),
            DecisionRequest {
                transaction_id,
                decision: parse_decision(&payload.action)?,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(web::Json(TransactionResponse::from(transaction)))
}
