//! Deposit and withdrawal HTTP handlers.
//!
//! ```text
//! POST /api/v1/wallet/deposits
//! POST /api/v1/wallet/deposits/{id}/proof
//! POST /api/v1/wallet/withdrawals
//! ```
//!
//! Amounts travel as JSON strings to keep decimal precision intact.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{DepositRequest, ProofRequest, WithdrawalRequest};
use crate::domain::Transaction;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::PrincipalContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_amount, parse_payment_method, parse_uuid};

/// Response payload for a wallet transaction.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub wallet_id: String,
    #[serde(rename = "type")]
    #[schema(example = "deposit")]
    pub kind: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2500.00")]
    pub amount: String,
    #[schema(example = "bank_transfer")]
    pub payment_method: String,
    pub proof_of_payment: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(value: Transaction) -> Self {
        Self {
            id: value.id.to_string(),
            wallet_id: value.wallet_id.to_string(),
            kind: value.kind.to_string(),
            status: value.status.to_string(),
            amount: value.amount.to_string(),
            payment_method: value.payment_method.to_string(),
            proof_of_payment: value.proof_of_payment,
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
            processed_by: value.processed_by.map(|id| id.to_string()),
            processed_at: value.processed_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Request payload for creating a deposit.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    #[schema(example = "2500.00")]
    pub amount: String,
    #[schema(example = "bank_transfer")]
    pub payment_method: String,
}

/// Request payload for attaching proof of payment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProofPayload {
    /// Opaque reference to the uploaded document.
    pub proof_of_payment: String,
}

/// Request payload for creating a withdrawal.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPayload {
    #[schema(example = "500.00")]
    pub amount: String,
    #[schema(example = "mobile_money")]
    pub payment_method: String,
    /// Payout destination: bank account or mobile money number.
    pub account_details: String,
}

/// Request a deposit into the caller's wallet.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/deposits",
    request_body = DepositPayload,
    description = "Create a pending deposit; the balance is credited only once escrow approves.",
    responses(
        (status = 201, description = "Deposit created", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wallet"],
    operation_id = "createDeposit"
)]
#[post("/wallet/deposits")]
pub async fn create_deposit(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
    payload: web::Json<DepositPayload>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let transaction = state
        .transactions
        .create_deposit(DepositRequest {
            user_id: principal.user_id(),
            amount: parse_amount(&payload.amount, "amount")?,
            method: parse_payment_method(&payload.payment_method)?,
        })
        .await?;
    Ok(HttpResponse::Created().json(TransactionResponse::from(transaction)))
}

/// Attach proof of payment to one of the caller's pending deposits.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/deposits/{id}/proof",
    request_body = ProofPayload,
    params(("id" = String, Path, description = "Deposit transaction UUID")),
    responses(
        (status = 200, description = "Deposit moved to verifying", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Transaction not found", body = ErrorSchema),
        (status = 409, description = "Transaction no longer accepts proof", body = ErrorSchema)
    ),
    tags = ["wallet"],
    operation_id = "attachDepositProof"
)]
#[post("/wallet/deposits/{id}/proof")]
pub async fn attach_proof(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
    path: web::Path<String>,
    payload: web::Json<ProofPayload>,
) -> ApiResult<web::Json<TransactionResponse>> {
    let transaction_id = parse_uuid(&path.into_inner(), "id")?;
    let transaction = state
        .transactions
        .attach_proof(ProofRequest {
            user_id: principal.user_id(),
            transaction_id,
            proof_reference: payload.into_inner().proof_of_payment,
        })
        .await?;
    Ok(web::Json(TransactionResponse::from(transaction)))
}

/// Request a withdrawal from the caller's wallet.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/withdrawals",
    request_body = WithdrawalPayload,
    description = "Create a pending withdrawal; the amount is reserved immediately \
                   and refunded if escrow rejects the request.",
    responses(
        (status = 201, description = "Withdrawal created", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 422, description = "Insufficient funds", body = ErrorSchema)
    ),
    tags = ["wallet"],
    operation_id = "createWithdrawal"
)]
#[post("/wallet/withdrawals")]
pub async fn create_withdrawal(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
    payload: web::Json<WithdrawalPayload>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let transaction = state
        .transactions
        .create_withdrawal(WithdrawalRequest {
            user_id: principal.user_id(),
            amount: parse_amount(&payload.amount, "amount")?,
            method: parse_payment_method(&payload.payment_method)?,
            account_details: payload.account_details,
        })
        .await?;
    Ok(HttpResponse::Created().json(TransactionResponse::from(transaction)))
}

#[cfg(test)]
#[path = "transactions_tests.rs"]
mod tests;
