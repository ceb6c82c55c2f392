//! Wallet read HTTP handlers.
//!
//! ```text
//! GET /api/v1/wallet
//! GET /api/v1/wallet/transactions
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Wallet;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::PrincipalContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::transactions::TransactionResponse;

/// Response payload for the caller's wallet.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub id: String,
    pub user_id: String,
    #[schema(example = "5000.00")]
    pub balance: String,
    pub created_at: String,
}

impl From<Wallet> for WalletResponse {
    fn from(value: Wallet) -> Self {
        Self {
            id: value.id().to_string(),
            user_id: value.user_id().to_string(),
            balance: value.balance().to_string(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Fetch the caller's wallet, creating an empty one on first use.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses(
        (status = 200, description = "The caller's wallet", body = WalletResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["wallet"],
    operation_id = "getWallet"
)]
#[get("/wallet")]
pub async fn get_wallet(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
) -> ApiResult<web::Json<WalletResponse>> {
    let wallet = state.wallet.balance(principal.user_id()).await?;
    Ok(web::Json(WalletResponse::from(wallet)))
}

/// List the caller's transactions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    responses(
        (
            status = 200,
            description = "Transactions on the caller's wallet, newest first",
            body = [TransactionResponse]
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wallet"],
    operation_id = "listWalletTransactions"
)]
#[get("/wallet/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
) -> ApiResult<web::Json<Vec<TransactionResponse>>> {
    let transactions = state.wallet.transactions(principal.user_id()).await?;
    Ok(web::Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}
