//! Investment HTTP handlers.
//!
//! ```text
//! POST /api/v1/investments
//! GET  /api/v1/investments
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{InvestRequest, InvestmentReceipt};
use crate::domain::{Investment, ProjectFunding};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::PrincipalContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_amount, parse_uuid};

/// Request payload for recording an investment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestPayload {
    pub project_id: String,
    #[schema(example = "1000.00")]
    pub amount: String,
}

/// Response payload for a single investment record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResponse {
    pub id: String,
    pub investor_id: String,
    pub project_id: String,
    #[schema(example = "1000.00")]
    pub amount: String,
    pub invested_at: String,
}

impl From<Investment> for InvestmentResponse {
    fn from(value: Investment) -> Self {
        Self {
            id: value.id.to_string(),
            investor_id: value.investor_id.to_string(),
            project_id: value.project_id.to_string(),
            amount: value.amount.to_string(),
            invested_at: value.invested_at.to_rfc3339(),
        }
    }
}

/// Project funding state returned alongside a successful investment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFundingResponse {
    pub project_id: String,
    #[schema(example = "50000.00")]
    pub funding_goal: String,
    #[schema(example = "1000.00")]
    pub current_funding: String,
    #[schema(example = "PartiallyFunded")]
    pub status: String,
}

impl From<ProjectFunding> for ProjectFundingResponse {
    fn from(value: ProjectFunding) -> Self {
        Self {
            project_id: value.project_id.to_string(),
            funding_goal: value.funding_goal.to_string(),
            current_funding: value.current_funding.to_string(),
            status: value.status.to_string(),
        }
    }
}

/// Response payload for a successful investment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReceiptResponse {
    pub investment: InvestmentResponse,
    pub project: ProjectFundingResponse,
}

impl From<InvestmentReceipt> for InvestmentReceiptResponse {
    fn from(value: InvestmentReceipt) -> Self {
        Self {
            investment: InvestmentResponse::from(value.investment),
            project: ProjectFundingResponse::from(value.funding),
        }
    }
}

/// Invest in a project from the caller's wallet.
#[utoipa::path(
    post,
    path = "/api/v1/investments",
    request_body = InvestPayload,
    description = "Atomically record the investment, bump the project's funding, and \
                   debit the caller's wallet.",
    responses(
        (status = 201, description = "Investment recorded", body = InvestmentReceiptResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema),
        (status = 409, description = "Project is not accepting investments", body = ErrorSchema),
        (status = 422, description = "Insufficient funds", body = ErrorSchema)
    ),
    tags = ["investments"],
    operation_id = "createInvestment"
)]
#[post("/investments")]
pub async fn create_investment(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
    payload: web::Json<InvestPayload>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let receipt = state
        .investments
        .invest(InvestRequest {
            investor_id: principal.user_id(),
            project_id: parse_uuid(&payload.project_id, "projectId")?,
            amount: parse_amount(&payload.amount, "amount")?,
        })
        .await?;
    Ok(HttpResponse::Created().json(InvestmentReceiptResponse::from(receipt)))
}

/// List the caller's investments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/investments",
    responses(
        (
            status = 200,
            description = "The caller's investments, newest first",
            body = [InvestmentResponse]
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["investments"],
    operation_id = "listInvestments"
)]
#[get("/investments")]
pub async fn list_investments(
    state: web::Data<HttpState>,
    principal: PrincipalContext,
) -> ApiResult<web::Json<Vec<InvestmentResponse>>> {
    let investments = state.investments.investments(principal.user_id()).await?;
    Ok(web::Json(
        investments
            .into_iter()
            .map(InvestmentResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
#[path = "investments_tests.rs"]
mod tests;
