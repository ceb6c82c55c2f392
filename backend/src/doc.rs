//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every ledger endpoint, the health probes, the shared
//! error envelope, and the gateway identity headers used as the security
//! scheme. The generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::escrow::{DecisionPayload, PendingTransactionResponse};
use crate::inbound::http::investments::{
    InvestPayload, InvestmentReceiptResponse, InvestmentResponse, ProjectFundingResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::transactions::{
    DepositPayload, ProofPayload, TransactionResponse, WithdrawalPayload,
};
use crate::inbound::http::wallet::WalletResponse;

/// Enrich the generated document with the gateway identity security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "GatewayIdentity",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Principal-Id",
                "Authenticated user id injected by the platform gateway, \
                 paired with X-Principal-Role.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Escrow ledger API",
        description = "Wallets, escrow-verified deposits and withdrawals, and \
                       project investments for the crowdfunding platform."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("GatewayIdentity" = [])),
    paths(
        crate::inbound::http::wallet::get_wallet,
        crate::inbound::http::wallet::list_transactions,
        crate::inbound::http::transactions::create_deposit,
        crate::inbound::http::transactions::attach_proof,
        crate::inbound::http::transactions::create_withdrawal,
        crate::inbound::http::escrow::list_pending,
        crate::inbound::http::escrow::decide,
        crate::inbound::http::investments::create_investment,
        crate::inbound::http::investments::list_investments,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        WalletResponse,
        TransactionResponse,
        DepositPayload,
        ProofPayload,
        WithdrawalPayload,
        PendingTransactionResponse,
        DecisionPayload,
        InvestPayload,
        InvestmentResponse,
        ProjectFundingResponse,
        InvestmentReceiptResponse,
    )),
    tags(
        (name = "wallet", description = "Wallet balances, deposits, and withdrawals"),
        (name = "escrow", description = "Escrow verification workflow"),
        (name = "investments", description = "Project investments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn every_ledger_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/wallet",
            "/api/v1/wallet/transactions",
            "/api/v1/wallet/deposits",
            "/api/v1/wallet/deposits/{id}/proof",
            "/api/v1/wallet/withdrawals",
            "/api/v1/escrow/transactions",
            "/api/v1/escrow/transactions/{id}/decision",
            "/api/v1/investments",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path: {path}"
            );
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("ErrorSchema"));
        assert!(schemas.contains_key("TransactionResponse"));
    }
}
