//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::transaction::{Decision, PaymentMethod};
use crate::domain::Error;

fn invalid_field_error(field: &str, value: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
    }))
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(value)
        .map_err(|_| invalid_field_error(field, value, format!("{field} must be a valid UUID")))
}

/// Parse a string-encoded decimal amount.
///
/// Amounts travel as JSON strings so clients never round them through binary
/// floats. Positivity is enforced by the ledger service, not here.
pub(crate) fn parse_amount(value: &str, field: &str) -> Result<BigDecimal, Error> {
    BigDecimal::from_str(value.trim()).map_err(|_| {
        Error::invalid_amount(format!("{field} must be a decimal number")).with_details(json!({
            "field": field,
            "value": value,
        }))
    })
}

pub(crate) fn parse_payment_method(value: &str) -> Result<PaymentMethod, Error> {
    value.parse::<PaymentMethod>().map_err(|_| {
        invalid_field_error(
            "paymentMethod",
            value,
            "payment method must be bank_transfer, mobile_money, or card",
        )
    })
}

pub(crate) fn parse_decision(value: &str) -> Result<Decision, Error> {
    value.parse::<Decision>().map_err(|_| {
        invalid_field_error("action", value, "action must be approve or reject")
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn parses_decimal_amounts() {
        let amount = parse_amount("2500.75", "amount").expect("amount");
        assert_eq!(amount, BigDecimal::from_str("2500.75").expect("decimal"));
    }

    #[rstest]
    #[case("")]
    #[case("12,5")]
    #[case("lots")]
    fn rejects_unparseable_amounts(#[case] raw: &str) {
        let err = parse_amount(raw, "amount").expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[rstest]
    fn uuid_errors_carry_field_details(#[values("amount", "projectId")] field: &str) {
        let err = parse_uuid("nope", field).expect_err("invalid uuid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
    }

    #[rstest]
    fn parses_payment_methods_and_decisions() {
        assert_eq!(
            parse_payment_method("mobile_money").expect("method"),
            PaymentMethod::MobileMoney
        );
        assert_eq!(parse_decision("reject").expect("decision"), Decision::Reject);
        assert!(parse_payment_method("cash").is_err());
        assert!(parse_decision("defer").is_err());
    }
}
