//! Principal extraction from gateway headers.
//!
//! The platform gateway terminates authentication and forwards the caller's
//! identity on every request as `X-Principal-Id` (a UUID) and
//! `X-Principal-Role`. This extractor turns that pair into a domain
//! [`Principal`], answering `401 Unauthorized` when either header is missing
//! or malformed.

use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, Principal, Role, UserId};

/// Header carrying the authenticated user's UUID.
pub const PRINCIPAL_ID_HEADER: &str = "X-Principal-Id";
/// Header carrying the authenticated user's platform role.
pub const PRINCIPAL_ROLE_HEADER: &str = "X-Principal-Role";

/// Extractor wrapper exposing the authenticated principal to handlers.
#[derive(Debug, Clone, Copy)]
pub struct PrincipalContext(pub Principal);

impl PrincipalContext {
    /// The authenticated principal.
    pub const fn principal(&self) -> Principal {
        self.0
    }

    /// The authenticated user's id.
    pub const fn user_id(&self) -> UserId {
        self.0.id
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, Error> {
    headers
        .get(name)
        .ok_or_else(|| Error::unauthorized(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| Error::unauthorized(format!("{name} header is not valid ASCII")))
}

fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, Error> {
    let id = header_str(headers, PRINCIPAL_ID_HEADER)?
        .parse::<UserId>()
        .map_err(|_| Error::unauthorized("principal id must be a UUID"))?;
    let role = header_str(headers, PRINCIPAL_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|err| Error::unauthorized(err.to_string()))?;
    Ok(Principal::new(id, role))
}

impl FromRequest for PrincipalContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(principal_from_headers(req.headers()).map(PrincipalContext))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::{HeaderName, HeaderValue};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ErrorCode;

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).expect("header name"),
                HeaderValue::from_str(value).expect("header value"),
            );
        }
        map
    }

    #[rstest]
    fn extracts_a_well_formed_principal() {
        let id = Uuid::new_v4();
        let map = headers(&[
            ("x-principal-id", &id.to_string()),
            ("x-principal-role", "EscrowManager"),
        ]);
        let principal = principal_from_headers(&map).expect("principal");
        assert_eq!(principal.id, UserId::from_uuid(id));
        assert_eq!(principal.role, Role::EscrowManager);
    }

    #[rstest]
    fn missing_id_header_is_unauthorised() {
        let map = headers(&[("x-principal-role", "Investor")]);
        let err = principal_from_headers(&map).expect_err("missing id");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("not-a-uuid", "Investor")]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", "Superuser")]
    fn malformed_headers_are_unauthorised(#[case] id: &str, #[case] role: &str) {
        let map = headers(&[("x-principal-id", id), ("x-principal-role", role)]);
        let err = principal_from_headers(&map).expect_err("malformed");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
