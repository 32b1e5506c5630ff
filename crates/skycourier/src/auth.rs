//! bearer-token authentication for the api.
//!
//! callers present `Authorization: Bearer <jwt>` signed with the server's
//! hs256 secret; the claims carry the principal's `name` and `kind`.
//!
//! ## Authentication Flow
//!
//! 1. the [`require_auth`] middleware checks the configured allowlist of
//!    unauthenticated paths (the health check lives there)
//! 2. otherwise it extracts and validates the bearer token
//! 3. the resulting [`Principal`] is stored in request extensions
//! 4. handlers recover it through the `FromRequestParts` extractor and gate
//!    on the principal kind
//!
//! an admin self-claim alone is never enough: [`require_admin`] re-reads the
//! persisted user row and rejects unless the stored role is `admin`.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::ApiError;
use skycourier_db::Database;

/// the kind of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// fleet administrator.
    Admin,
    /// end user placing orders.
    EndUser,
    /// delivery drone.
    Drone,
}

impl PrincipalKind {
    /// parse a claim value, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(PrincipalKind::Admin),
            "enduser" => Some(PrincipalKind::EndUser),
            "drone" => Some(PrincipalKind::Drone),
            _ => None,
        }
    }

    /// the canonical lowercase form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin",
            PrincipalKind::EndUser => "enduser",
            PrincipalKind::Drone => "drone",
        }
    }
}

/// the authenticated caller identity.
#[derive(Debug, Clone)]
pub struct Principal {
    /// username for users/admins, serial number (or name) for drones.
    pub name: String,
    /// caller kind.
    pub kind: PrincipalKind,
}

/// jwt claims carried by the bearer credential.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    name: String,
    kind: String,
    exp: u64,
}

/// sign a bearer token for the given principal, valid for `ttl_secs`.
pub fn sign_token(
    secret: &str,
    name: &str,
    kind: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        name: name.to_string(),
        kind: kind.to_string(),
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// parse a Bearer token from the Authorization header value.
fn parse_bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ").map(str::trim)
}

/// validate a bearer jwt and produce the principal.
fn principal_from_token(token: &str, secret: &str) -> Result<Principal, ApiError> {
    if secret.is_empty() {
        return Err(ApiError::internal("jwt secret is not configured"));
    }

    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ApiError::unauthenticated(format!("invalid token: {e}")))?;

    if data.claims.name.is_empty() || data.claims.kind.is_empty() {
        return Err(ApiError::unauthenticated("invalid claims"));
    }
    let kind = PrincipalKind::parse(&data.claims.kind)
        .ok_or_else(|| ApiError::unauthenticated("invalid principal kind"))?;

    Ok(Principal {
        name: data.claims.name,
        kind,
    })
}

/// authentication middleware.
///
/// paths on the configured allowlist pass through untouched; everything else
/// must carry a valid bearer token, and the resulting principal is injected
/// into request extensions.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if state
        .config
        .auth
        .allow_unauthenticated
        .iter()
        .any(|allowed| allowed == &path)
    {
        return next.run(req).await;
    }

    let header = match req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => return ApiError::unauthenticated("missing authorization").into_response(),
    };
    let token = match parse_bearer_token(header) {
        Some(token) => token,
        None => return ApiError::unauthenticated("invalid authorization header").into_response(),
    };

    match principal_from_token(token, &state.config.auth.jwt_secret) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("missing principal"))
    }
}

/// the caller must be a drone.
pub fn require_drone(principal: &Principal) -> Result<(), ApiError> {
    if principal.kind != PrincipalKind::Drone {
        return Err(ApiError::permission_denied(
            "only drone can perform this action",
        ));
    }
    Ok(())
}

/// the caller must be an end user or an admin.
pub fn require_end_user_or_admin(principal: &Principal) -> Result<(), ApiError> {
    if principal.kind != PrincipalKind::EndUser && principal.kind != PrincipalKind::Admin {
        return Err(ApiError::permission_denied(
            "only enduser or admin can perform this action",
        ));
    }
    Ok(())
}

/// the caller must claim admin AND the persisted user row must carry the
/// admin role. the second check is what defeats spoofed claims.
pub async fn require_admin<D: Database>(db: &D, principal: &Principal) -> Result<(), ApiError> {
    if principal.kind != PrincipalKind::Admin {
        return Err(ApiError::permission_denied(
            "only admin can perform this action",
        ));
    }
    let user = db
        .get_user_by_username(&principal.name)
        .await
        .map_err(ApiError::internal)?;
    match user {
        Some(user) if user.role.is_admin() => Ok(()),
        _ => Err(ApiError::permission_denied(
            "only admin can perform this action",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_parse_bearer_token() {
        assert_eq!(parse_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer_token("Bearer  abc123 "), Some("abc123"));
        assert_eq!(parse_bearer_token("Basic abc123"), None);
        assert_eq!(parse_bearer_token("bearer abc123"), None); // case sensitive
        assert_eq!(parse_bearer_token(""), None);
    }

    #[test]
    fn test_principal_kind_parse() {
        assert_eq!(PrincipalKind::parse("drone"), Some(PrincipalKind::Drone));
        assert_eq!(PrincipalKind::parse("Drone"), Some(PrincipalKind::Drone));
        assert_eq!(PrincipalKind::parse(" ADMIN "), Some(PrincipalKind::Admin));
        assert_eq!(PrincipalKind::parse("enduser"), Some(PrincipalKind::EndUser));
        assert_eq!(PrincipalKind::parse("courier"), None);
    }

    #[test]
    fn test_token_round_trip() {
        let token = sign_token(SECRET, "SN-42", "drone", 3600).unwrap();
        let principal = principal_from_token(&token, SECRET).unwrap();
        assert_eq!(principal.name, "SN-42");
        assert_eq!(principal.kind, PrincipalKind::Drone);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_token(SECRET, "SN-42", "drone", 3600).unwrap();
        assert!(principal_from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(principal_from_token("not.a.jwt", SECRET).is_err());
        assert!(principal_from_token("", SECRET).is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let token = sign_token(SECRET, "bob", "superuser", 3600).unwrap();
        assert!(principal_from_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_kind_claim_is_case_insensitive() {
        let token = sign_token(SECRET, "bob", "EndUser", 3600).unwrap();
        let principal = principal_from_token(&token, SECRET).unwrap();
        assert_eq!(principal.kind, PrincipalKind::EndUser);
    }

    #[test]
    fn test_gate_helpers() {
        let drone = Principal {
            name: "SN-1".to_string(),
            kind: PrincipalKind::Drone,
        };
        let user = Principal {
            name: "alice".to_string(),
            kind: PrincipalKind::EndUser,
        };
        let admin = Principal {
            name: "root".to_string(),
            kind: PrincipalKind::Admin,
        };

        assert!(require_drone(&drone).is_ok());
        assert!(require_drone(&user).is_err());
        assert!(require_end_user_or_admin(&user).is_ok());
        assert!(require_end_user_or_admin(&admin).is_ok());
        assert!(require_end_user_or_admin(&drone).is_err());
    }
}
