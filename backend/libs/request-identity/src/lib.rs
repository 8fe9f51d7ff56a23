//! Caller identity propagated between services.
//!
//! The gateway verifies the bearer token against the auth service and
//! forwards the resulting claims as `X-User-Id` / `X-User-Role` headers;
//! downstream services trust those headers for their authorization
//! checks instead of re-verifying the token themselves.

use actix_web::dev::Payload;
use actix_web::error::{ErrorForbidden, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The two roles the platform knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity extracted from the propagated headers.
///
/// Extraction fails with 403 when the role header is missing or unknown;
/// the id header is optional because admin-only routes in some services
/// are called without it.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user_id: Option<i64>,
    pub role: Role,
}

impl RequestIdentity {
    pub fn require_role(&self, role: Role) -> Result<(), actix_web::Error> {
        if self.role == role {
            Ok(())
        } else {
            Err(ErrorForbidden("Forbidden"))
        }
    }

    pub fn require_user_id(&self) -> Result<i64, actix_web::Error> {
        self.user_id
            .ok_or_else(|| ErrorUnauthorized("Missing X-User-Id header"))
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

impl FromRequest for RequestIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let role = header_str(req, USER_ROLE_HEADER).and_then(Role::parse);
        let user_id = header_str(req, USER_ID_HEADER).and_then(|value| value.parse().ok());

        ready(match role {
            Some(role) => Ok(RequestIdentity { user_id, role }),
            None => Err(ErrorForbidden("Forbidden")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn extracts_id_and_role() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "12"))
            .insert_header((USER_ROLE_HEADER, "client"))
            .to_http_request();

        let identity = RequestIdentity::extract(&req).await.unwrap();
        assert_eq!(identity.user_id, Some(12));
        assert_eq!(identity.role, Role::Client);
        assert!(identity.require_role(Role::Client).is_ok());
        assert!(identity.require_role(Role::Admin).is_err());
    }

    #[actix_web::test]
    async fn missing_role_is_forbidden() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "12"))
            .to_http_request();

        assert!(RequestIdentity::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn unknown_role_is_forbidden() {
        let req = TestRequest::default()
            .insert_header((USER_ROLE_HEADER, "superuser"))
            .to_http_request();

        assert!(RequestIdentity::extract(&req).await.is_err());
    }

    #[test]
    fn role_round_trip() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("client"), Some(Role::Client));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
