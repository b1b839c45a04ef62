use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;

pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";
pub const ACTOR_NAME_HEADER: &str = "X-Actor-Name";

/// Caller identity forwarded by the portal gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub name: Option<String>,
}

impl Actor {
    /// Fails with 403 unless the actor holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }

    /// Merchants act only on their own submissions; curators are exempt.
    pub fn require_owner(&self, merchant_id: Option<Uuid>) -> Result<(), AppError> {
        if self.role == Role::Curator || merchant_id == Some(self.id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the submitting merchant can change this record".into(),
            ))
        }
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn extract_actor(req: &HttpRequest) -> Result<Actor, AppError> {
    let id = header(req, ACTOR_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {ACTOR_ID_HEADER} header")))
        .and_then(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Unauthorized(format!("Invalid {ACTOR_ID_HEADER} header")))
        })?;

    let role = header(req, ACTOR_ROLE_HEADER)
        .and_then(|raw| raw.parse::<Role>().ok())
        .unwrap_or(Role::Tourist);

    let name = header(req, ACTOR_NAME_HEADER).map(str::to_string);

    Ok(Actor { id, role, name })
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req))
    }
}
