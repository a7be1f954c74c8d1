use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;
use crate::models::Claims;

/// The authenticated caller, taken from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub code: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            employee_id: claims.employee_id,
            code: claims.sub,
            email: claims.email,
            roles: claims.roles,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by auth_middleware on protected routes.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(AppError::Unauthorized("Missing token".into()))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::Internal("Config missing".into()))),
        };

        ready(
            verify_token(token, &config.jwt_secret)
                .map(AuthUser::from)
                .map_err(|_| AppError::Unauthorized("Invalid token".into())),
        )
    }
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Admins and managers may act on any employee's records.
    pub fn is_staff(&self) -> bool {
        self.has_role(Role::Admin) || self.has_role(Role::Manager)
    }

    pub fn require_any(&self, roles: &[Role]) -> AppResult<()> {
        if roles.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            let names: Vec<&str> = roles.iter().map(|r| r.as_ref()).collect();
            Err(AppError::AccessDenied(format!(
                "Requires one of: {}",
                names.join(", ")
            )))
        }
    }

    pub fn require_staff(&self) -> AppResult<()> {
        self.require_any(&[Role::Admin, Role::Manager])
    }

    /// Employees without a staff role may only reach their own records.
    pub fn ensure_owner_or_staff(&self, employee_id: u64) -> AppResult<()> {
        if self.is_staff() || self.employee_id == employee_id {
            Ok(())
        } else {
            Err(AppError::AccessDenied(
                "You can only access your own records".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> AuthUser {
        AuthUser {
            employee_id: 7,
            code: "EMP-7".into(),
            email: "emp7@gov.rw".into(),
            roles,
        }
    }

    #[test]
    fn employees_only_reach_their_own_records() {
        let employee = user(vec![Role::Employee]);
        assert!(employee.ensure_owner_or_staff(7).is_ok());
        assert!(matches!(
            employee.ensure_owner_or_staff(8),
            Err(AppError::AccessDenied(_))
        ));

        let manager = user(vec![Role::Employee, Role::Manager]);
        assert!(manager.ensure_owner_or_staff(8).is_ok());
    }

    #[test]
    fn require_any_matches_one_role() {
        let admin = user(vec![Role::Admin]);
        assert!(admin.require_any(&[Role::Admin]).is_ok());
        assert!(admin.require_any(&[Role::Manager]).is_err());
        assert!(admin.require_staff().is_ok());
    }
}
