use crate::config::Config;
use crate::{auth::jwt::verify_token, model::role::Role};
use actix_web::{
    FromRequest, HttpRequest,
    dev::Payload,
    error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized},
    web::Data,
};
use futures::future::{Ready, ready};

pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ErrorInternalServerError("Config missing"))),
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return ready(Err(ErrorUnauthorized("Invalid token")));
            }
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(ErrorForbidden("HR/Admin only"))
        }
    }

    /// The employee record behind this user, for self-service endpoints.
    pub fn own_employee_id(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| ErrorForbidden("No employee profile"))
    }

    /// HR/Admin see everyone; employees only themselves.
    pub fn require_self_or_hr(&self, employee_id: u64) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(ErrorForbidden("Not allowed to view other employees"))
        }
    }

    /// Admins see every record; anyone else only their own.
    pub fn require_self_or_admin(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.role == Role::Admin || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(ErrorForbidden("Not allowed to view other employees"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "someone".into(),
            role,
            employee_id,
        }
    }

    #[test]
    fn role_gates() {
        assert!(user(Role::Admin, None).require_admin().is_ok());
        assert!(user(Role::Hr, None).require_admin().is_err());
        assert!(user(Role::Hr, None).require_hr_or_admin().is_ok());
        assert!(user(Role::Employee, Some(3)).require_hr_or_admin().is_err());
    }

    #[test]
    fn employees_only_see_themselves() {
        let employee = user(Role::Employee, Some(3));
        assert!(employee.require_self_or_hr(3).is_ok());
        assert!(employee.require_self_or_hr(4).is_err());
        assert!(employee.require_self_or_admin(3).is_ok());
        assert!(user(Role::Hr, None).require_self_or_hr(4).is_ok());
        assert!(user(Role::Hr, Some(2)).require_self_or_admin(4).is_err());
        assert!(user(Role::Employee, None).own_employee_id().is_err());
    }
}
