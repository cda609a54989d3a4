use crate::config::Config;
use crate::model::role::{Capability, Role};
use crate::models::Claims;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

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
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    /// Single authorization gate; the role/capability matrix lives on `Role`.
    pub fn require(&self, capability: Capability) -> actix_web::Result<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Insufficient role"))
        }
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    /// The employee id this request may act on: staff roles may act on any
    /// employee, self-service users only on their own profile.
    pub fn acting_employee_id(&self, requested: Option<u64>) -> actix_web::Result<u64> {
        match requested {
            Some(id) if self.role != Role::Employee => Ok(id),
            Some(id) => match self.employee_id {
                Some(own) if own == id => Ok(id),
                _ => Err(actix_web::error::ErrorForbidden(
                    "Cannot act on another employee",
                )),
            },
            None => self
                .employee_id
                .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile")),
        }
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}
