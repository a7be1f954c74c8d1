use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;

fn reject(req: ServiceRequest, message: &str) -> Result<ServiceResponse<BoxBody>, Error> {
    let resp = AppError::Unauthorized(message.to_string()).error_response();
    Ok(req.into_response(resp))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => return reject(req, "Invalid Authorization header encoding"),
        },
        None => return reject(req, "Missing Authorization header"),
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return reject(req, "Authorization header must start with Bearer");
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Token rejected");
            return reject(req, "Invalid or expired token");
        }
    };

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}
