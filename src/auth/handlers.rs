use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::{
    api::employee::{EmployeeRequest, EmployeeResponse, create_employee_record},
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::{AppError, AppResult},
    model::role::Role,
    models::{JwtAuthResponse, LoginReqDto},
    state::AppState,
};

/// Self-registration
///
/// Requested roles are honoured; an empty role list registers a plain employee.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = EmployeeRequest,
    responses(
        (status = 201, description = "Employee registered", body = EmployeeResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Code or email already in use")
    ),
    tag = "Auth"
)]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<EmployeeRequest>,
) -> AppResult<HttpResponse> {
    let mut request = payload.into_inner();
    if request.roles.is_empty() {
        request.roles.push(Role::Employee);
    }

    let employee = create_employee_record(&state, request).await?;
    info!(employee_id = employee.id, "Employee registered");
    Ok(HttpResponse::Created().json(EmployeeResponse::from(employee)))
}

/// Login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Bearer token issued", body = JwtAuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(employee) = state.employees.find_by_email(user.email.trim()).await? else {
        info!("Invalid credentials: employee not found");
        return Err(invalid());
    };

    if !verify_password(&user.password, &employee.password_hash) {
        info!(employee_id = employee.id, "Invalid credentials: password mismatch");
        return Err(invalid());
    }
    if !employee.is_active() {
        info!(employee_id = employee.id, "Login refused: employee disabled");
        return Err(AppError::Unauthorized("Account is disabled".into()));
    }

    debug!("Generating access token");
    let access_token =
        generate_access_token(&employee, &config.jwt_secret, config.access_token_ttl)?;

    info!(employee_id = employee.id, "Login successful");
    Ok(HttpResponse::Ok().json(JwtAuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        roles: Role::join(&employee.roles),
        employee_code: employee.code,
        employee_email: employee.email,
    }))
}
