use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane.doe@gov.rw")]
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct JwtAuthResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    pub employee_code: String,
    pub employee_email: String,
    /// Comma separated, e.g. `ROLE_EMPLOYEE,ROLE_MANAGER`.
    pub roles: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Employee code.
    pub sub: String,
    pub employee_id: u64,
    pub email: String,
    pub roles: Vec<Role>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}
