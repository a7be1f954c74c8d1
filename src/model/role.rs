use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[strum(serialize = "ROLE_EMPLOYEE")]
    #[serde(rename = "ROLE_EMPLOYEE")]
    Employee,
    #[strum(serialize = "ROLE_MANAGER")]
    #[serde(rename = "ROLE_MANAGER")]
    Manager,
    #[strum(serialize = "ROLE_ADMIN")]
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn join(roles: &[Role]) -> String {
        roles
            .iter()
            .map(|r| r.as_ref())
            .collect::<Vec<_>>()
            .join(",")
    }
}
