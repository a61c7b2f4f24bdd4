use serde::Deserialize;

// Fields default to empty so that missing input surfaces as a field-level
// validation error instead of a JSON rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupDto {
    pub name: String,
    pub email: String,
    pub password: String,
    pub contract_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordResetRequestDto {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordDto {
    pub token: String,
    pub password: String,
}
