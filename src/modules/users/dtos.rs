use serde::Deserialize;

/// Manager edit of another account. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    pub name: Option<String>,
    pub role: Option<i32>,
    pub contract_id: Option<String>,
}
