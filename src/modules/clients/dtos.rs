use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateClientDto {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientDto {
    pub name: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CostDto {
    pub green: i32,
    pub blue: i32,
    pub yellow: i32,
    pub pink: i32,
    pub red: i32,
}
