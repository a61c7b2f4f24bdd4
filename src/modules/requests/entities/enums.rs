use sea_orm::{DeriveActiveEnum, EnumIter, prelude::StringLen};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::AppError;

/// Service tier of a request. Only `Red` is matched against the catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum RequestCategory {
    #[sea_orm(string_value = "GREEN")]
    Green,
    #[sea_orm(string_value = "BLUE")]
    Blue,
    #[sea_orm(string_value = "YELLOW")]
    Yellow,
    #[sea_orm(string_value = "PINK")]
    Pink,
    #[sea_orm(string_value = "RED")]
    Red,
}

impl RequestCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestCategory::Green => "green",
            RequestCategory::Blue => "blue",
            RequestCategory::Yellow => "yellow",
            RequestCategory::Pink => "pink",
            RequestCategory::Red => "red",
        }
    }
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; anything else is `InvalidCategory`.
impl FromStr for RequestCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(RequestCategory::Green),
            "blue" => Ok(RequestCategory::Blue),
            "yellow" => Ok(RequestCategory::Yellow),
            "pink" => Ok(RequestCategory::Pink),
            "red" => Ok(RequestCategory::Red),
            _ => Err(AppError::InvalidCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("RED".parse::<RequestCategory>().unwrap(), RequestCategory::Red);
        assert_eq!("Yellow".parse::<RequestCategory>().unwrap(), RequestCategory::Yellow);
        assert_eq!(RequestCategory::Pink.to_string(), "pink");
    }

    #[test]
    fn test_unknown_category() {
        match "purple".parse::<RequestCategory>() {
            Err(AppError::InvalidCategory(raw)) => assert_eq!(raw, "purple"),
            other => panic!("expected InvalidCategory, got {:?}", other),
        }
    }
}
