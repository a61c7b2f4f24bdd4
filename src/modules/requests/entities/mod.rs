pub mod enums;
pub mod request;
