pub mod auth;
pub mod catalog;
pub mod clients;
pub mod matching;
pub mod requests;
pub mod users;
