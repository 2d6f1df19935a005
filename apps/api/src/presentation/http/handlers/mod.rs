pub mod auth;
pub mod graphics;
pub mod health;
pub mod report;
pub mod status;
pub mod upload;
