pub mod admin;
pub mod couples;
pub mod geocode;
pub mod health;
pub mod households;
pub mod interactions;
pub mod neighborhoods;
pub mod properties;
pub mod saved_searches;
pub mod users;
