pub mod data;
pub mod health;
pub mod missions;
pub mod profiles;
