pub mod accounts;
pub mod extract;
pub mod health;
