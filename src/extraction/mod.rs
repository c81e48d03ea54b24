pub mod flatten;
pub mod gateway;
pub mod schema;
