pub mod deletion;
