//! External system adapters

pub mod ordercloud;
pub mod source;
