pub mod annotations;
pub mod common;
pub mod config;
pub mod definitions;
pub mod error;
