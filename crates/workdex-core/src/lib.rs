#![deny(unused_variables)]
#![deny(unused_imports)]

//! Shared building blocks: domain types, engine traits, configuration and
//! the markdown corpus loader.

pub mod config;
pub mod corpus;
pub mod error;
pub mod text;
pub mod traits;
pub mod types;
