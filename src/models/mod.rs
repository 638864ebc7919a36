//! Data models

pub mod connection;
pub mod sample;

pub use connection::*;
pub use sample::*;
