//! HTTP handlers

pub mod anomaly;
pub mod health;
pub mod monitor;
