//! Configuration, wire models and the clock shared by both handlers

pub mod clock;
pub mod config;
pub mod models;
