//! HTTP API types shared across Drip services

pub mod types;
