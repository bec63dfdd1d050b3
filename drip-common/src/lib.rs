//! Shared library for Drip services
//!
//! Holds the pieces every Drip microservice needs: the common error type,
//! config file resolution, and the wire types exchanged with the wardrobe
//! catalog service.

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
