//! Library exports for the idea board backend
//!
//! This module exposes internal components for testing and potential library usage.

pub mod database;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod model;
pub mod route;
