//! ActuNews - a small news publishing backend
//!
//! This library provides the REST API, persistence and the entity lifecycle
//! pipeline (alias derivation, password hashing, welcome email).

pub mod api;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod services;
