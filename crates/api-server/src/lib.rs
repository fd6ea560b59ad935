//! HTTP API: the serving boundary consumed by the dashboard front end.

pub mod auth;
pub mod rest;
pub mod server;

pub use server::ApiServer;
