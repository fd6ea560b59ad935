//! CRM REST client: paginated record fetching and a connectivity probe.

pub mod client;

pub use client::CrmClient;
