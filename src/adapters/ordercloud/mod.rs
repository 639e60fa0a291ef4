//! OrderCloud marketplace adapter

pub mod api;
pub mod client;
pub mod models;

pub use api::OrderCloudApi;
pub use client::OrderCloudClient;
