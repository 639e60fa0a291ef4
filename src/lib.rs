// ocexport - Commerce catalog migration to OrderCloud
// Copyright (c) 2026 ocexport Contributors
// Licensed under the MIT License

//! ocexport - Commerce catalog migration to OrderCloud
//!
//! A one-shot batch migration tool that exports a source commerce
//! platform's shops, customers, catalogs, categories, and sellable items
//! into an OrderCloud marketplace through its REST API.
//!
//! # Architecture
//!
//! - [`config`] - TOML configuration with environment overrides
//! - [`domain`] - errors, identifier sanitization, source entity model,
//!   variation summaries
//! - [`adapters`] - the OrderCloud HTTP client behind the
//!   [`adapters::ordercloud::OrderCloudApi`] trait, and the snapshot-backed
//!   [`adapters::source::SourceStore`]
//! - [`core`] - the export orchestrator, one mapper stage per entity kind,
//!   and the per-category result counters
//! - [`cli`] - clap command definitions
//! - [`logging`] - tracing subscriber setup
//!
//! Every remote write is an idempotent upsert keyed on a sanitized,
//! deterministic ID, so re-running a partially failed migration converges
//! instead of duplicating.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
