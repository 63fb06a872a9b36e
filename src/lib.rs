//! Cliente Consolidado API Library
//!
//! Aggregates customer segmentation, the customer registry and paginated
//! purchase details from upstream REST services into one consolidated list,
//! and keeps the process awake on auto-sleeping hosts with a periodic self-ping.
//!
//! # Modules
//!
//! - `api`: HTTP-layer components.
//! - `core`: Consolidation logic, models and errors.
//! - `integrations`: Outbound HTTP (upstreams, self-ping).
//! - `config`: Configuration management.
//! - `consolidator`: Payload normalization and the customer join.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `health`: Process-wide health counters.
//! - `keep_alive`: Periodic self-ping.
//! - `models`: Data models.
//! - `router`: Route table.
//! - `services`: Upstream orchestration.
//! - `upstream_client`: Client for the data upstreams.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod consolidator;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod keep_alive;
pub mod models;
pub mod router;
pub mod services;
pub mod upstream_client;
