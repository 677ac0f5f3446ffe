//! # beacon-gateway
//!
//! REST API and WebSocket gateway for realtime site analytics and
//! notification campaign targeting.
//!
//! The gateway ingests tracking signals (page views, user events, click
//! counters, conversions), folds them into a live metrics snapshot, and
//! evaluates notification campaigns against per-session view history.
//! Every tracking write publishes a change event on an in-process bus;
//! the metrics aggregator and WebSocket subscribers consume that feed.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── TrackingService / NotificationService (service/)
//!     ├── MetricsAggregator (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── NotificationCatalog (domain/)
//!     ├── Scheduled Jobs (jobs/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod persistence;
pub mod service;
pub mod ws;
