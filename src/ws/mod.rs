//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams change events to dashboard
//! clients, filtered per connection by activity stream.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
