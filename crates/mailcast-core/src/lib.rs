//! mailcast core: recipient resolution and notification dispatch.
//!
//! Relays inbound email to chat-platform recipients. An address book maps
//! verified email aliases to notification targets; the pipeline parses an
//! inbound envelope, normalizes its encoding, resolves the enabled alias,
//! and hands the composed message to the dispatch gateway, which delivers
//! it over the push channel and an optional event-bus side-channel.
//!
//! Components take their collaborators as constructor parameters; the
//! [`RelayService`] composition root wires them together, either from
//! explicit instances or from [`RelayConfig`] with the HTTP clients.

pub mod address;
pub mod config;
pub mod dispatch;
pub mod identity;
pub mod identity_provider;
pub mod ids;
pub mod ingest;
pub mod messenger;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod token;

pub use config::RelayConfig;
pub use service::RelayService;

#[cfg(test)]
mod tests;
