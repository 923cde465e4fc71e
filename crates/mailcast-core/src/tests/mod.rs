//! Service-level tests.
//!
//! Each module exercises one slice of the relay against the in-memory
//! store and event bus, with hand-rolled fakes for the external
//! surfaces (messenger, token service, identity provider).

pub mod common;

mod token;
