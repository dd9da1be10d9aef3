//! MongoDB / DocumentDB backend for the insert benchmark.
//!
//! Provides the trust store built from the cluster's CA bundle and a
//! [`loadtest_core::Connector`] that gives every worker its own TLS,
//! password-authenticated client.

pub mod connect;
pub mod handshake;
pub mod session;
pub mod trust;

pub use connect::{client_options, connection_string, redacted_connection_string, MongoConnector};
pub use handshake::HandshakeWatch;
pub use session::MongoSession;
pub use trust::{build_trust_config, TrustConfig};
