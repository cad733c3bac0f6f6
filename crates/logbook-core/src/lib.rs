//! Authenticated content-sharing core.
//!
//! Flow: credentials go to the external directory for verification, the
//! session registry issues an opaque bearer token, and every subsequent
//! operation resolves that token back to an identity before touching the
//! content store or the social graph. The HTTP boundary is deliberately
//! absent; [`Logbook`] is the surface a router would call into.

pub mod blob;
pub mod config;
pub mod content;
pub mod search;
pub mod service;
pub mod session;
pub mod social;

pub use config::Config;
pub use service::Logbook;
pub use session::SessionRegistry;
