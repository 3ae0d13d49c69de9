//! Streaming upstream proxy.
//!
//! Forwards proxied requests to a configured origin over plain TCP and
//! streams the origin's body back as a chunked response with integrity
//! trailers.

pub mod upstream;

pub use upstream::{UpstreamClient, UpstreamResponse};
