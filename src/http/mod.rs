//! HTTP/1.1 protocol engine.
//!
//! This module implements the message layer of the server: an incremental
//! request parser that tolerates arbitrarily-sized partial reads, and a
//! response writer that enforces the wire order of an HTTP/1.1 response.
//!
//! # Architecture
//!
//! - **`headers`**: the header map and the resumable header-block parser
//! - **`buffer`**: the growable read arena owned by one connection
//! - **`request`**: the request representation (method, target, headers, body)
//! - **`parser`**: the request parsing state machine and its read-loop driver
//! - **`response`**: status codes and default response headers
//! - **`writer`**: the state-ordered response writer, plain and chunked
//! - **`connection`**: the per-connection driver tying parser and writer together
//!
//! # Parser State Machine
//!
//! Each request moves through a strictly linear state machine as bytes
//! arrive from the socket:
//!
//! ```text
//!     ┌─────────────┐
//!     │ Initialized │ ← Waiting for the complete request line
//!     └──────┬──────┘
//!            │ Request line accepted
//!            ▼
//!     ┌────────────────┐
//!     │ ParsingHeaders │ ← One CRLF-terminated field line at a time
//!     └──────┬─────────┘
//!            │ Empty line seen
//!            ▼
//!     ┌─────────────┐
//!     │ ParsingBody │ ← Up to the declared Content-Length
//!     └──────┬──────┘
//!            │ Declared length reached (or no length declared)
//!            ▼
//!     ┌──────┐
//!     │ Done │ ← Request is immutable; further data is a protocol error
//!     └──────┘
//! ```
//!
//! A state that cannot make progress on the bytes it was given does not
//! fail; it reports zero consumed bytes and the caller performs the next
//! read. Only malformed input or a stream that ends mid-message is an
//! error.

pub mod buffer;
pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
