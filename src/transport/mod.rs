//! The `transport` module handles network communication with clients:
//! the wire codec (one JSON object per line), classification of freshly
//! accepted connections, and the TCP server itself.

pub mod message;
pub mod tcp;
