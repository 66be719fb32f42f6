//! # RelaySub
//!
//! `relaysub` is a minimal publish/subscribe relay. Clients connect over TCP,
//! identify as a publisher or a subscriber with their first newline-delimited
//! JSON frame, and the broker forwards each published message to every
//! subscriber of that message's topic. Subscribers that join late still get
//! recent history: the broker retains messages for a bounded window and
//! replays them on subscription.
//!
//! ## Core Modules
//!
//! - `broker`: topic/subscriber bookkeeping, fan-out, and the retention buffer.
//! - `transport`: the TCP server, client classification, and the wire codec.
//! - `client`: the server-side connection handle plus publisher/subscriber stubs.
//! - `config`: loading and merging server configuration.
//! - `utils`: shared utilities such as logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
