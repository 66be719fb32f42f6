//! The `client` module holds everything that represents one side of a
//! connection: the `Client` handle the broker keeps for each registered
//! subscriber, and the `Publisher`/`Subscriber` stubs the command-line front
//! ends use to talk to a running broker.

pub mod handle;
pub mod publisher;
pub mod subscriber;

pub use handle::Client;
pub use publisher::Publisher;
pub use subscriber::Subscriber;

#[cfg(test)]
mod tests;
