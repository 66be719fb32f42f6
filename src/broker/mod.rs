pub mod engine;
pub mod message;
pub mod retention;
pub mod topic;

pub use engine::Broker;
