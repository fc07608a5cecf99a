//! Ports (trait boundaries) between the core and its callers.

pub mod agent;
pub mod observer;

pub use agent::Agent;
pub use observer::Observer;
