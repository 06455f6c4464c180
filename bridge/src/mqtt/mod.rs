pub mod client;
pub mod publisher;
pub mod topics;
