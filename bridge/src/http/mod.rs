pub mod client;
pub mod devices;
