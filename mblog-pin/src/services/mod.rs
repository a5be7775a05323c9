//! Upstream service clients

pub mod pinata_client;

pub use pinata_client::{PinError, PinataClient};
