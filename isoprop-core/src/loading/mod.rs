//! This module decodes the binary payloads written by the routing backend and
//! loads them from disk into a [`Network`](crate::Network).

mod builder;
pub mod codec;
mod config;

pub use builder::{load_network, load_origin};
pub use config::{GridSource, NetworkConfig};
