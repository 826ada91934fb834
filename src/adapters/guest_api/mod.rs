//! Guest API adapters.
//!
//! - `HttpGuestApi` - reqwest client for the guest and organizer endpoints

mod http_guest_api;
mod wire;

pub use http_guest_api::{HttpGuestApi, HttpGuestApiConfig};
