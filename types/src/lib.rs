//! Core domain types for CapyFlows.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the persisted
//! client state (`AppState`), the address newtype it is built from, and the static
//! site metadata the landing page publishes.

mod address;
pub mod site;
mod state;

pub use address::{ADDRESS_HEX_LEN, Address, MalformedAddress};
pub use site::{LAUNCH_ROUTE, SITE, SiteMetadata};
pub use state::{AppState, DEFAULT_TOKEN, PartialProfile, Profile, ProfileInput};
