//! GoMarketplace Core - Shared cart types.
//!
//! This crate provides the types shared by every GoMarketplace component:
//! - `cart` - Cart store, persistence and provider scope
//! - `cli` - Command-line front end for inspecting and editing the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, line items and the cart snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
