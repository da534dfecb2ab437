//! Core types for GoMarketplace.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod line_item;

pub use cart::{Cart, find_position};
pub use id::ProductId;
pub use line_item::{LineItem, NewLineItem};
