//! Navigation Module
//!
//! Resolves a selected node to an address and shows it in the single
//! viewport, falling back to setting the address directly when the
//! viewport's engine is unavailable.
//!
//! # Components
//!
//! - [`address`]: Normalization of user-typed addresses
//! - [`viewport`]: The [`Viewport`] trait and the [`SystemBrowser`] viewport
//! - [`navigator`]: The viewport state machine and fallback policy

pub mod address;
pub mod navigator;
pub mod viewport;

pub use address::normalize_address;
pub use navigator::{resolve, Channel, NavigationReport, Navigator, ViewportState};
pub use viewport::{SystemBrowser, Viewport};
