//! Interactive console for the Switchboard IVR menus.
//!
//! Loads configuration, opens the call database, and walks a single call
//! through the demo menus from line-oriented input.

pub mod config;
pub mod menus;
pub mod session;
