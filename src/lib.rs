//! Build-time helpers for the personal website.
//!
//! - [`last_modified`] records the newest file time per site directory into
//!   `last-modified.json` for cache busting and "last updated" labels.
//! - [`rotate`] produces the 180-degree rotated piece set used by the
//!   xiangqi board when it is viewed from the other side.
//! - [`script_check`] looks for the CCBridge switch in the board script.

pub mod config;
pub mod last_modified;
pub mod report;
pub mod rotate;
pub mod scanner;
pub mod script_check;
