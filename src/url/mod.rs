//! URL handling module for Sumi-Probe
//!
//! This module turns input lines into probe URLs and resolves redirect
//! targets, including the scheme-upgrade heuristic used to decide whether a
//! redirect is followed when redirect-following is switched off.

mod input;
mod redirect;

// Re-export main functions
pub use input::parse_input_url;
pub use redirect::{is_scheme_upgrade, resolve_redirect, should_follow};
