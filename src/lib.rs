//! signdesk: editor shell around the `canvas` annotation engine.
//!
//! The engine crate handles pointer input, annotations, history and
//! painting. This crate is the host side: it loads the document (with a
//! direct-URL fallback), renders pages through the cache, gates and submits
//! the save, locks the editor afterwards, and reports outcomes as toasts.
//! The `signdesk` binary replays recorded sessions headlessly.

pub mod backend;
pub mod config;
pub mod document;
pub mod headless;
pub mod notify;
pub mod replay;
pub mod session;
pub mod submit;

#[cfg(test)]
mod test_support;
