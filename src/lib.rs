//! Folio book catalog service.
//!
//! Wires the auth and books modules into the kernel registry and exposes the
//! bootstrap used by the `folio-app` binary and the `folio` CLI.

pub mod app;
pub mod modules;

pub use app::App;
