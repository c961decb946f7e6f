//! Application layer for the geoprojects map: the session that owns project
//! state and drives the viewport, plus the `geoprojects` CLI host.

pub mod session;

pub use session::*;
