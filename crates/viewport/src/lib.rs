//! Map viewport core: keeps marker, cluster and selection layers in sync with
//! application state and drives the camera of an abstract map engine.

pub mod camera;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod fit;
pub mod headless;

pub use camera::*;
pub use config::*;
pub use controller::*;
pub use engine::*;
pub use error::*;
pub use fit::*;
pub use headless::*;
