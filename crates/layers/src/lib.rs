pub mod cluster;
pub mod layer;
pub mod marker;
pub mod store;
pub mod symbology;

pub use cluster::*;
pub use layer::*;
pub use marker::*;
pub use store::*;
pub use symbology::*;
