pub mod features;
pub mod geometry;
pub mod roles;
pub mod sketch;
pub mod topo;

pub use features::*;
pub use geometry::*;
pub use roles::*;
pub use sketch::*;
pub use topo::*;
