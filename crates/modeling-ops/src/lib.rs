pub mod chamfer;
pub mod diff;
pub mod extrude;
pub mod fillet;
pub mod kernel_ext;
pub mod revolve;
pub mod selection;
pub mod sketch;
pub mod thread;
pub mod types;

pub use chamfer::execute_chamfer;
pub use diff::{signature_similarity, snapshot, DiffResult, TopoSnapshot};
pub use extrude::execute_extrude;
pub use fillet::execute_fillet;
pub use kernel_ext::KernelBundle;
pub use revolve::execute_revolve;
pub use selection::{find_loop, single_edge_loop, EdgeSelection};
pub use sketch::{execute_sketch, to_sketch_space, SketchResult};
pub use thread::{execute_thread, recommend_metric_thread};
pub use types::*;
