pub mod journal;
pub mod mock_kernel;
pub mod thread_data;
pub mod traits;
pub mod types;

pub use journal::{JournalingKernel, KernelCall};
pub use mock_kernel::MockKernel;
pub use thread_data::{MetricThreadTable, NoThreadData, ThreadDataQuery};
pub use traits::*;
pub use types::*;

/// Tolerances for geometric comparisons inside the kernel.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (centimeters).
    pub coincidence: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            angular: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }

    pub fn is_zero_area(&self, area: f64) -> bool {
        area.abs() < self.coincidence * self.coincidence
    }
}
