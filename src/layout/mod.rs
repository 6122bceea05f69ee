//! Ordering, packing and reflow of the photo grid.

pub mod ordering;
pub mod packer;
pub mod reflow;

pub use ordering::order;
pub use packer::{InvalidGeometryPolicy, PackOutcome, RowPacker, DEFAULT_GAP};
pub use reflow::ReflowController;
