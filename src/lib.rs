//! Justified photo grid layout.
//!
//! Photos are ordered (selected first, newest first), packed into rows of a
//! common height that fill the container width exactly, and re-packed when
//! the container is resized or the selection changes.

pub mod error;
pub mod grid;
pub mod layout;
pub mod models;
pub mod selection;
pub mod source;
pub mod store;

pub use error::{FetchError, LayoutError};
pub use grid::{GridConfig, GridEvent, LoadOutcome, PhotoGrid};
pub use layout::{order, InvalidGeometryPolicy, PackOutcome, ReflowController, RowPacker};
pub use models::{Geometry, PhotoId, PhotoRecord, PlacedPhoto, Row};
pub use selection::{Completion, SelectionConfig, SelectionModel, SelectionState};
pub use source::{BusyIndicator, DirectorySource, PhotoSource, ScanConfig, WidthSource};
