//! Collaborator seams of the grid pipeline.
//!
//! - `PhotoSource` - asynchronous photo listing
//! - `WidthSource` - current container width
//! - `BusyIndicator` - progress signal bracketing each fetch
//! - `DirectorySource` - `PhotoSource` over image files on disk

pub mod directory;

use std::future::Future;
use std::sync::Arc;

use crate::error::FetchError;
use crate::models::PhotoRecord;

pub use directory::{DirectorySource, ScanConfig};

/// Asynchronous provider of the photo list.
pub trait PhotoSource: Send + Sync + 'static {
    fn list_photos(&self) -> impl Future<Output = Result<Vec<PhotoRecord>, FetchError>> + Send;
}

/// Synchronous query of the usable container width (scrollbar excluded).
pub trait WidthSource: Send + Sync + 'static {
    fn current_width(&self) -> f32;
}

impl<F> WidthSource for F
where
    F: Fn() -> f32 + Send + Sync + 'static,
{
    fn current_width(&self) -> f32 {
        self()
    }
}

/// Progress indicator raised while a fetch is in flight.
pub trait BusyIndicator: Send + Sync + 'static {
    fn raise(&self);
    fn lower(&self);
}

impl<B: BusyIndicator + ?Sized> BusyIndicator for Arc<B> {
    fn raise(&self) {
        (**self).raise();
    }
    fn lower(&self) {
        (**self).lower();
    }
}

/// Busy indicator that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBusyIndicator;

impl BusyIndicator for NoBusyIndicator {
    fn raise(&self) {}
    fn lower(&self) {}
}

/// Raises the indicator on creation and lowers it on drop, so the indicator
/// is lowered on success, failure and cancellation alike.
pub(crate) struct BusyGuard<'a, B: BusyIndicator + ?Sized> {
    indicator: &'a B,
}

impl<'a, B: BusyIndicator + ?Sized> BusyGuard<'a, B> {
    pub(crate) fn raise(indicator: &'a B) -> Self {
        indicator.raise();
        Self { indicator }
    }
}

impl<B: BusyIndicator + ?Sized> Drop for BusyGuard<'_, B> {
    fn drop(&mut self) {
        self.indicator.lower();
    }
}
