//! The photo grid pipeline.
//!
//! `PhotoGrid` owns the photo list and selection state and re-derives rows
//! through ordering and packing whenever the list, the container width or the
//! selection changes. Results go to the host as [`GridEvent`]s on a flume
//! channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flume::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::FetchError;
use crate::layout::reflow::DEFAULT_QUIESCENCE;
use crate::layout::{order, InvalidGeometryPolicy, ReflowController, RowPacker, DEFAULT_GAP};
use crate::models::{PhotoId, PhotoRecord, Row};
use crate::selection::{Completion, SelectionConfig, SelectionModel};
use crate::source::{BusyGuard, BusyIndicator, PhotoSource, WidthSource};

/// Configuration for a photo grid.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Gap between photos in pixels (default: 6)
    pub gap: f32,
    /// Quiet period after the last resize before repacking (default: 50ms)
    pub quiescence: Duration,
    pub selection: SelectionConfig,
    pub invalid_geometry: InvalidGeometryPolicy,
    /// Ids selected before the first load, e.g. restored preferences.
    pub initial_selection: Vec<PhotoId>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            quiescence: DEFAULT_QUIESCENCE,
            selection: SelectionConfig::default(),
            invalid_geometry: InvalidGeometryPolicy::default(),
            initial_selection: Vec::new(),
        }
    }
}

/// Output of the grid to its host.
#[derive(Debug)]
pub enum GridEvent {
    /// A layout pass finished.
    Layout {
        rows: Arc<Vec<Row>>,
        skipped: Vec<PhotoId>,
        container_width: f32,
    },
    /// A selection was completed.
    Done(Completion),
    /// Listing photos failed; the source's error is passed through as-is.
    Failed(FetchError),
}

/// What happened to one `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { photos: usize },
    /// A newer load started before this one finished; its result was dropped.
    Stale,
    Failed,
}

struct GridState {
    photos: Vec<PhotoRecord>,
    selection: SelectionModel,
    container_width: Option<f32>,
    rows: Arc<Vec<Row>>,
}

/// State and packer shared between the host-facing handle and the reflow task.
struct Pipeline {
    packer: RowPacker,
    state: Mutex<GridState>,
    events: Sender<GridEvent>,
}

impl Pipeline {
    fn emit(&self, event: GridEvent) {
        if self.events.send(event).is_err() {
            trace!("Grid event receiver dropped");
        }
    }

    /// Orders and packs the current photos for `width` and publishes the rows.
    ///
    /// A failed pass clears the rows so they never describe a previous photo
    /// list, and publishes an empty layout if rows were on display.
    fn relayout(&self, width: f32) {
        let event = {
            let mut state = self.state.lock();

            let ordered = order(&state.photos, &state.selection.selected_ids());
            match self.packer.pack_with_report(&ordered, width) {
                Ok(outcome) => {
                    state.container_width = Some(width);
                    state
                        .selection
                        .sync_display_order(ordered.iter().map(|photo| photo.id));
                    state.rows = Arc::new(outcome.rows);

                    GridEvent::Layout {
                        rows: Arc::clone(&state.rows),
                        skipped: outcome.skipped,
                        container_width: width,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Skipping layout pass");
                    state.container_width = None;
                    state.selection.sync_display_order(std::iter::empty());
                    if state.rows.is_empty() {
                        return;
                    }

                    state.rows = Arc::new(Vec::new());
                    GridEvent::Layout {
                        rows: Arc::clone(&state.rows),
                        skipped: Vec::new(),
                        container_width: width,
                    }
                }
            }
        };

        self.emit(event);
    }

    /// Repacks at the last known width, if there is one.
    fn relayout_current(&self) {
        let width = self.state.lock().container_width;
        match width {
            Some(width) => self.relayout(width),
            None => trace!("No container width yet, layout deferred"),
        }
    }
}

pub struct PhotoGrid<S, W, B> {
    source: S,
    width: W,
    busy: B,
    pipeline: Arc<Pipeline>,
    reflow: ReflowController,
    generation: AtomicU64,
}

impl<S, W, B> PhotoGrid<S, W, B>
where
    S: PhotoSource,
    W: WidthSource,
    B: BusyIndicator,
{
    /// Creates the grid and the receiver for its events.
    ///
    /// Must be called inside a tokio runtime, which runs the resize debounce.
    pub fn new(config: GridConfig, source: S, width: W, busy: B) -> (Self, Receiver<GridEvent>) {
        let (events_tx, events_rx) = flume::unbounded();

        let selection =
            SelectionModel::new(config.selection.clone()).with_initial(config.initial_selection);
        let pipeline = Arc::new(Pipeline {
            packer: RowPacker::new(config.gap).with_policy(config.invalid_geometry),
            state: Mutex::new(GridState {
                photos: Vec::new(),
                selection,
                container_width: None,
                rows: Arc::new(Vec::new()),
            }),
            events: events_tx,
        });

        let reflow_pipeline = Arc::clone(&pipeline);
        let reflow = ReflowController::spawn(config.quiescence, move |width| {
            reflow_pipeline.relayout(width);
        });

        let grid = Self {
            source,
            width,
            busy,
            pipeline,
            reflow,
            generation: AtomicU64::new(0),
        };
        (grid, events_rx)
    }

    /// Fetches the photo list and lays it out at the current container width.
    ///
    /// The busy indicator is raised for the duration of the fetch. If another
    /// load starts before this one completes, this result is discarded.
    pub async fn load(&self) -> LoadOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(token, "Loading photos");

        let result = {
            let _busy = BusyGuard::raise(&self.busy);
            self.source.list_photos().await
        };

        match result {
            Ok(photos) => {
                let count = photos.len();
                {
                    let mut state = self.pipeline.state.lock();
                    // Checked under the lock so a newer list is never overwritten.
                    if self.is_stale(token) {
                        return LoadOutcome::Stale;
                    }
                    state.photos = photos;
                }
                info!(count, "Loaded photos");

                let width = self.width.current_width();
                self.reflow.mark_settled(width);
                self.pipeline.relayout(width);
                LoadOutcome::Applied { photos: count }
            }
            Err(e) => {
                if self.is_stale(token) {
                    return LoadOutcome::Stale;
                }
                warn!(error = %e, "Failed to list photos");
                self.pipeline.emit(GridEvent::Failed(e));
                LoadOutcome::Failed
            }
        }
    }

    /// Reports a resize; the repack happens once resizing settles.
    pub fn on_resize(&self) {
        self.reflow.observe(self.width.current_width());
    }

    /// Selects a photo and repacks so selected photos lead the grid.
    pub fn select_one(&self, id: PhotoId) -> Option<Completion> {
        let (enabled, completion) = {
            let mut state = self.pipeline.state.lock();
            let enabled = state.selection.config().allow_selection;
            (enabled, state.selection.select_one(id))
        };
        self.after_selection_change(enabled, completion)
    }

    /// Deselects a photo and repacks.
    pub fn deselect_one(&self, id: PhotoId) -> Option<Completion> {
        let (enabled, completion) = {
            let mut state = self.pipeline.state.lock();
            let enabled = state.selection.config().allow_selection;
            (enabled, state.selection.deselect_one(id))
        };
        self.after_selection_change(enabled, completion)
    }

    /// Completes the selection explicitly, gathering it across all rows.
    pub fn confirm(&self) -> Completion {
        let completion = self.pipeline.state.lock().selection.confirm();
        self.pipeline.emit(GridEvent::Done(completion.clone()));
        completion
    }

    /// Selected ids in display order, for the caller to persist.
    pub fn selected_ids(&self) -> Vec<PhotoId> {
        self.pipeline.state.lock().selection.selected_in_order()
    }

    /// Rows of the latest layout pass.
    pub fn rows(&self) -> Arc<Vec<Row>> {
        Arc::clone(&self.pipeline.state.lock().rows)
    }

    /// Width of the latest successful layout pass.
    pub fn container_width(&self) -> Option<f32> {
        self.pipeline.state.lock().container_width
    }

    pub fn busy(&self) -> &B {
        &self.busy
    }

    /// Stops the resize debounce task.
    pub fn shutdown(&mut self) {
        self.reflow.shutdown();
    }

    fn is_stale(&self, token: u64) -> bool {
        let stale = self.generation.load(Ordering::SeqCst) != token;
        if stale {
            debug!(token, "Discarding stale photo list");
        }
        stale
    }

    fn after_selection_change(
        &self,
        enabled: bool,
        completion: Option<Completion>,
    ) -> Option<Completion> {
        if !enabled {
            return None;
        }

        self.pipeline.relayout_current();
        if let Some(completion) = &completion {
            self.pipeline.emit(GridEvent::Done(completion.clone()));
        }
        completion
    }
}
