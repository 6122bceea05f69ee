mod cli;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use photogrid::store::PhotoStore;
use photogrid::{
    BusyIndicator, DirectorySource, GridConfig, GridEvent, LoadOutcome, PhotoGrid, PhotoId,
    PhotoSource, Row, ScanConfig, SelectionConfig,
};

use cli::CliArgs;

/// Logs fetch progress in place of a spinner.
struct LogBusy;

impl BusyIndicator for LogBusy {
    fn raise(&self) {
        info!("Listing photos...");
    }
    fn lower(&self) {
        debug!("Listing finished");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("photogrid=info".parse()?),
        )
        .init();

    let args = cli::parse_args()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let scan = ScanConfig {
        recursive: args.recursive,
        ..Default::default()
    };
    let directory = DirectorySource::with_config(&args.path, scan);

    let config = GridConfig {
        gap: args.gap,
        selection: SelectionConfig {
            allow_selection: true,
            multiple: true,
            confirm_immediately: false,
        },
        initial_selection: args.select.iter().copied().map(PhotoId).collect(),
        ..Default::default()
    };

    match &args.catalog {
        Some(catalog) => {
            let store = PhotoStore::open(catalog)?;
            let photos = directory
                .list_photos()
                .await
                .with_context(|| format!("Failed to scan {:?}", args.path))?;
            let count = store.upsert_photos(&photos)?;
            info!(count, "Synced scan into catalog");
            render(config, store, args.width).await
        }
        None => render(config, directory, args.width).await,
    }
}

async fn render<S: PhotoSource>(config: GridConfig, source: S, width: f32) -> Result<()> {
    let (mut grid, events) = PhotoGrid::new(config, source, move || width, LogBusy);

    let outcome = grid.load().await;
    grid.shutdown();

    for event in events.drain() {
        match event {
            GridEvent::Layout {
                rows,
                skipped,
                container_width,
            } => {
                print_rows(&rows, container_width);
                if !skipped.is_empty() {
                    warn!(count = skipped.len(), "Photos without usable dimensions were skipped");
                }
            }
            GridEvent::Done(completion) => debug!(?completion, "Selection completed"),
            GridEvent::Failed(e) => return Err(e).context("Failed to list photos"),
        }
    }

    if let LoadOutcome::Applied { photos } = outcome {
        let selected = grid.confirm().ids();
        println!("{} photos, {} selected", photos, selected.len());
    }
    Ok(())
}

fn print_rows(rows: &[Row], container_width: f32) {
    println!("container width {:.0}px, {} rows", container_width, rows.len());
    for row in rows {
        println!(
            "row {:>3}  height {:>6.1}  width {:>7.1}  photos {}",
            row.row_index,
            row.height_px,
            row.total_width(),
            row.items.len()
        );
        for placed in &row.items {
            let geometry = &placed.geometry;
            let mode = if geometry.is_stretched(placed.photo.width) {
                "stretch"
            } else {
                "crop"
            };
            println!(
                "    {:<20} {:>4}x{:<4} -> {:>6.1}x{:<6.1} {:<7} {}{}",
                placed.id().to_string(),
                placed.photo.width,
                placed.photo.height,
                geometry.viewport_width,
                geometry.viewport_height,
                mode,
                placed.photo.name.as_deref().unwrap_or("-"),
                if placed.photo.selected { " *" } else { "" },
            );
        }
    }
}
