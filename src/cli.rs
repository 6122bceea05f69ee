use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use photogrid::layout::DEFAULT_GAP;

const USAGE: &str = "usage: photogrid <dir> [--width PX] [--gap PX] [--no-recursive] [--catalog DB] [--select ID]...";

/// Command line options for the `photogrid` binary.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub path: PathBuf,
    pub width: f32,
    pub gap: f32,
    pub recursive: bool,
    /// Sync the scan into this SQLite catalog and lay out from it.
    pub catalog: Option<PathBuf>,
    pub select: Vec<u64>,
}

pub fn parse_args() -> Result<CliArgs> {
    parse_from(env::args().skip(1))
}

fn parse_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut path: Option<PathBuf> = None;
    let mut width: f32 = 1280.0;
    let mut gap: f32 = DEFAULT_GAP;
    let mut recursive = true;
    let mut catalog: Option<PathBuf> = None;
    let mut select = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--width" => {
                let value = args.next().context("Missing value for --width")?;
                width = value
                    .parse::<f32>()
                    .context("Failed to parse --width as a number")?;
            }
            "--gap" => {
                let value = args.next().context("Missing value for --gap")?;
                gap = value
                    .parse::<f32>()
                    .context("Failed to parse --gap as a number")?;
            }
            "--no-recursive" => recursive = false,
            "--catalog" => {
                let value = args.next().context("Missing value for --catalog")?;
                catalog = Some(PathBuf::from(value));
            }
            "--select" => {
                let value = args.next().context("Missing value for --select")?;
                select.push(
                    value
                        .parse::<u64>()
                        .context("Failed to parse --select as a photo id")?,
                );
            }
            "-h" | "--help" => bail!(USAGE),
            other if other.starts_with('-') => bail!("Unknown option {}\n{}", other, USAGE),
            other => {
                if path.is_some() {
                    bail!("Unexpected argument {}\n{}", other, USAGE);
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    let path = path.context(USAGE)?;
    if !width.is_finite() || width <= 0.0 {
        bail!("--width must be a positive number");
    }

    Ok(CliArgs {
        path,
        width,
        gap,
        recursive,
        catalog,
        select,
    })
}
