use std::{
    error, fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use ibuf::{ImageBuffer8, rle};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Bytes never written by the sprite.
const BACKGROUND: u8 = 0xFF;

/// Paints an RLE sprite into an 8-bit buffer and dumps it as hex.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Options {
    /// RLE sprite stream
    sprite: PathBuf,

    /// Buffer size as WIDTHxHEIGHT
    #[arg(value_parser = dimensions, default_value = "64x64")]
    size: (usize, usize),

    /// Paint origin as X,Y (defaults to the buffer centre)
    #[arg(long, value_parser = point, allow_hyphen_values = true)]
    at: Option<(i32, i32)>,

    /// Clip rectangle as X,Y,W,H
    #[arg(long, value_parser = rect, allow_hyphen_values = true)]
    clip: Option<(i32, i32, i32, i32)>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Parses `N` comma separated integers.
fn numbers<const N: usize>(value: &str) -> Result<[i32; N], String> {
    let parsed = value
        .split(',')
        .map(|n| n.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad number in {value}: {e}"))?;
    parsed
        .try_into()
        .map_err(|_| format!("expected {N} comma separated numbers, got {value}"))
}

fn point(value: &str) -> Result<(i32, i32), String> {
    let [x, y] = numbers::<2>(value)?;
    Ok((x, y))
}

fn rect(value: &str) -> Result<(i32, i32, i32, i32), String> {
    let [x, y, w, h] = numbers::<4>(value)?;
    Ok((x, y, w, h))
}

fn dimensions(value: &str) -> Result<(usize, usize), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let parse = |n: &str| {
        n.parse::<usize>()
            .map_err(|e| format!("bad dimension in {value}: {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let name = path
        .file_name()
        .ok_or_else(|| format!("log file {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn main() {
    let options = Options::parse();
    let (width, height) = options.size;

    let _guard = match init_logging(options.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let data = match read_file(&options.sprite) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("cannot read {}: {e}", options.sprite.display());
            process::exit(2);
        }
    };
    tracing::info!(bytes = data.len(), "loaded {}", options.sprite.display());

    match rle::bounds(&data) {
        Ok(Some(b)) => tracing::info!(
            x0 = b.x0,
            y0 = b.y0,
            x1 = b.x1,
            y1 = b.y1,
            "sprite is {}x{}",
            b.width(),
            b.height()
        ),
        Ok(None) => tracing::info!("sprite has no pixels"),
        Err(e) => tracing::warn!("{e}"),
    }

    let mut buf = ImageBuffer8::new(width, height);
    buf.fill(BACKGROUND);
    if let Some((x, y, w, h)) = options.clip {
        buf.set_clip(x, y, w, h);
    }

    let (x, y) = options.at.unwrap_or_else(|| {
        let centre = |n: usize| i32::try_from(n / 2).unwrap_or(i32::MAX);
        (centre(width), centre(height))
    });

    let result = buf.paint_rle(x, y, &data);
    if let Err(e) = print_buffer(&buf, &mut io::stdout().lock()) {
        tracing::error!("cannot write buffer: {e}");
        process::exit(2);
    }

    match result {
        Ok(consumed) => tracing::info!(
            consumed,
            trailing = data.len() - consumed,
            "painted at ({x}, {y})"
        ),
        Err(e) => {
            tracing::error!("paint failed: {e}");
            process::exit(3);
        }
    }
}

fn print_buffer(buf: &ImageBuffer8, out: &mut impl Write) -> io::Result<()> {
    for row in buf.pixels().chunks(buf.line_width().max(1)).take(buf.height()) {
        for (i, &p) in row[..buf.width()].iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            if p == BACKGROUND {
                out.write_all(b"..")?;
            } else {
                write!(out, "{p:02x}")?;
            }
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn read_file(filepath: &Path) -> Result<Vec<u8>, Box<dyn error::Error>> {
    let mut f = fs::File::open(filepath)?;
    let mut buf = vec![];
    f.read_to_end(&mut buf)?;

    Ok(buf)
}
