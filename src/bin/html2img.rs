//! CLI binary for html2img.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionRequest` and prints or writes the result.

use anyhow::{Context, Result};
use clap::Parser;
use html2img::{convert, convert_to_file, decode, ConversionRequest, ImageFormat};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render an HTML file to PNG (base64 on stdout)
  html2img creative.html

  # Write the PNG itself
  html2img creative.html -o creative.png

  # JPEG at quarter size
  html2img creative.html --format jpeg --scale 0.25 -o preview.jpg

  # Read from stdin, full response as JSON
  cat creative.html | html2img - --json

  # Just show what the transport decoder makes of the input
  html2img creative.html --decode-only
"#;

/// Render email-style HTML fragments to raster images.
#[derive(Parser, Debug)]
#[command(
    name = "html2img",
    version,
    about = "Render email-style HTML fragments to raster images (PNG/JPEG)",
    long_about = "Render email-style HTML fragments to raster images. Input may be URL-encoded, \
Quoted-Printable, entity-escaped, or nested combinations thereof; encodings are detected and \
stripped automatically before rendering.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTML file to render, or '-' to read from stdin.
    input: String,

    /// Write the image bytes to this file instead of printing base64.
    #[arg(short, long, env = "HTML2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Output scale applied to the rasterized page.
    #[arg(long, env = "HTML2IMG_SCALE", default_value_t = html2img::DEFAULT_SCALE)]
    scale: f32,

    /// Output format: png or jpeg.
    #[arg(long, env = "HTML2IMG_FORMAT", default_value = "png")]
    format: ImageFormat,

    /// Print the full response (dimensions, stats) as JSON instead of bare base64.
    #[arg(long, env = "HTML2IMG_JSON")]
    json: bool,

    /// Print the decoded text and exit without rendering.
    #[arg(long)]
    decode_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HTML2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HTML2IMG_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Read input ───────────────────────────────────────────────────────
    let html = if cli.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read HTML from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.input)
            .with_context(|| format!("Failed to read HTML from '{}'", cli.input))?
    };

    // ── Decode-only mode ─────────────────────────────────────────────────
    if cli.decode_only {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(decode(&html).as_bytes())
            .context("Failed to write to stdout")?;
        stdout.write_all(b"\n").ok();
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let request = ConversionRequest::new(html)
        .with_scale(cli.scale)
        .with_format(cli.format);

    if let Some(ref output_path) = cli.output {
        let response = convert_to_file(&request, output_path).context("Conversion failed")?;
        if !cli.quiet {
            eprintln!(
                "{}x{} → {}x{} {}  {} bytes  →  {}",
                response.original_width,
                response.original_height,
                response.reduced_width,
                response.reduced_height,
                response.image_format,
                response.file_size_bytes,
                output_path.display(),
            );
        }
    } else {
        let response = convert(&request).context("Conversion failed")?;
        if cli.json {
            let json = serde_json::to_string_pretty(&response)
                .context("Failed to serialise response")?;
            println!("{json}");
        } else {
            println!("{}", response.base64_image);
            if !cli.quiet {
                eprintln!(
                    "{}x{} → {}x{} {}  {} bytes",
                    response.original_width,
                    response.original_height,
                    response.reduced_width,
                    response.reduced_height,
                    response.image_format,
                    response.file_size_bytes,
                );
            }
        }
    }

    Ok(())
}
