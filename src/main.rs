use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use svgpad::{
    CoordinateMapper, Options, PanZoom, Point, Size, format_readout, minify_with_options,
    normalize, parse_precision, shortest, units_per_pixel,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "svgpad")]
#[command(about = "SVG minifier and viewBox normalizer for live previews", long_about = None)]
struct Cli {
    /// Log debug output to stderr (overridden by SVGPAD_LOG or RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Strip comments and whitespace, and round decimals
    Minify {
        /// Input file (use - for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Decimal places kept on decimals; negative or non-numeric disables rounding
        #[arg(short, long, default_value = "2", allow_hyphen_values = true)]
        precision: String,

        /// Print size comparison
        #[arg(short, long)]
        stats: bool,
    },

    /// Rewrite the root tag to the working viewBox
    Normalize {
        /// Input file (use - for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Print the parsed geometry instead of the rewritten markup
        #[arg(long)]
        geometry: bool,
    },

    /// Print the document units covered by one screen pixel
    Scale {
        /// Input file (use - for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Preview size in pixels, as WxH
        #[arg(long, value_parser = parse_size)]
        viewport: Size,

        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
    },

    /// Print the document coordinate under a screen point
    Locate {
        /// Input file (use - for stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Preview size in pixels, as WxH
        #[arg(long, value_parser = parse_size)]
        viewport: Size,

        #[arg(long, default_value_t = 1.0)]
        zoom: f64,

        /// Preview translation in pixels, as X,Y
        #[arg(long, value_parser = parse_point, default_value = "0,0", allow_hyphen_values = true)]
        translate: Point,

        /// Screen point, as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Point,

        /// Fractional digits; negative hides the readout
        #[arg(short, long, allow_hyphen_values = true)]
        digits: Option<String>,
    },
}

fn parse_size(value: &str) -> Result<Size, String> {
    Size::parse(value).ok_or_else(|| format!("expected WxH, got {value:?}"))
}

fn parse_point(value: &str) -> Result<Point, String> {
    Point::parse(value).ok_or_else(|| format!("expected X,Y, got {value:?}"))
}

fn init_logging(verbose: bool) {
    let filter = if let Ok(directives) = env::var("SVGPAD_LOG") {
        EnvFilter::new(directives)
    } else if let Ok(directives) = env::var("RUST_LOG") {
        EnvFilter::new(directives)
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read markup; input that is not UTF-8 counts as empty.
fn read_input(path: &Path) -> io::Result<String> {
    let mut bytes = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().read_to_end(&mut bytes)?;
    } else {
        bytes = fs::read(path)?;
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(%e, "input is not UTF-8, treating it as empty");
            Ok(String::new())
        }
    }
}

fn write_output(path: &Path, output: &str) -> io::Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(output.as_bytes())
    } else {
        fs::write(path, output)
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Minify {
            input,
            output,
            precision,
            stats,
        } => {
            let input = read_input(&input)?;
            let input_len = input.len();

            let options = Options {
                precision: parse_precision(&precision),
                ..Options::default()
            };
            let minified = minify_with_options(&input, &options)?;
            let output_len = minified.len();
            write_output(&output, &minified)?;

            // Print stats if requested
            if stats {
                let saved = input_len.saturating_sub(output_len);
                let percent = if input_len > 0 {
                    (saved as f64 / input_len as f64) * 100.0
                } else {
                    0.0
                };
                eprintln!(
                    "{} -> {} bytes ({:.1}% smaller)",
                    input_len, output_len, percent
                );
            }
        }

        Command::Normalize {
            input,
            output,
            geometry,
        } => {
            let input = read_input(&input)?;
            let attrs = normalize::parse(&input);

            let text = if geometry {
                let or_none = |v: Option<String>| v.unwrap_or_else(|| "none".into());
                format!(
                    "viewBox: {}\nworking: {}\npreserveAspectRatio: {}\n",
                    or_none(attrs.view_box.clone()),
                    or_none(attrs.working.map(|w| w.to_string())),
                    or_none(attrs.aspect_ratio().map(|a| a.to_string())),
                )
            } else {
                normalize::rewrite(&input, &attrs)
            };
            write_output(&output, &text)?;
        }

        Command::Scale {
            input,
            viewport,
            zoom,
        } => {
            let input = read_input(&input)?;
            let attrs = normalize::parse(&input);

            match attrs
                .working
                .and_then(|working| units_per_pixel(&working, viewport, zoom))
            {
                Some(upp) => println!("{}", shortest(upp)),
                None => {
                    println!("undefined");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Locate {
            input,
            viewport,
            zoom,
            translate,
            at,
            digits,
        } => {
            let input = read_input(&input)?;
            let attrs = normalize::parse(&input);
            let pan_zoom = PanZoom { zoom, translate };

            let mapper = attrs.working.and_then(|working| {
                let aspect = attrs.aspect_ratio().unwrap_or_default();
                CoordinateMapper::new(working, aspect, viewport, pan_zoom)
            });
            let Some(mapper) = mapper else {
                println!("undefined");
                return Ok(ExitCode::FAILURE);
            };

            let point = mapper.screen_to_document(at);
            match digits.as_deref().map(parse_precision) {
                None => println!("{}, {}", shortest(point.x), shortest(point.y)),
                Some(Some(digits)) => match format_readout(point, digits) {
                    Ok(text) => println!("{text}"),
                    Err(e) => warn!(%e, "hiding readout"),
                },
                // Negative digits hide the readout
                Some(None) => {}
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
