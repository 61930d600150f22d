use anyhow::{Context, Result};
use clap::Parser;
use encoding_rs::Encoding;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use iptc_info::iim::{Kind, Value, registry};
use iptc_info::pipeline::{self, EditSet};
use iptc_info::{IptcInfo, config, hex};

#[derive(Parser, Debug)]
#[command(
    name = "iptc-info",
    version,
    about = "Read and edit IPTC-IIM metadata (captions, keywords, credits) in JPEG files"
)]
struct Cli {
    /// JPEG files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Recover what can be read from damaged metadata instead of failing
    #[arg(short, long)]
    force: bool,

    /// Encoding of files without a charset declaration, e.g. --charset iso-8859-2
    #[arg(long, value_name = "LABEL", value_parser = parse_encoding)]
    charset: Option<&'static Encoding>,

    /// Replace an attribute, e.g. --set "headline=Storm warning"
    #[arg(long, value_name = "NAME=VALUE", value_parser = EditSet::parse_assignment)]
    set: Vec<(String, String)>,

    /// Append to a repeatable attribute, e.g. --add keywords=weather
    #[arg(long, value_name = "NAME=VALUE", value_parser = EditSet::parse_assignment)]
    add: Vec<(String, String)>,

    /// Remove an attribute
    #[arg(long, value_name = "NAME")]
    clear: Vec<String>,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Hex-dump the raw IPTC data and trace the parser
    #[arg(long)]
    hex: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.hex {
        "info,iptc_info=trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    // Handle --init
    if cli.init {
        init_logging(log_level, None)?;
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config, then let flags override it
    let mut config = config::Config::load(cli.config.as_deref())?;
    init_logging(log_level, config.output.log_file.as_deref())?;
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if cli.force {
        config.options.strict = false;
    }
    if cli.hex {
        config.options.trace_hex = true;
    }
    if cli.charset.is_some() {
        config.options.input_charset = cli.charset;
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No JPEG files found in the specified paths.");
    }

    let edits = EditSet {
        set: cli.set,
        add: cli.add,
        clear: cli.clear,
    };
    if edits.is_empty() {
        return list_images(&images, &config, cli.json, cli.hex);
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        let result = pipeline::process_image(image_path, &edits, &config);
        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else if result.written {
            log::info!("  Wrote: {}", result.changed.join(", "));
            if let Some(ref backup) = result.backup_path {
                log::debug!("  Backup: {}", backup.display());
            }
        }
        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "had_metadata": r.had_metadata,
                    "changed": r.changed,
                    "written": r.written,
                    "backup_path": r.backup_path.as_ref().map(|p| p.display().to_string()),
                    "error": r.error,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

/// Send log output to stderr, or append it to `log_file` when one is set.
fn init_logging(level: &str, log_file: Option<&str>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp(None);
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {path}"))?;
        builder
            .format_timestamp_secs()
            .target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn parse_encoding(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| format!("unknown encoding {label:?}"))
}

/// Print the attributes of every image, as a table or as JSON.
fn list_images(images: &[PathBuf], config: &config::Config, json: bool, dump: bool) -> Result<()> {
    let mut listing = Vec::new();

    for path in images {
        let info = match IptcInfo::open_with(path, config.options) {
            Ok(info) => info,
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                if json {
                    listing.push(serde_json::json!({
                        "path": path.display().to_string(),
                        "error": e.to_string(),
                    }));
                }
                continue;
            }
        };

        if json {
            listing.push(serde_json::json!({
                "path": path.display().to_string(),
                "charset": info.model().charset().to_string(),
                "fields": pipeline::model_to_json(info.model()),
            }));
        } else {
            print_fields(path, &info);
        }
        if dump && !info.parts().iptc.is_empty() {
            eprintln!("{}", hex::hex_dump(&info.parts().iptc));
        }
    }

    if json {
        let out = serde_json::to_string_pretty(&listing).context("Failed to render JSON")?;
        println!("{out}");
    }
    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;

/// Indent for continuation lines (name column width + " : " + 2 leading spaces).
const INDENT: &str = "                                   ";

/// Print every attribute of one file.
fn print_fields(path: &Path, info: &IptcInfo) {
    let model = info.model();
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(80));

    if model.is_empty() {
        if info.has_metadata() {
            println!("  {DIM}(IPTC block present but empty){RESET}");
        } else {
            println!("  {DIM}(no IPTC metadata found){RESET}");
        }
        println!();
        return;
    }

    for (tag, value) in model.iter() {
        let name = registry::display_name(tag);
        let binary = registry::by_tag(tag).is_some_and(|e| e.kind == Kind::Binary);
        let items: Vec<String> = value
            .items()
            .map(|bytes| {
                if binary {
                    format!("<{} bytes>", bytes.len())
                } else {
                    model.charset().decode(bytes).into_owned()
                }
            })
            .collect();
        match value {
            Value::Scalar(_) => print_row(&name, items.first().map_or("", String::as_str)),
            Value::Sequence(_) => print_row(&name, &items.join("; ")),
        }
    }
    println!();
}

/// Print a single row in the attribute table.
fn print_row(name: &str, val: &str) {
    let name_col = format!("{:<30}", name);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {name_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
