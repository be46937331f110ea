pub mod build;
pub mod config;
pub mod emit;
pub mod enumerate;
pub mod generator;
pub mod scanner;
pub mod serialize;
pub mod utilities;
pub mod watch;

use crate::build::{BuildError, BuildInput, content_input};
use crate::config::{Canonical, ConfigError, load_canonical};
use crate::emit::{OutputError, tokens_css, write_artifacts, write_text};
use crate::scanner::{ScanError, ScanOptions, render_report, scan};
use crate::serialize::{SerializeError, to_deterministic_string};
use crate::watch::{DEFAULT_INTERVAL, WatchError, WatchOptions};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const SITE_FILE_NAME: &str = "lattice.json";
pub const DEFAULT_TOKENS_OUT: &str = "dist/tokens.css";
pub const DEFAULT_BUILD_OUT: &str = "dist/lattice.css";
pub const DEFAULT_SCAN_TOP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ConfigPrint {
        site: Option<String>,
    },
    Tokens {
        site: Option<String>,
        out: Option<String>,
        stdout: bool,
    },
    Build {
        site: Option<String>,
        out: Option<String>,
        stdout: bool,
        production: bool,
    },
    Watch {
        site: Option<String>,
        out: Option<String>,
        poll: bool,
        interval_ms: u64,
        once: bool,
    },
    Scan {
        site: Option<String>,
        top: usize,
        per_file: bool,
    },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub message: String,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

macro_rules! cli_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(err: $source) -> Self {
                    CliError::new(err.to_string())
                }
            }
        )*
    };
}

cli_error_from!(ConfigError, BuildError, ScanError, OutputError, SerializeError, WatchError);

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::ConfigPrint { site } => {
            print!("{}", render_config(site.as_deref())?);
            Ok(())
        }
        Command::Tokens { site, out, stdout } => run_tokens(site, out, stdout),
        Command::Build {
            site,
            out,
            stdout,
            production,
        } => run_build(site, out, stdout, production),
        Command::Watch {
            site,
            out,
            poll,
            interval_ms,
            once,
        } => {
            let options = WatchOptions {
                site: resolve_site_path(site.as_deref()),
                poll,
                interval: Duration::from_millis(interval_ms),
                once,
                ..WatchOptions::new(PathBuf::from(out.as_deref().unwrap_or(DEFAULT_BUILD_OUT)))
            };
            watch::run(&options)?;
            Ok(())
        }
        Command::Scan {
            site,
            top,
            per_file,
        } => run_scan(site, top, per_file),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            println!("lattice {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

pub fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command)
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let Some(cmd) = iter.next() else {
        return Ok(Command::Help);
    };

    match cmd.as_str() {
        "config" => parse_config_args(iter.collect()),
        "tokens" => parse_tokens_args(iter.collect()),
        "build" => parse_build_args(iter.collect()),
        "watch" => parse_watch_args(iter.collect()),
        "scan" => parse_scan_args(iter.collect()),
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-V" | "--version" | "version" => Ok(Command::Version),
        _ => Err(CliError::new(format!("unknown command: {}", cmd))),
    }
}

fn flag_value(args: &[String], idx: usize, command: &str, flag: &str) -> Result<String, CliError> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| CliError::new(format!("{} requires a value for {}", command, flag)))
}

fn unexpected(command: &str, arg: &str) -> CliError {
    CliError::new(format!("unexpected argument for {}: {}", command, arg))
}

fn parse_config_args(args: Vec<String>) -> Result<Command, CliError> {
    let Some((action, rest)) = args.split_first() else {
        return Err(CliError::new("config requires a subcommand: print"));
    };
    if action != "print" {
        return Err(CliError::new(format!("unknown config subcommand: {}", action)));
    }

    let mut site = None;
    let mut idx = 0;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--site" | "-s" => {
                idx += 1;
                site = Some(flag_value(rest, idx, "config print", "--site")?);
            }
            other => return Err(unexpected("config print", other)),
        }
        idx += 1;
    }

    Ok(Command::ConfigPrint { site })
}

fn parse_tokens_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut site = None;
    let mut out = None;
    let mut stdout = false;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--site" | "-s" => {
                idx += 1;
                site = Some(flag_value(&args, idx, "tokens", "--site")?);
            }
            "--out" | "--output" | "-o" => {
                idx += 1;
                out = Some(flag_value(&args, idx, "tokens", "--out")?);
            }
            "--stdout" => stdout = true,
            other => return Err(unexpected("tokens", other)),
        }
        idx += 1;
    }

    Ok(Command::Tokens { site, out, stdout })
}

fn parse_build_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut site = None;
    let mut out = None;
    let mut stdout = false;
    let mut production = false;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--site" | "-s" => {
                idx += 1;
                site = Some(flag_value(&args, idx, "build", "--site")?);
            }
            "--out" | "--output" | "-o" => {
                idx += 1;
                out = Some(flag_value(&args, idx, "build", "--out")?);
            }
            "--stdout" => stdout = true,
            "--production" => production = true,
            "--poll" | "--once" => {
                return Err(CliError::new(format!(
                    "{} is only supported with watch",
                    args[idx]
                )));
            }
            other => return Err(unexpected("build", other)),
        }
        idx += 1;
    }

    Ok(Command::Build {
        site,
        out,
        stdout,
        production,
    })
}

fn parse_watch_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut site = None;
    let mut out = None;
    let mut poll = false;
    let mut interval_ms = DEFAULT_INTERVAL.as_millis() as u64;
    let mut once = false;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--site" | "-s" => {
                idx += 1;
                site = Some(flag_value(&args, idx, "watch", "--site")?);
            }
            "--out" | "--output" | "-o" => {
                idx += 1;
                out = Some(flag_value(&args, idx, "watch", "--out")?);
            }
            "--poll" => poll = true,
            "--interval" | "--poll-interval" => {
                idx += 1;
                let value = flag_value(&args, idx, "watch", "--interval")?;
                interval_ms = parse_u64_arg(&value, "--interval")?;
                if interval_ms == 0 {
                    return Err(CliError::new("--interval must be greater than zero"));
                }
            }
            "--once" => once = true,
            other => return Err(unexpected("watch", other)),
        }
        idx += 1;
    }

    Ok(Command::Watch {
        site,
        out,
        poll,
        interval_ms,
        once,
    })
}

fn parse_scan_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut site = None;
    let mut top = DEFAULT_SCAN_TOP;
    let mut per_file = false;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--site" | "-s" => {
                idx += 1;
                site = Some(flag_value(&args, idx, "scan", "--site")?);
            }
            "--top" | "-n" => {
                idx += 1;
                let value = flag_value(&args, idx, "scan", "--top")?;
                top = parse_u64_arg(&value, "--top")? as usize;
            }
            "--per-file" => per_file = true,
            other => return Err(unexpected("scan", other)),
        }
        idx += 1;
    }

    Ok(Command::Scan {
        site,
        top,
        per_file,
    })
}

fn parse_u64_arg(value: &str, flag: &str) -> Result<u64, CliError> {
    value
        .parse::<u64>()
        .map_err(|_| CliError::new(format!("{} requires a non-negative integer, got '{}'", flag, value)))
}

/// An explicit site path wins; otherwise `lattice.json` in the working
/// directory is used when it exists.
pub fn resolve_site_path(site: Option<&str>) -> Option<PathBuf> {
    resolve_site_path_in(site, Path::new("."))
}

fn resolve_site_path_in(site: Option<&str>, dir: &Path) -> Option<PathBuf> {
    match site.map(str::trim).filter(|site| !site.is_empty()) {
        Some(site) => Some(PathBuf::from(site)),
        None => {
            let candidate = dir.join(SITE_FILE_NAME);
            candidate.is_file().then_some(candidate)
        }
    }
}

fn load_site(site: Option<&str>) -> Result<Canonical, CliError> {
    let site = resolve_site_path(site);
    Ok(load_canonical(None, site.as_deref())?)
}

/// The canonical configuration with its token model, as deterministic JSON.
pub fn render_config(site: Option<&str>) -> Result<String, CliError> {
    let canonical = load_site(site)?;
    Ok(to_deterministic_string(&canonical)?)
}

fn run_tokens(site: Option<String>, out: Option<String>, stdout: bool) -> Result<(), CliError> {
    let canonical = load_site(site.as_deref())?;
    let css = tokens_css(&canonical);
    if stdout {
        print!("{}", css);
        return Ok(());
    }

    let out = PathBuf::from(out.as_deref().unwrap_or(DEFAULT_TOKENS_OUT));
    write_text(&out, &css)?;
    info!(path = %out.display(), bytes = css.len(), "wrote tokens");
    Ok(())
}

fn run_build(
    site: Option<String>,
    out: Option<String>,
    stdout: bool,
    production: bool,
) -> Result<(), CliError> {
    let canonical = load_site(site.as_deref())?;
    let output = build_stylesheet(&canonical, production)?;
    for warning in build_warnings(&output, stdout) {
        warn!("{}", warning);
    }

    if stdout {
        print!("{}", output.css);
        return Ok(());
    }

    let out = PathBuf::from(out.as_deref().unwrap_or(DEFAULT_BUILD_OUT));
    write_artifacts(&output.css, output.manifest.as_deref(), &out)?;
    Ok(())
}

/// Build warnings plus a note when `--stdout` leaves an enabled manifest
/// unwritten.
fn build_warnings(output: &build::BuildOutput, stdout: bool) -> Vec<String> {
    let mut warnings = output.warnings.clone();
    if stdout && output.manifest.is_some() {
        warnings.push("manifest is not written when --stdout is set".to_string());
    }
    warnings
}

/// Production builds compile the classes found in `build.content`; other
/// builds compile every enumerable class.
fn build_stylesheet(canonical: &Canonical, production: bool) -> Result<build::BuildOutput, CliError> {
    let input = if production {
        if canonical.config().build.content.is_empty() {
            return Err(CliError::new("build.content is required for --production"));
        }
        content_input(canonical.config(), &ScanOptions::default())?
    } else {
        BuildInput::new(enumerate::all_classes(canonical))
    };
    Ok(build::build(canonical, &input)?)
}

fn run_scan(site: Option<String>, top: usize, per_file: bool) -> Result<(), CliError> {
    let canonical = load_site(site.as_deref())?;
    let config = canonical.config();
    if config.build.content.is_empty() {
        return Err(CliError::new("build.content is required for scan"));
    }

    let result = scan(&config.build.content, &config.build.safelist)?;
    print!("{}", render_report(&result, top, per_file));
    Ok(())
}

fn print_help() {
    println!("lattice - design tokens and utility classes compiled to CSS");
    println!();
    println!("USAGE:");
    println!("  lattice config print [--site <path>]");
    println!("  lattice tokens [--site <path>] [--out <path>] [--stdout]");
    println!("  lattice build [--site <path>] [--out <path>] [--stdout] [--production]");
    println!("  lattice watch [--site <path>] [--out <path>] [--poll] [--interval <ms>] [--once]");
    println!("  lattice scan [--site <path>] [--top <n>] [--per-file]");
    println!("  lattice --version");
    println!();
    println!("EXAMPLES:");
    println!("  lattice build --production --out public/lattice.css");
    println!("  lattice tokens --site site.toml --stdout");
    println!("  lattice watch --poll --interval 250");
    println!("  lattice scan --top 10 --per-file");
    println!();
    println!("Set LATTICE_LOG (e.g. debug) to control log output.");
}
