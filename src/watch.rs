use crate::build::{BuildError, build, content_input};
use crate::config::{Canonical, ConfigError, default_json, load_canonical};
use crate::emit::{OutputError, manifest_path, write_artifacts, write_text};
use crate::scanner::{ScanError, ScanOptions, content_files};
use crate::serialize::{SerializeError, to_deterministic_string};
use notify::{RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::{Duration, UNIX_EPOCH};
use thiserror::Error;
use tracing::{error, info, warn};

pub const CACHE_FILE_NAME: &str = ".lattice.cache.json";
pub const CACHE_VERSION: u32 = 1;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("failed to serialize cache: {0}")]
    Cache(#[from] SerializeError),
    #[error("watcher failed: {0}")]
    Notify(#[from] notify::Error),
    #[error("failed to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("build.content is required")]
    MissingContent,
    #[error("interval must be greater than zero")]
    InvalidInterval,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub site: Option<PathBuf>,
    pub out: PathBuf,
    pub base_path: PathBuf,
    pub poll: bool,
    pub interval: Duration,
    pub once: bool,
}

impl WatchOptions {
    pub fn new(out: PathBuf) -> Self {
        Self {
            site: None,
            out,
            base_path: PathBuf::from("."),
            poll: false,
            interval: DEFAULT_INTERVAL,
            once: false,
        }
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            base_path: self.base_path.clone(),
            ..ScanOptions::default()
        }
    }
}

/// Hash of the inputs seen by the last completed check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    last_hash: Option<String>,
}

impl WatchState {
    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Unchanged,
    Cached,
    Rebuilt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    #[serde(rename = "inputHash")]
    pub input_hash: String,
}

/// SHA-256 over the config sources and the path, size and mtime of every
/// content file, hex encoded.
pub fn input_fingerprint(site: Option<&Path>, files: &[PathBuf]) -> Result<String, WatchError> {
    let mut hasher = Sha256::new();
    hasher.update(b"config:embedded:default\n");
    hasher.update(default_json().as_bytes());
    hasher.update(b"\n");

    if let Some(site) = site {
        let contents = fs::read(site).map_err(|source| WatchError::Stat {
            path: site.to_path_buf(),
            source,
        })?;
        hasher.update(format!("config:{}\n", site.display()).as_bytes());
        hasher.update(&contents);
        hasher.update(b"\n");
    }

    let mut files = files.to_vec();
    files.sort();
    for path in &files {
        let metadata = fs::metadata(path).map_err(|source| WatchError::Stat {
            path: path.clone(),
            source,
        })?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_nanos());
        hasher.update(
            format!(
                "file:{}\nsize:{}\nmtime:{}\n",
                path.display(),
                metadata.len(),
                mtime
            )
            .as_bytes(),
        );
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn cache_path(out: &Path) -> PathBuf {
    match out.parent() {
        Some(parent) => parent.join(CACHE_FILE_NAME),
        None => PathBuf::from(CACHE_FILE_NAME),
    }
}

/// Missing or unreadable cache files count as no cache.
pub fn load_cache(out: &Path) -> Option<CacheRecord> {
    let text = fs::read_to_string(cache_path(out)).ok()?;
    serde_json::from_str(&text).ok()
}

pub fn write_cache(out: &Path, input_hash: &str) -> Result<(), WatchError> {
    let record = CacheRecord {
        version: CACHE_VERSION,
        input_hash: input_hash.to_string(),
    };
    write_text(&cache_path(out), &to_deterministic_string(&record)?)?;
    Ok(())
}

pub fn cache_valid(out: &Path, input_hash: &str, manifest: bool) -> bool {
    let Some(record) = load_cache(out) else {
        return false;
    };
    record.version == CACHE_VERSION
        && record.input_hash == input_hash
        && out.exists()
        && (!manifest || manifest_path(out).exists())
}

/// One check: rebuild when the inputs changed since the last check. On the
/// first check a valid on-disk cache stands in for a rebuild.
pub fn watch_once(options: &WatchOptions, state: &mut WatchState) -> Result<WatchOutcome, WatchError> {
    let canonical = load_canonical(None, options.site.as_deref())?;
    let config = canonical.config();
    if config.build.content.is_empty() {
        return Err(WatchError::MissingContent);
    }

    let scan_options = options.scan_options();
    let files = content_files(&config.build.content, &scan_options)?;
    let hash = input_fingerprint(options.site.as_deref(), &files)?;

    if state.last_hash.as_deref() == Some(hash.as_str()) {
        return Ok(WatchOutcome::Unchanged);
    }
    if state.last_hash.is_none() && cache_valid(&options.out, &hash, config.build.emit.manifest) {
        info!(path = %options.out.display(), "outputs up to date");
        state.last_hash = Some(hash);
        return Ok(WatchOutcome::Cached);
    }

    rebuild(&canonical, options, &scan_options)?;
    write_cache(&options.out, &hash)?;
    state.last_hash = Some(hash);
    Ok(WatchOutcome::Rebuilt)
}

fn rebuild(canonical: &Canonical, options: &WatchOptions, scan_options: &ScanOptions) -> Result<(), WatchError> {
    let input = content_input(canonical.config(), scan_options)?;
    let output = build(canonical, &input)?;
    for warning in &output.warnings {
        warn!("{}", warning);
    }
    write_artifacts(&output.css, output.manifest.as_deref(), &options.out)?;
    info!(
        files = input.files,
        classes = output.matched.len(),
        "rebuilt stylesheet"
    );
    Ok(())
}

/// Runs an initial check and then rebuilds on file changes until the event
/// channel closes. With `once` only the initial check runs.
pub fn run(options: &WatchOptions) -> Result<(), WatchError> {
    if options.interval.is_zero() {
        return Err(WatchError::InvalidInterval);
    }

    let mut state = WatchState::default();
    if options.once {
        watch_once(options, &mut state)?;
        return Ok(());
    }
    if let Err(err) = watch_once(options, &mut state) {
        error!("build failed: {}", err);
    }

    let (tx, rx) = channel();
    let mut watcher: Box<dyn Watcher> = if options.poll {
        Box::new(notify::PollWatcher::new(
            tx,
            notify::Config::default().with_poll_interval(options.interval),
        )?)
    } else {
        Box::new(notify::recommended_watcher(tx)?)
    };
    for root in current_roots(options) {
        watcher.watch(&root, RecursiveMode::Recursive)?;
    }
    info!(poll = options.poll, "watching for changes");

    let outputs = own_outputs(&options.out);
    let mut pending = false;
    loop {
        match rx.recv_timeout(options.interval) {
            Ok(Ok(event)) => {
                if !is_own_output_event(&event, &outputs) {
                    pending = true;
                }
            }
            Ok(Err(err)) => warn!("watch error: {}", err),
            Err(RecvTimeoutError::Timeout) => {
                if !pending {
                    continue;
                }
                pending = false;
                match watch_once(options, &mut state) {
                    Ok(WatchOutcome::Rebuilt) => info!("change detected, rebuilt"),
                    Ok(_) => {}
                    Err(err) => error!("build failed: {}", err),
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

fn own_outputs(out: &Path) -> Vec<PathBuf> {
    [out.to_path_buf(), manifest_path(out), cache_path(out)]
        .iter()
        .map(|path| strip_cur_dir(path))
        .collect()
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn is_own_output_event(event: &notify::Event, outputs: &[PathBuf]) -> bool {
    !event.paths.is_empty()
        && event
            .paths
            .iter()
            .all(|path| outputs.iter().any(|output| path.ends_with(output)))
}

/// Roots for the current config. A config that fails to load leaves the
/// whole base path watched so fixing it triggers a rebuild.
fn current_roots(options: &WatchOptions) -> Vec<PathBuf> {
    match load_canonical(None, options.site.as_deref()) {
        Ok(canonical) => watch_roots(&canonical.config().build.content, options),
        Err(err) => {
            warn!(path = %options.base_path.display(), "watching base path, config failed to load: {}", err);
            watch_roots(&[], options)
        }
    }
}

/// Directories to watch recursively: the literal directory prefix of each
/// content pattern under the base path, plus the site file's directory.
/// Without content the base path itself is watched. Roots inside another
/// root are dropped.
pub fn watch_roots(content: &[String], options: &WatchOptions) -> Vec<PathBuf> {
    let base = options.base_path.as_path();
    let mut candidates = content
        .iter()
        .map(|pattern| pattern.trim())
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| join_relative(base, &literal_dir(pattern)))
        .collect::<BTreeSet<_>>();
    if candidates.is_empty() {
        candidates.insert(base.to_path_buf());
    }
    if let Some(site) = &options.site {
        let dir = site.parent().unwrap_or(Path::new(""));
        candidates.insert(if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir.to_path_buf()
        });
    }

    candidates
        .iter()
        .filter(|root| {
            !candidates
                .iter()
                .any(|other| other != *root && root.starts_with(other))
        })
        .cloned()
        .collect()
}

fn join_relative(base: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// Directory part of `pattern` before its first glob metacharacter, empty
/// when the pattern starts matching at the base.
fn literal_dir(pattern: &str) -> PathBuf {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let literal = match pattern.find(['*', '?', '[', '{']) {
        Some(first_meta) => &pattern[..first_meta],
        None if Path::new(pattern).extension().is_some() => pattern,
        None => return PathBuf::from(pattern),
    };
    match literal.rfind(['/', '\\']) {
        Some(0) => PathBuf::from("/"),
        Some(idx) => PathBuf::from(&literal[..idx]),
        None => PathBuf::new(),
    }
}
