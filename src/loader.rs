use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain_set::DomainSet;
use crate::error::{DomainSetError, Result};
use crate::options::BuildOptions;
use crate::parser::parse_rules;
use crate::snapshot;
use crate::text::{Duplicate, Materializer, RuleText};

/// On-disk domain set format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSetFormat {
    /// Line-oriented rule text
    Text,
    /// Binary snapshot (see [`snapshot`](crate::snapshot))
    Snapshot,
}

impl DomainSetFormat {
    /// Detect format from file extension
    pub fn detect(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" | "list" => Some(DomainSetFormat::Text),
            "bin" | "snapshot" => Some(DomainSetFormat::Snapshot),
            _ => None,
        }
    }

    /// Get default filename for this format
    pub fn default_filename(&self) -> &'static str {
        match self {
            DomainSetFormat::Text => "domainset.txt",
            DomainSetFormat::Snapshot => "domainset.bin",
        }
    }
}

/// A named domain set file, as it appears in a host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainSetConfig {
    /// Set name, used in logs
    pub name: String,
    /// Path to the rule file
    pub path: PathBuf,
    /// Explicit format; detected from the extension if omitted
    #[serde(default)]
    pub format: Option<DomainSetFormat>,
    /// Build options
    #[serde(default)]
    pub options: BuildOptions,
}

impl DomainSetConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format: None,
            options: BuildOptions::default(),
        }
    }

    pub fn with_format(mut self, format: DomainSetFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve the file format, preferring the explicit setting
    pub fn format(&self) -> Result<DomainSetFormat> {
        resolve_format(&self.path, self.format)
    }

    /// Load the set with owned, individually allocated rules
    pub fn load(&self) -> Result<DomainSet<Box<str>>> {
        debug!(name = %self.name, path = %self.path.display(), "loading domain set");
        load_file(&self.path, self.format, &self.options, &mut Duplicate)
    }

    /// Async variant of [`load`](Self::load)
    #[cfg(feature = "async")]
    pub async fn load_async(&self) -> Result<DomainSet<Box<str>>> {
        debug!(name = %self.name, path = %self.path.display(), "loading domain set");
        load_file_async(&self.path, self.format, &self.options, &mut Duplicate).await
    }
}

/// Load a domain set from a file.
///
/// `format` overrides detection by extension. The materializer must
/// produce text that does not borrow from the file buffer, since the
/// buffer is dropped before returning.
pub fn load_file<M, S>(
    path: impl AsRef<Path>,
    format: Option<DomainSetFormat>,
    options: &BuildOptions,
    materializer: &mut M,
) -> Result<DomainSet<S>>
where
    M: for<'a> Materializer<'a, Text = S>,
    S: RuleText,
{
    let path = path.as_ref();
    let format = resolve_format(path, format)?;
    let start = Instant::now();
    let data = std::fs::read(path)?;
    let set = build_from_bytes(&data, format, options, materializer)?;
    log_loaded(path, format, data.len(), &set, start);
    Ok(set)
}

/// Async variant of [`load_file`], reading with `tokio::fs`.
#[cfg(feature = "async")]
pub async fn load_file_async<M, S>(
    path: impl AsRef<Path>,
    format: Option<DomainSetFormat>,
    options: &BuildOptions,
    materializer: &mut M,
) -> Result<DomainSet<S>>
where
    M: for<'a> Materializer<'a, Text = S>,
    S: RuleText,
{
    let path = path.as_ref();
    let format = resolve_format(path, format)?;
    let start = Instant::now();
    let data = tokio::fs::read(path).await?;
    let set = build_from_bytes(&data, format, options, materializer)?;
    log_loaded(path, format, data.len(), &set, start);
    Ok(set)
}

fn resolve_format(path: &Path, format: Option<DomainSetFormat>) -> Result<DomainSetFormat> {
    format
        .or_else(|| DomainSetFormat::detect(path))
        .ok_or_else(|| DomainSetError::UnknownFormat(path.display().to_string()))
}

fn build_from_bytes<M, S>(
    data: &[u8],
    format: DomainSetFormat,
    options: &BuildOptions,
    materializer: &mut M,
) -> Result<DomainSet<S>>
where
    M: for<'a> Materializer<'a, Text = S>,
    S: RuleText,
{
    match format {
        DomainSetFormat::Text => {
            let text = std::str::from_utf8(data)?;
            parse_rules(text, materializer, options)?.freeze()
        }
        DomainSetFormat::Snapshot => snapshot::deserialize(data, materializer, options),
    }
}

fn log_loaded<S: RuleText>(
    path: &Path,
    format: DomainSetFormat,
    bytes: usize,
    set: &DomainSet<S>,
    start: Instant,
) {
    let hint = set.capacity_hint();
    info!(
        path = %path.display(),
        format = ?format,
        bytes,
        domains = hint.domains,
        suffixes = hint.suffixes,
        keywords = hint.keywords,
        regexps = hint.regexps,
        elapsed_ms = start.elapsed().as_millis(),
        "domain set loaded"
    );
}
