use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::Currency;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Slot(usize),
}

/// A query value pattern with two placeholders, e.g. `{}{}` or `{0}-{1}`.
///
/// The placeholders are filled with a pair's currency codes in request order.
/// Literal braces are written as `{{` and `}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    raw: String,
    parts: Vec<TemplatePart>,
}

impl QueryTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut sequential = 0usize;
        let mut positional = false;
        let mut seen = [0usize; 2];

        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut index = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) => index.push(d),
                            None => bail!("Unclosed placeholder in template '{raw}'"),
                        }
                    }
                    let slot = if index.is_empty() {
                        if positional {
                            bail!("Template '{raw}' mixes '{{}}' and numbered placeholders");
                        }
                        sequential += 1;
                        sequential - 1
                    } else {
                        if sequential > 0 {
                            bail!("Template '{raw}' mixes '{{}}' and numbered placeholders");
                        }
                        positional = true;
                        match index.parse::<usize>() {
                            Ok(i @ (0 | 1)) => i,
                            _ => bail!("Invalid placeholder '{{{index}}}' in template '{raw}'"),
                        }
                    };
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    if slot > 1 {
                        bail!("Template '{raw}' must contain exactly two placeholders");
                    }
                    parts.push(TemplatePart::Slot(slot));
                    seen[slot] += 1;
                }
                '}' => bail!("Unmatched '}}' in template '{raw}'"),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        let slots = seen[0] + seen[1];
        if slots != 2 {
            bail!("Template '{raw}' must contain exactly two placeholders, found {slots}");
        }
        if seen != [1, 1] {
            bail!("Template '{raw}' must use each of '{{0}}' and '{{1}}' exactly once");
        }

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn render(&self, first: &str, second: &str) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(s) => out.push_str(s),
                TemplatePart::Slot(0) => out.push_str(first),
                TemplatePart::Slot(_) => out.push_str(second),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// How an exchange endpoint may be written in the config file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExchangeRecord {
    Explicit {
        url: String,
        param: String,
        template: String,
    },
    /// `{ <url>: { <param>: <template> } }`
    Mapping(BTreeMap<String, BTreeMap<String, String>>),
}

/// One exchange's rate endpoint and how to ask it for a pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ExchangeRecord")]
pub struct ExchangeSource {
    pub url: Url,
    pub param: String,
    pub template: QueryTemplate,
}

impl ExchangeSource {
    pub fn new(url: &str, param: &str, template: &str) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid exchange URL: {url}"))?;
        if parsed.host_str().is_none() {
            bail!("Exchange URL has no host: {url}");
        }
        if param.trim().is_empty() {
            bail!("Exchange {url} has an empty query parameter name");
        }
        let template = QueryTemplate::parse(template)
            .with_context(|| format!("Invalid query template for exchange {url}"))?;
        Ok(Self {
            url: parsed,
            param: param.to_string(),
            template,
        })
    }

    /// The endpoint's host, with the port when one is given.
    pub fn source_id(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

impl TryFrom<ExchangeRecord> for ExchangeSource {
    type Error = anyhow::Error;

    fn try_from(record: ExchangeRecord) -> Result<Self> {
        match record {
            ExchangeRecord::Explicit {
                url,
                param,
                template,
            } => ExchangeSource::new(&url, &param, &template),
            ExchangeRecord::Mapping(map) => {
                let mut endpoints = map.into_iter();
                let (url, params) = match (endpoints.next(), endpoints.next()) {
                    (Some(entry), None) => entry,
                    _ => bail!("Exchange entry must map exactly one URL to its query parameter"),
                };
                let mut params = params.into_iter();
                let (param, template) = match (params.next(), params.next()) {
                    (Some(entry), None) => entry,
                    _ => bail!("Exchange {url} must define exactly one query parameter"),
                };
                ExchangeSource::new(&url, &param, &template)
            }
        }
    }
}

/// Reads a standalone JSON or YAML list of exchange entries.
pub fn load_exchanges_file<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<ExchangeSource>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read exchanges file: {}", path.as_ref().display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse exchanges file: {}", path.as_ref().display()))
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub exchanges: Vec<ExchangeSource>,
    /// Extra entries appended to `exchanges`; relative to the config file.
    #[serde(default)]
    pub exchanges_file: Option<String>,
    /// Added to the default currency set.
    #[serde(default)]
    pub currencies: Vec<Currency>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "xrate", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(file) = &config.exchanges_file {
            let base = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let extra = load_exchanges_file(base.join(file))?;
            debug!(count = extra.len(), file = %file, "Loaded exchanges file");
            config.exchanges.extend(extra);
        }

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(exchanges = config.exchanges.len(), "Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.exchanges.is_empty() {
            return Err(anyhow!("No exchanges configured"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
