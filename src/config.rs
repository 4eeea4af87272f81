use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    cdn_remote::DEFAULT_TIMEOUT_SECS, catalog::NESDIS_CDN_ROOT, error::GoesCdnError,
    satellite::Satellite, sequence::TimeRange,
};
use chrono::{naive::NaiveDateTime, DateTime, NaiveDate};
use serde::Deserialize;

/// Settings for a single download run, read once from a TOML document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(alias = "product")]
    products: OneOrMany,
    start_date: String,
    end_date: String,
    satellite: Satellite,
    save_dir: PathBuf,
    #[serde(default)]
    proxy: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_workers")]
    workers: usize,
    #[serde(default = "default_cdn_root")]
    cdn_root: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_workers() -> usize {
    1
}

fn default_cdn_root() -> String {
    NESDIS_CDN_ROOT.to_owned()
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, GoesCdnError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)
            .map_err(|err| GoesCdnError::config(format!("{}: {}", path.display(), err)))?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, GoesCdnError> {
        let config: Self =
            toml::from_str(content).map_err(|err| GoesCdnError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GoesCdnError> {
        if self.products().is_empty() {
            return Err(GoesCdnError::NoProducts);
        }
        if self.workers == 0 {
            return Err(GoesCdnError::config("workers must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(GoesCdnError::config("timeout_secs must be at least 1"));
        }
        self.time_range()?;
        Ok(())
    }

    pub fn products(&self) -> &[String] {
        match &self.products {
            OneOrMany::One(prod) => std::slice::from_ref(prod),
            OneOrMany::Many(prods) => prods,
        }
    }

    pub fn time_range(&self) -> Result<TimeRange, GoesCdnError> {
        let start = parse_date_time(&self.start_date)?;
        let end = parse_date_time(&self.end_date)?;
        TimeRange::new(start, end)
    }

    pub fn satellite(&self) -> Satellite {
        self.satellite
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cdn_root(&self) -> &str {
        &self.cdn_root
    }
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Accepts plain dates, date-times with or without seconds, and RFC 3339 (converted to UTC).
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, GoesCdnError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| GoesCdnError::config(format!("unrecognized date: '{}'", value)))
}
