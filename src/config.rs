use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;

/// Tuning options read from an optional JSON file. Every field has a default.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub log_level: String,
    /// Rows written between forced flushes of the output; 0 disables forced flushes.
    pub flush_every: u64,
    /// Only accept way members with role `outer` as the representative of a relation.
    pub require_outer_role: bool,
    pub cache_relation_index: bool,
    pub progress_bar: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            log_level: "info".to_string(),
            flush_every: 1000,
            require_outer_role: false,
            cache_relation_index: false,
            progress_bar: true,
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Everything in one bin, written to stdout, no area filter.
    Single,
    Binned { bin_count: u32 },
    BinnedWithArea { bin_count: u32, min_area: f64 },
}

impl Mode {
    pub fn bin_count(&self) -> u32 {
        match self {
            Mode::Single => 1,
            Mode::Binned { bin_count } | Mode::BinnedWithArea { bin_count, .. } => *bin_count,
        }
    }

    pub fn min_area(&self) -> Option<f64> {
        match self {
            Mode::BinnedWithArea { min_area, .. } => Some(*min_area),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub source: PathBuf,
    pub mode: Mode,
    pub output_dir: PathBuf,
}

fn parse_bin_count(value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(format!("bin_count must be a positive integer, got {:?}", value).into()),
    }
}

fn parse_min_area(value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(area) if area.is_finite() && area >= 0.0 => Ok(area),
        _ => Err(format!("min_area must be a non-negative number, got {:?}", value).into()),
    }
}

impl Invocation {
    /// `rest` is everything after the source: `[<bin_count> [<min_area>]] <output_dir>`.
    pub fn from_args(source: PathBuf, rest: &[String]) -> Result<Invocation> {
        let (mode, output_dir) = match rest {
            [output_dir] => (Mode::Single, output_dir),
            [bin_count, output_dir] => (
                Mode::Binned { bin_count: parse_bin_count(bin_count)? },
                output_dir,
            ),
            [bin_count, min_area, output_dir] => (
                Mode::BinnedWithArea {
                    bin_count: parse_bin_count(bin_count)?,
                    min_area: parse_min_area(min_area)?,
                },
                output_dir,
            ),
            _ => return Err(format!("expected 2 to 4 arguments, got {}", rest.len() + 1).into()),
        };

        Ok(Invocation {
            source,
            mode,
            output_dir: PathBuf::from(output_dir),
        })
    }
}
