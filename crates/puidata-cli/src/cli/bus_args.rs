//! Positional argument forms of the bus commands.
//!
//! MTA keys have more than two `-`-separated parts; line names such as
//! `B52` or `M15-SBS` have at most two. That is how a two-argument
//! `bus-info` call tells `KEY LINE` apart from `LINE OUTPUT`.

use anyhow::{bail, Result};
use puidata_core::bus::normalize_line;
use std::path::PathBuf;

/// Parsed `[KEY] LINE [OUTPUT]`. A `None` key is looked up in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusArgs {
    pub api_key: Option<String>,
    pub line: String,
    pub output: PathBuf,
}

fn looks_like_line(arg: &str) -> bool {
    arg.split('-').count() <= 2
}

fn default_output(line: &str) -> PathBuf {
    PathBuf::from(format!("{}.csv", line))
}

/// `bus-locations`: `LINE` or `KEY LINE`.
pub fn locations(args: &[String]) -> Result<(Option<String>, String)> {
    match args {
        [line] => Ok((None, normalize_line(line))),
        [key, line] => Ok((Some(key.clone()), normalize_line(line))),
        _ => bail!("expected [KEY] LINE, e.g. `puidata bus-locations xxxx-xxxx-xxxx B52`"),
    }
}

/// `bus-info`: `LINE`, `KEY LINE`, `LINE OUTPUT` or `KEY LINE OUTPUT`.
pub fn info(args: &[String]) -> Result<BusArgs> {
    let (api_key, line, output) = match args {
        [line] => (None, normalize_line(line), None),
        [first, second] if looks_like_line(first) => {
            (None, normalize_line(first), Some(PathBuf::from(second)))
        }
        [key, line] => (Some(key.clone()), normalize_line(line), None),
        [key, line, output] => (Some(key.clone()), normalize_line(line), Some(PathBuf::from(output))),
        _ => bail!("expected [KEY] LINE [OUTPUT], e.g. `puidata bus-info xxxx-xxxx-xxxx B52 b52.csv`"),
    };
    let output = output.unwrap_or_else(|| default_output(&line));
    Ok(BusArgs {
        api_key,
        line,
        output,
    })
}
