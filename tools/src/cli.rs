//! Minimal argument handling shared by the binaries.
//!
//! Positional arguments are everything that is not a `--flag` or the
//! value following a value-taking flag.

use anyhow::{anyhow, Result};
use std::str::FromStr;

const SWITCHES: &[&str] = &["--append", "--truncate"];

pub struct Args {
    raw: Vec<String>,
}

impl Args {
    pub fn from_env() -> Self {
        Self {
            raw: std::env::args().skip(1).collect(),
        }
    }

    /// True when a switch such as `--append` is present.
    #[allow(dead_code)]
    pub fn has(&self, switch: &str) -> bool {
        self.raw.iter().any(|a| a == switch)
    }

    /// Raw value following `flag`, if given.
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.raw
            .windows(2)
            .find(|w| w[0] == flag)
            .map(|w| w[1].as_str())
    }

    /// Value following `flag`, parsed. A value that does not parse is an error.
    pub fn parsed<T: FromStr>(&self, flag: &str) -> Result<Option<T>> {
        self.value(flag)
            .map(|v| v.parse().map_err(|_| anyhow!("Invalid value for {flag}: {v}")))
            .transpose()
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        let mut positionals = Vec::new();
        let mut iter = self.raw.iter();
        while let Some(arg) = iter.next() {
            if arg.starts_with("--") {
                if !SWITCHES.contains(&arg.as_str()) {
                    iter.next();
                }
                continue;
            }
            positionals.push(arg.as_str());
        }
        positionals.get(index).copied()
    }

    pub fn positional_parsed<T: FromStr>(&self, index: usize, name: &str) -> Result<Option<T>> {
        self.positional(index)
            .map(|v| v.parse().map_err(|_| anyhow!("Invalid {name}: {v}")))
            .transpose()
    }
}
