use anyhow::{anyhow, Context};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_OUTPUT_DIR: &str = "p3r_output";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration of a compilation run, read from a yaml file.
/// Every field can be overridden from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub problem: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl CompilerConfig {
    pub fn read(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Values set in `other` replace the ones of `self`.
    pub fn override_with(self, other: CompilerConfig) -> Self {
        Self {
            problem: other.problem.or(self.problem),
            output_dir: other.output_dir.or(self.output_dir),
            jobs: other.jobs.or(self.jobs),
            log_level: other.log_level.or(self.log_level),
            log_dir: other.log_dir.or(self.log_dir),
        }
    }

    pub fn problem(&self) -> anyhow::Result<&Path> {
        self.problem
            .as_deref()
            .ok_or_else(|| anyhow!("no problem description given, use --problem or the config file"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Number of actions compiled at the same time, at least one.
    pub fn jobs(&self) -> usize {
        match self.jobs {
            Some(jobs) => jobs.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        let level = self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        LevelFilter::from_str(level).map_err(|_| anyhow!("unknown log level '{}'", level))
    }
}
