//! Run configuration
//!
//! Startup inputs that used to come from globals and the process
//! environment, gathered into one structure handed to the launcher and the
//! aggregator.

use std::path::{Path, PathBuf};

use super::aggregator::DEFAULT_STEP_BUDGET;
use super::error::{Result, SimError};

/// Environment variable naming the simulator installation root
pub const SUMO_HOME_VAR: &str = "SUMO_HOME";

/// Scenario used when none is given
pub const DEFAULT_CONFIG_FILE: &str = "real_map.sumocfg";

/// Simulator installation root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumoHome(PathBuf);

impl SumoHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    /// Read the installation root from `SUMO_HOME`
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(SUMO_HOME_VAR) {
            Some(root) if !root.is_empty() => Ok(Self(PathBuf::from(root))),
            _ => Err(SimError::configuration_missing(format!(
                "please declare environment variable '{}'",
                SUMO_HOME_VAR
            ))),
        }
    }

    pub fn root(&self) -> &Path {
        &self.0
    }

    /// Path of the simulator executable, `sumo` or `sumo-gui`
    pub fn binary(&self, gui: bool) -> PathBuf {
        let name = if gui { "sumo-gui" } else { "sumo" };
        self.0.join("bin").join(name)
    }
}

/// A boolean simulator option, passed as `--name true|false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOption {
    pub name: String,
    pub value: bool,
}

impl LaunchOption {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parse `name=true` or `name=false`; a leading `--` is tolerated
    pub fn parse(spec: &str) -> std::result::Result<Self, String> {
        let (name, value) = spec
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=BOOL, got '{}'", spec))?;
        let name = name.trim().trim_start_matches("--");
        if name.is_empty() {
            return Err(format!("empty option name in '{}'", spec));
        }
        let value = value
            .trim()
            .parse::<bool>()
            .map_err(|_| format!("option '{}' needs true or false, got '{}'", name, value))?;
        Ok(Self::new(name, value))
    }

    pub fn to_args(&self) -> [String; 2] {
        [format!("--{}", self.name), self.value.to_string()]
    }
}

/// Everything needed to launch and drive one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub sumo_home: SumoHome,
    pub config_path: PathBuf,
    pub launch_options: Vec<LaunchOption>,
    pub step_budget: u32,
    pub gui: bool,
}

impl RunConfig {
    /// Defaults: headless, 1000 steps, step and duration logs disabled
    pub fn new(sumo_home: SumoHome, config_path: impl Into<PathBuf>) -> Self {
        Self {
            sumo_home,
            config_path: config_path.into(),
            launch_options: default_launch_options(),
            step_budget: DEFAULT_STEP_BUDGET,
            gui: false,
        }
    }

    /// Set an option, replacing an earlier one with the same name
    pub fn set_option(&mut self, option: LaunchOption) {
        match self
            .launch_options
            .iter_mut()
            .find(|existing| existing.name == option.name)
        {
            Some(existing) => existing.value = option.value,
            None => self.launch_options.push(option),
        }
    }

    /// Fail with `ConfigurationMissing` if the scenario file does not exist
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.is_file() {
            return Err(SimError::configuration_missing(format!(
                "config file '{}' not found",
                self.config_path.display()
            )));
        }
        Ok(())
    }

    /// Simulator arguments, excluding the binary and the remote port
    pub fn simulator_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            self.config_path.display().to_string(),
        ];
        let mut options = self.launch_options.clone();
        if self.gui {
            for name in ["start", "quit-on-end"] {
                if !options.iter().any(|o| o.name == name) {
                    options.push(LaunchOption::new(name, true));
                }
            }
        }
        for option in &options {
            args.extend(option.to_args());
        }
        args
    }
}

pub fn default_launch_options() -> Vec<LaunchOption> {
    vec![
        LaunchOption::new("no-step-log", true),
        LaunchOption::new("duration-log.disable", true),
    ]
}
