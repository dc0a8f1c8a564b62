//! Access to the external preference store.
//!
//! The store is the desktop's `gsettings` database. It is only reached by
//! spawning the `gsettings` program, once per read or write; nothing is
//! cached and nothing is retried.

use std::fmt;
use std::io;
use std::process::Command;

use log::{debug, warn};

use crate::value::PreferenceValue;

/// Schema and key of the managed preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceKey {
    pub schema: String,
    pub key: String,
}

impl PreferenceKey {
    pub const DEFAULT_SCHEMA: &'static str = "org.cinnamon.desktop.peripherals.mouse";
    pub const DEFAULT_KEY: &'static str = "speed";

    pub fn new(schema: impl Into<String>, key: impl Into<String>) -> Self {
        Self { schema: schema.into(), key: key.into() }
    }
}

impl Default for PreferenceKey {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCHEMA, Self::DEFAULT_KEY)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.schema, self.key)
    }
}

/// Why an invocation of the store program failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    /// The program is not installed or not on PATH.
    NotFound,
    /// The program ran and exited non-zero (`None` if killed by a signal).
    Exit { code: Option<i32>, stderr: String },
    /// Any other spawn error (permissions, resource limits).
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    CommandFailed(CommandFailure),
    /// The getter's output was not a number. Holds the trimmed output.
    ParseError(String),
}

impl StoreError {
    /// True when the store program could not be found at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::CommandFailed(CommandFailure::NotFound))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CommandFailed(CommandFailure::NotFound) => {
                write!(f, "store program not found")
            }
            StoreError::CommandFailed(CommandFailure::Exit { code: Some(code), stderr }) => {
                if stderr.is_empty() {
                    write!(f, "store program exited with status {}", code)
                } else {
                    write!(f, "store program exited with status {}: {}", code, stderr)
                }
            }
            StoreError::CommandFailed(CommandFailure::Exit { code: None, .. }) => {
                write!(f, "store program terminated by signal")
            }
            StoreError::CommandFailed(CommandFailure::Io(msg)) => {
                write!(f, "failed to run store program: {}", msg)
            }
            StoreError::ParseError(output) => {
                write!(f, "store returned a non-numeric value: {:?}", output)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::CommandFailed(CommandFailure::NotFound)
        } else {
            StoreError::CommandFailed(CommandFailure::Io(err.to_string()))
        }
    }
}

/// Read/write capability over the single managed preference.
pub trait SettingStore {
    /// Fetch the current value. Out-of-range values are returned as-is.
    fn read(&mut self) -> Result<PreferenceValue, StoreError>;

    /// Persist `value`. This changes desktop-wide state.
    fn write(&mut self, value: PreferenceValue) -> Result<(), StoreError>;

    /// Human-readable name of what this store manages, for display.
    fn describe(&self) -> String;
}

/// Parse getter output as a real number.
///
/// `gsettings get` prints GVariant text, so a double comes back as plain
/// decimal text such as `0.29999999999999999`.
pub fn parse_value(output: &str) -> Result<PreferenceValue, StoreError> {
    let text = output.trim();
    // Narrow first: a double beyond f32::MAX would otherwise load as infinity
    match text.parse::<f64>().map(|v| v as f32) {
        Ok(v) if v.is_finite() => Ok(PreferenceValue::from_store(v)),
        _ => Err(StoreError::ParseError(text.to_string())),
    }
}

/// Store backed by the `gsettings` command line tool.
#[derive(Debug, Clone)]
pub struct GsettingsStore {
    program: String,
    key: PreferenceKey,
}

impl GsettingsStore {
    pub const DEFAULT_PROGRAM: &'static str = "gsettings";

    pub fn new(program: impl Into<String>, key: PreferenceKey) -> Self {
        Self { program: program.into(), key }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn key(&self) -> &PreferenceKey {
        &self.key
    }

    fn run(&self, args: &[&str]) -> Result<String, StoreError> {
        debug!("running {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program).args(args).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "{} {} failed ({}): {}",
                self.program,
                args.first().copied().unwrap_or(""),
                output.status,
                stderr
            );
            return Err(StoreError::CommandFailed(CommandFailure::Exit {
                code: output.status.code(),
                stderr,
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GsettingsStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM, PreferenceKey::default())
    }
}

impl SettingStore for GsettingsStore {
    fn read(&mut self) -> Result<PreferenceValue, StoreError> {
        let stdout = self.run(&["get", self.key.schema.as_str(), self.key.key.as_str()])?;
        parse_value(&stdout)
    }

    fn write(&mut self, value: PreferenceValue) -> Result<(), StoreError> {
        let formatted = value.to_string();
        self.run(&["set", self.key.schema.as_str(), self.key.key.as_str(), formatted.as_str()])?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.key.to_string()
    }
}
