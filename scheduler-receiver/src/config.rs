//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables, falling back to
//! defaults for anything unset or unparseable.

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::data::SCHEDULER_JOB_EXECUTED;

/// How the receiver answers a valid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMode {
    /// 200 with an empty body
    #[default]
    Ack,
    /// 200 with a binary-mode acknowledgement CloudEvent
    Echo,
}

impl FromStr for ReplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ack" => Ok(ReplyMode::Ack),
            "echo" => Ok(ReplyMode::Echo),
            other => Err(format!("unknown reply mode: {}", other)),
        }
    }
}

impl fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyMode::Ack => f.write_str("ack"),
            ReplyMode::Echo => f.write_str("echo"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Acknowledge-only or echo-reply
    pub reply_mode: ReplyMode,

    /// Include the decoded `customData` in the execution log line
    pub log_payload: bool,

    /// Event type assumed when a delivery carries no `ce-type`
    pub default_event_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            reply_mode: ReplyMode::Ack,
            log_payload: true,
            default_event_type: SCHEDULER_JOB_EXECUTED.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_var("PORT", defaults.port),

            reply_mode: parse_var("REPLY_MODE", defaults.reply_mode),

            log_payload: parse_bool("LOG_PAYLOAD", defaults.log_payload),

            default_event_type: env::var("DEFAULT_EVENT_TYPE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_event_type),
        }
    }
}

/// Parse an environment variable, warning and using `default` if it is invalid.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a boolean flag such as "true", "0" or "yes".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}
