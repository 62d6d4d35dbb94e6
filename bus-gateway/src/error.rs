/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Error types for the gateway.
//!
//! [`RpcError`] is what the bus reports for a failed call; it is handed on verbatim. The other
//! types cover startup: configuration, host registration and readiness.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error object reported by the bus client for a transport or remote failure.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RpcError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RpcError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: None,
            details: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The error object as written into a route response body.
    pub fn to_body(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::String(self.to_string()))
    }
}

impl Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} [{code}]: {}", self.name, self.message),
            None => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

impl Error for RpcError {}

/// Startup configuration failures. `UnknownOperation` is raised at the ready transition, once the
/// bus client's operation table is available; the others before the bus is contacted.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    MissingPlugin(String),
    MalformedOnReady { plugin: String, reason: String },
    UnknownOperation { plugin: String, operation: String },
    InvalidMethod { method: String, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read configuration: {err}"),
            ConfigError::Parse(reason) => write!(f, "unable to parse configuration: {reason}"),
            ConfigError::MissingPlugin(name) => write!(f, "bus plugin `{name}` not found"),
            ConfigError::MalformedOnReady { plugin, reason } => {
                write!(f, "plugin `{plugin}` has a malformed onReady: {reason}")
            }
            ConfigError::UnknownOperation { plugin, operation } => {
                write!(
                    f,
                    "plugin `{plugin}` declares unknown bus operation `{operation}`"
                )
            }
            ConfigError::InvalidMethod { method, reason } => {
                write!(f, "method `{method}` is invalid: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

/// Rejection reported by the host registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostError {
    AlreadyRegistered(String),
    Rejected { name: String, reason: String },
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::AlreadyRegistered(name) => write!(f, "`{name}` is already registered"),
            HostError::Rejected { name, reason } => {
                write!(f, "host rejected `{name}`: {reason}")
            }
        }
    }
}

impl Error for HostError {}

/// Failures while running deferred commands at readiness.
#[derive(Debug)]
pub enum ReadinessError {
    AlreadyReady,
    Config(ConfigError),
    Connection(RpcError),
    CommandFailed {
        plugin: String,
        operation: String,
        err: RpcError,
    },
}

impl Display for ReadinessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadinessError::AlreadyReady => write!(f, "readiness has already been reached"),
            ReadinessError::Config(err) => write!(f, "{err}"),
            ReadinessError::Connection(err) => write!(f, "bus never became ready: {err}"),
            ReadinessError::CommandFailed {
                plugin,
                operation,
                err,
            } => write!(
                f,
                "onReady command `{operation}` of plugin `{plugin}` failed: {err}"
            ),
        }
    }
}

impl Error for ReadinessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadinessError::Config(err) => Some(err),
            ReadinessError::Connection(err) => Some(err),
            ReadinessError::CommandFailed { err, .. } => Some(err),
            ReadinessError::AlreadyReady => None,
        }
    }
}

/// Failures of the gateway registration as a whole.
#[derive(Debug)]
pub enum GatewayError {
    Config(ConfigError),
    Connect(RpcError),
    PluginInstall { plugin: String, err: RpcError },
    Host(HostError),
    Readiness(ReadinessError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Config(err) => write!(f, "configuration error: {err}"),
            GatewayError::Connect(err) => write!(f, "unable to connect bus client: {err}"),
            GatewayError::PluginInstall { plugin, err } => {
                write!(f, "unable to install bus plugin `{plugin}`: {err}")
            }
            GatewayError::Host(err) => write!(f, "host registration failed: {err}"),
            GatewayError::Readiness(err) => write!(f, "readiness failed: {err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Config(err) => Some(err),
            GatewayError::Connect(err) => Some(err),
            GatewayError::PluginInstall { err, .. } => Some(err),
            GatewayError::Host(err) => Some(err),
            GatewayError::Readiness(err) => Some(err),
        }
    }
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        GatewayError::Config(err)
    }
}

impl From<HostError> for GatewayError {
    fn from(err: HostError) -> Self {
        GatewayError::Host(err)
    }
}

impl From<ReadinessError> for GatewayError {
    fn from(err: ReadinessError) -> Self {
        match err {
            ReadinessError::Config(err) => GatewayError::Config(err),
            err => GatewayError::Readiness(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GatewayError, ReadinessError, RpcError};
    use serde_json::json;
    use std::error::Error;

    #[test]
    fn rpc_error_body_keeps_all_fields() {
        let err = RpcError::new("TimeoutError", "Timeout")
            .with_code("T1")
            .with_details(json!({"pattern": "topic:math"}));

        assert_eq!(
            err.to_body(),
            json!({
                "name": "TimeoutError",
                "message": "Timeout",
                "code": "T1",
                "details": {"pattern": "topic:math"}
            })
        );
    }

    #[test]
    fn rpc_error_body_skips_absent_fields() {
        assert_eq!(
            RpcError::new("BusinessError", "nope").to_body(),
            json!({"name": "BusinessError", "message": "nope"})
        );
    }

    #[test]
    fn readiness_command_failure_exposes_source() {
        let err = GatewayError::from(ReadinessError::CommandFailed {
            plugin: "p1".to_string(),
            operation: "add".to_string(),
            err: RpcError::new("PatternNotFound", "no handler"),
        });

        assert!(err.to_string().contains("onReady command `add` of plugin `p1`"));
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_operation_at_readiness_surfaces_as_config_error() {
        let err = GatewayError::from(ReadinessError::Config(ConfigError::UnknownOperation {
            plugin: "p1".to_string(),
            operation: "foo".to_string(),
        }));

        assert!(matches!(
            err,
            GatewayError::Config(ConfigError::UnknownOperation { ref operation, .. })
                if operation == "foo"
        ));
    }

    #[test]
    fn missing_plugin_display_is_stable() {
        assert_eq!(
            ConfigError::MissingPlugin("hemera-joi".to_string()).to_string(),
            "bus plugin `hemera-joi` not found"
        );
    }
}
