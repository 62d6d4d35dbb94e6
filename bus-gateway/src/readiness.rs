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

//! Deferred bus-side setup executed once the bus connection is ready.
//!
//! Plugins declare `onReady` commands. They are normalized into [`DeferredCommand`]s at startup
//! and run by the [`ReadinessOrchestrator`] exactly once, strictly in declaration order: plugin
//! list order first, then each plugin's own command order. The first failing command aborts the
//! rest of the sequence.
//!
//! Operation names belong to the bus client. They are resolved against its operation table at
//! the ready transition, before any command runs.

use crate::config::PluginDeclaration;
use crate::error::{ConfigError, ReadinessError};
use crate::gateway::RpcGateway;
use crate::observability::events;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "readiness";

/// A bus operation scheduled by a plugin for the ready transition.
#[derive(Clone, Debug, PartialEq)]
pub struct DeferredCommand {
    /// Operation name, resolved by the bus client.
    pub operation: String,
    pub args: Vec<Value>,
    /// Declaring plugin. Appended as the final argument so the bus client can attribute what
    /// gets registered.
    pub plugin: String,
}

impl DeferredCommand {
    /// Arguments as sent to the bus: declared arguments followed by the plugin name.
    pub fn invocation_args(&self) -> Vec<Value> {
        let mut args = self.args.clone();
        args.push(Value::String(self.plugin.clone()));
        args
    }
}

/// Normalizes a single plugin's `onReady` declaration.
///
/// A list holds `[operation, args...]` entries. A mapping holds `operation: [args...]` entries
/// in iteration order; a non-list value there is taken as the only argument.
pub fn normalize_on_ready(
    plugin: &str,
    on_ready: &Value,
) -> Result<Vec<DeferredCommand>, ConfigError> {
    let pairs: Vec<(String, Vec<Value>)> = match on_ready {
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| sequence_entry(plugin, index, entry))
            .collect::<Result<_, _>>()?,
        Value::Object(entries) => entries
            .iter()
            .map(|(operation, args)| {
                let args = match args {
                    Value::Array(args) => args.clone(),
                    other => vec![other.clone()],
                };
                (operation.clone(), args)
            })
            .collect(),
        other => {
            return Err(ConfigError::MalformedOnReady {
                plugin: plugin.to_string(),
                reason: format!("expected a list or a mapping, found {other}"),
            })
        }
    };

    Ok(pairs
        .into_iter()
        .map(|(operation, args)| DeferredCommand {
            operation,
            args,
            plugin: plugin.to_string(),
        })
        .collect())
}

fn sequence_entry(
    plugin: &str,
    index: usize,
    entry: &Value,
) -> Result<(String, Vec<Value>), ConfigError> {
    let malformed = |reason: &str| ConfigError::MalformedOnReady {
        plugin: plugin.to_string(),
        reason: format!("entry {index}: {reason}"),
    };

    let Value::Array(items) = entry else {
        return Err(malformed("expected `[operation, args...]`"));
    };
    let Some((operation, args)) = items.split_first() else {
        return Err(malformed("empty command"));
    };
    let Value::String(operation) = operation else {
        return Err(malformed("operation name must be a string"));
    };

    Ok((operation.clone(), args.to_vec()))
}

/// Collects the readiness commands of every plugin, in declaration order.
pub fn deferred_commands(
    plugins: &[PluginDeclaration],
) -> Result<Vec<DeferredCommand>, ConfigError> {
    let mut commands = Vec::new();
    for plugin in plugins {
        if let Some(on_ready) = plugin.on_ready() {
            commands.extend(normalize_on_ready(plugin.name(), on_ready)?);
        }
    }
    Ok(commands)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadinessState {
    Pending,
    Ready,
}

/// One-shot `Pending -> Ready` executor for deferred commands.
pub struct ReadinessOrchestrator {
    gateway: RpcGateway,
    // `None` once the ready transition happened.
    pending: Mutex<Option<Vec<DeferredCommand>>>,
}

impl ReadinessOrchestrator {
    pub fn new(gateway: RpcGateway, commands: Vec<DeferredCommand>) -> Self {
        Self {
            gateway,
            pending: Mutex::new(Some(commands)),
        }
    }

    pub async fn state(&self) -> ReadinessState {
        match *self.pending.lock().await {
            Some(_) => ReadinessState::Pending,
            None => ReadinessState::Ready,
        }
    }

    /// Waits for the bus to report connected, then runs the ready transition.
    ///
    /// Returns the number of commands executed.
    pub async fn run(&self) -> Result<usize, ReadinessError> {
        debug!(
            event = events::READINESS_WAIT,
            component = COMPONENT,
            "waiting for bus readiness"
        );
        self.gateway
            .ready()
            .await
            .map_err(ReadinessError::Connection)?;
        self.transition().await
    }

    /// Runs the ready transition: every pending command, in order, once.
    ///
    /// A second call fails with [`ReadinessError::AlreadyReady`]. An operation name the bus
    /// client does not know fails the transition before any command runs. A failing command
    /// stops the sequence; the commands after it are dropped. Either way the state ends up
    /// `Ready`.
    pub async fn transition(&self) -> Result<usize, ReadinessError> {
        let commands = self
            .pending
            .lock()
            .await
            .take()
            .ok_or(ReadinessError::AlreadyReady)?;

        info!(
            event = events::READINESS_TRANSITION,
            component = COMPONENT,
            commands = commands.len(),
            "bus is ready"
        );

        let resolved = commands
            .into_iter()
            .map(|command| match self.gateway.operation(&command.operation) {
                Some(operation) => Ok((operation, command)),
                None => Err(ConfigError::UnknownOperation {
                    plugin: command.plugin,
                    operation: command.operation,
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                warn!(
                    event = events::READY_COMMAND_UNKNOWN,
                    component = COMPONENT,
                    err = %err,
                    "onReady declares an operation the bus client does not know"
                );
                ReadinessError::Config(err)
            })?;

        let mut executed = 0;
        for (resolved_operation, command) in resolved {
            let operation = resolved_operation.name();
            debug!(
                event = events::READY_COMMAND_START,
                component = COMPONENT,
                plugin = %command.plugin,
                operation,
                "running onReady command"
            );

            if let Err(err) = self
                .gateway
                .invoke(&resolved_operation, command.invocation_args())
                .await
            {
                warn!(
                    event = events::READY_COMMAND_FAILED,
                    component = COMPONENT,
                    plugin = %command.plugin,
                    operation,
                    err = %err,
                    "onReady command failed, skipping the remaining commands"
                );
                return Err(ReadinessError::CommandFailed {
                    plugin: command.plugin,
                    operation: operation.to_string(),
                    err,
                });
            }

            debug!(
                event = events::READY_COMMAND_OK,
                component = COMPONENT,
                plugin = %command.plugin,
                operation,
                "onReady command done"
            );
            executed += 1;
        }

        Ok(executed)
    }
}
