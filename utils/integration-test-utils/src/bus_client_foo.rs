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

use async_trait::async_trait;
use bus_gateway::bus::{BusClient, BusConnector, BusOperation, BusPlugin, PluginResolver};
use bus_gateway::{Pattern, RpcError};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::debug;

type Responder = Arc<dyn Fn(&Pattern) -> Result<Value, RpcError> + Send + Sync>;

/// Operations known to a [`BusClientFoo`] unless replaced with [`BusClientFoo::with_operations`].
const DEFAULT_OPERATIONS: [&str; 9] = [
    "add",
    "remove",
    "ext",
    "expose",
    "decorate",
    "use",
    "setOption",
    "setConfig",
    "act",
];

/// One recorded bus-side operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub operation: String,
    pub args: Vec<Value>,
    /// Whether the bus had reported ready when the operation ran.
    pub after_ready: bool,
}

/// Scripted in-memory bus client.
///
/// Replies are produced by a responder (an echo of the request pattern by default). Readiness
/// is held back until [`BusClientFoo::signal_ready`] is called.
pub struct BusClientFoo {
    name: String,
    responder: Responder,
    operations: HashSet<String>,
    ready_tx: watch::Sender<bool>,
    requests: Mutex<Vec<Pattern>>,
    invocations: Mutex<Vec<Invocation>>,
    installed_plugins: Mutex<Vec<(String, Option<Value>)>>,
    failing_operations: Mutex<HashSet<String>>,
    pub times_requested: AtomicU64,
}

impl BusClientFoo {
    pub fn new(name: &str) -> Self {
        Self::with_responder(name, |pattern| Ok(Value::Object(pattern.clone())))
    }

    pub fn with_responder<F>(name: &str, responder: F) -> Self
    where
        F: Fn(&Pattern) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        let (ready_tx, _) = watch::channel(false);
        Self {
            name: name.to_string(),
            responder: Arc::new(responder),
            operations: DEFAULT_OPERATIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            ready_tx,
            requests: Mutex::new(Vec::new()),
            invocations: Mutex::new(Vec::new()),
            installed_plugins: Mutex::new(Vec::new()),
            failing_operations: Mutex::new(HashSet::new()),
            times_requested: AtomicU64::new(0),
        }
    }

    /// Replaces the operation table.
    pub fn with_operations(mut self, operations: &[&str]) -> Self {
        self.operations = operations.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Reports the transport as connected.
    pub fn signal_ready(&self) {
        debug!("{}: signalling ready", &self.name);
        self.ready_tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Makes every later invocation of `operation` fail.
    pub async fn fail_operation(&self, operation: &str) {
        self.failing_operations
            .lock()
            .await
            .insert(operation.to_string());
    }

    pub async fn requests(&self) -> Vec<Pattern> {
        self.requests.lock().await.clone()
    }

    pub async fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().await.clone()
    }

    pub async fn installed_plugins(&self) -> Vec<(String, Option<Value>)> {
        self.installed_plugins.lock().await.clone()
    }
}

#[async_trait]
impl BusClient for BusClientFoo {
    async fn request(&self, pattern: Pattern) -> Result<Value, RpcError> {
        self.times_requested.fetch_add(1, Ordering::SeqCst);
        let reply = (self.responder)(&pattern);
        self.requests.lock().await.push(pattern);
        reply
    }

    async fn ready(&self) -> Result<(), RpcError> {
        let mut ready_rx = self.ready_tx.subscribe();
        while !*ready_rx.borrow_and_update() {
            ready_rx.changed().await.map_err(|_| {
                RpcError::new("ConnectionError", "bus client closed before ready")
            })?;
        }
        Ok(())
    }

    fn operation(&self, name: &str) -> Option<BusOperation> {
        self.operations
            .contains(name)
            .then(|| BusOperation::new(name))
    }

    async fn invoke(
        &self,
        operation: &BusOperation,
        args: Vec<Value>,
    ) -> Result<Value, RpcError> {
        debug!("{}: invoking {operation} with {args:?}", &self.name);
        self.invocations.lock().await.push(Invocation {
            operation: operation.name().to_string(),
            args,
            after_ready: self.is_ready(),
        });

        if self
            .failing_operations
            .lock()
            .await
            .contains(operation.name())
        {
            return Err(RpcError::new(
                "OperationError",
                format!("{operation} rejected by {}", &self.name),
            ));
        }
        Ok(Value::Null)
    }

    async fn use_plugin(
        &self,
        plugin: Arc<dyn BusPlugin>,
        options: Option<Value>,
    ) -> Result<(), RpcError> {
        self.installed_plugins
            .lock()
            .await
            .push((plugin.name().to_string(), options));
        Ok(())
    }
}

/// Connector handing out a shared [`BusClientFoo`] and remembering the settings it got.
pub struct BusConnectorFoo {
    client: Arc<BusClientFoo>,
    settings: Mutex<Vec<(Value, Value)>>,
}

impl BusConnectorFoo {
    pub fn new(client: Arc<BusClientFoo>) -> Self {
        Self {
            client,
            settings: Mutex::new(Vec::new()),
        }
    }

    pub async fn connections(&self) -> Vec<(Value, Value)> {
        self.settings.lock().await.clone()
    }
}

#[async_trait]
impl BusConnector for BusConnectorFoo {
    async fn connect(
        &self,
        transport: &Value,
        client: &Value,
    ) -> Result<Arc<dyn BusClient>, RpcError> {
        self.settings
            .lock()
            .await
            .push((transport.clone(), client.clone()));
        let client: Arc<dyn BusClient> = self.client.clone();
        Ok(client)
    }
}

pub struct NamedPlugin(pub String);

impl BusPlugin for NamedPlugin {
    fn name(&self) -> &str {
        &self.0
    }
}

/// Resolves only the plugin names it was built with.
pub struct PluginResolverFoo {
    known: HashSet<String>,
}

impl PluginResolverFoo {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl PluginResolver for PluginResolverFoo {
    fn resolve(&self, name: &str) -> Option<Arc<dyn BusPlugin>> {
        self.known
            .contains(name)
            .then(|| Arc::new(NamedPlugin(name.to_string())) as Arc<dyn BusPlugin>)
    }
}
