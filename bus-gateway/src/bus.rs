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

//! Bus-side collaborators consumed by the gateway.
//!
//! The transport, its wire protocol and plugin packaging belong to the bus client. This module
//! only names what the gateway needs from it.

use crate::error::RpcError;
use crate::pattern::Pattern;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Handle to a bus-side operation, as listed in the bus client's own operation table.
///
/// The gateway does not know which operations exist. Names coming from plugin `onReady`
/// declarations are resolved through [`BusClient::operation`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BusOperation(Arc<str>);

impl BusOperation {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for BusOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plugin module installable into the bus client.
pub trait BusPlugin: Send + Sync {
    fn name(&self) -> &str;
}

/// Locates bus plugin modules by the name used in the plugin declarations.
pub trait PluginResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn BusPlugin>>;
}

/// Request/reply client over the pub/sub transport.
#[async_trait]
pub trait BusClient: Send + Sync {
    /// Sends `pattern` and resolves with the remote reply payload.
    async fn request(&self, pattern: Pattern) -> Result<Value, RpcError>;

    /// Resolves once the transport reports connected.
    async fn ready(&self) -> Result<(), RpcError>;

    /// Looks `name` up in the client's operation table. `None` when the client has no such
    /// operation.
    fn operation(&self, name: &str) -> Option<BusOperation>;

    /// Runs a bus-side operation previously resolved with [`BusClient::operation`].
    async fn invoke(&self, operation: &BusOperation, args: Vec<Value>)
        -> Result<Value, RpcError>;

    /// Installs a bus plugin with its options.
    async fn use_plugin(
        &self,
        plugin: Arc<dyn BusPlugin>,
        options: Option<Value>,
    ) -> Result<(), RpcError>;
}

/// Opens bus client connections.
#[async_trait]
pub trait BusConnector: Send + Sync {
    /// `transport` holds the transport connection settings, `client` the request/reply client
    /// settings. Both are passed through untouched.
    async fn connect(&self, transport: &Value, client: &Value)
        -> Result<Arc<dyn BusClient>, RpcError>;
}
