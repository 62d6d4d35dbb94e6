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

//! RPC gateway over the bus client.

use crate::bus::{BusClient, BusOperation, BusPlugin};
use crate::error::RpcError;
use crate::observability::{events, fields};
use crate::pattern::Pattern;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

const COMPONENT: &str = "rpc_gateway";

/// Handle to the bus client shared by methods, route handlers and the readiness orchestrator.
///
/// One gateway is built per process at registration time and lives until the process exits.
/// Cloning is cheap and every clone talks to the same client.
#[derive(Clone)]
pub struct RpcGateway {
    client: Arc<dyn BusClient>,
}

impl RpcGateway {
    pub fn new(client: Arc<dyn BusClient>) -> Self {
        Self { client }
    }

    /// Sends `pattern` as a single request and returns the reply payload.
    ///
    /// Errors reported by the transport or the remote side are returned untouched.
    pub async fn act(&self, pattern: Pattern) -> Result<Value, RpcError> {
        let pattern_value = fields::format_pattern(&pattern);
        trace!(
            event = events::RPC_ACT_START,
            component = COMPONENT,
            pattern = %pattern_value,
            "sending request"
        );

        let reply = self.client.request(pattern).await;
        match &reply {
            Ok(_) => trace!(
                event = events::RPC_ACT_OK,
                component = COMPONENT,
                pattern = %pattern_value,
                "received reply"
            ),
            Err(err) => debug!(
                event = events::RPC_ACT_FAILED,
                component = COMPONENT,
                pattern = %pattern_value,
                err = %err,
                "request failed"
            ),
        }
        reply
    }

    /// Resolves once the bus transport reports connected.
    pub async fn ready(&self) -> Result<(), RpcError> {
        self.client.ready().await
    }

    /// Runs `callback` once the bus is ready. The callback runs at most once.
    pub async fn on_ready<F, Fut, T>(&self, callback: F) -> Result<T, RpcError>
    where
        F: FnOnce(RpcGateway) -> Fut,
        Fut: Future<Output = T>,
    {
        self.ready().await?;
        Ok(callback(self.clone()).await)
    }

    /// Resolves an operation name against the bus client's operation table.
    pub fn operation(&self, name: &str) -> Option<BusOperation> {
        self.client.operation(name)
    }

    /// Runs a bus-side operation resolved with [`RpcGateway::operation`].
    pub async fn invoke(
        &self,
        operation: &BusOperation,
        args: Vec<Value>,
    ) -> Result<Value, RpcError> {
        self.client.invoke(operation, args).await
    }

    /// Installs a bus plugin.
    pub async fn use_plugin(
        &self,
        plugin: Arc<dyn BusPlugin>,
        options: Option<Value>,
    ) -> Result<(), RpcError> {
        self.client.use_plugin(plugin, options).await
    }
}
