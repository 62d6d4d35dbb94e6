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

use bus_gateway::cache_key::CacheKey;
use bus_gateway::error::HostError;
use bus_gateway::host::{Decoration, DecorationTarget, Host};
use bus_gateway::method_adapter::{MethodCacheOptions, ServerMethod};
use bus_gateway::route_adapter::{RouteBinding, RouteHandler, RouteHandlerFactory, RouteSpec};
use bus_gateway::{Pattern, RpcError};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

type MethodEntry = (ServerMethod, Option<MethodCacheOptions>);

/// In-memory host server.
///
/// Rejects duplicate registrations, and memoizes successful replies of cached methods by the
/// key their key function derives.
#[derive(Default)]
pub struct HostFoo {
    methods: HashMap<String, MethodEntry>,
    route_handlers: HashMap<String, RouteHandlerFactory>,
    decorations: Vec<(DecorationTarget, String, Decoration)>,
    cache: Mutex<HashMap<(String, String), Value>>,
}

impl HostFoo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn cache_options(&self, name: &str) -> Option<&MethodCacheOptions> {
        self.methods
            .get(name)
            .and_then(|(_, cache)| cache.as_ref())
    }

    /// Calls a registered method the way the host's method registry would.
    pub async fn call_method(&self, name: &str, args: Option<Pattern>) -> Result<Value, RpcError> {
        let (method, cache) = self
            .methods
            .get(name)
            .ok_or_else(|| RpcError::new("HostError", format!("unknown method `{name}`")))?;

        let key = match cache {
            Some(cache) => cache.generate_key.generate(args.as_ref()),
            None => CacheKey::Uncacheable,
        };

        if let CacheKey::Key(key) = &key {
            if let Some(hit) = self
                .cache
                .lock()
                .await
                .get(&(name.to_string(), key.clone()))
            {
                debug!("HostFoo: cache hit for {name} with key {key}");
                return Ok(hit.clone());
            }
        }

        let reply = method.call(args).await?;
        if let CacheKey::Key(key) = key {
            self.cache
                .lock()
                .await
                .insert((name.to_string(), key), reply.clone());
        }
        Ok(reply)
    }

    /// Builds the handler the host would attach to a route configured with `kind`.
    pub fn route(&self, kind: &str, route: &RouteSpec, binding: &RouteBinding) -> Option<RouteHandler> {
        self.route_handlers
            .get(kind)
            .map(|factory| factory(route, binding))
    }

    pub fn decoration(&self, target: DecorationTarget, name: &str) -> Option<&Decoration> {
        self.decorations
            .iter()
            .find(|(t, n, _)| *t == target && n == name)
            .map(|(_, _, decoration)| decoration)
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }
}

impl Host for HostFoo {
    fn register_method(
        &mut self,
        name: &str,
        method: ServerMethod,
        cache: Option<MethodCacheOptions>,
    ) -> Result<(), HostError> {
        if self.methods.contains_key(name) {
            return Err(HostError::AlreadyRegistered(name.to_string()));
        }
        self.methods.insert(name.to_string(), (method, cache));
        Ok(())
    }

    fn register_route_handler(
        &mut self,
        kind: &str,
        factory: RouteHandlerFactory,
    ) -> Result<(), HostError> {
        if self.route_handlers.contains_key(kind) {
            return Err(HostError::AlreadyRegistered(kind.to_string()));
        }
        self.route_handlers.insert(kind.to_string(), factory);
        Ok(())
    }

    fn decorate(
        &mut self,
        target: DecorationTarget,
        name: &str,
        decoration: Decoration,
    ) -> Result<(), HostError> {
        if self.decoration(target, name).is_some() {
            return Err(HostError::AlreadyRegistered(format!("{target:?}.{name}")));
        }
        self.decorations.push((target, name.to_string(), decoration));
        Ok(())
    }
}
