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

//! Server methods backed by RPC calls.
//!
//! Each declared method becomes a [`ServerMethod`] in the host's method registry. Calling it
//! merges the caller's arguments onto the declared pattern and sends the result over the bus.
//! Cached methods also hand the host a key function and the effective [`CachePolicy`].

use crate::cache_key::{generate_key, CacheKey, KeyGenerator};
use crate::config::{CachePolicy, MethodDeclarations, MethodDefinition};
use crate::error::{HostError, RpcError};
use crate::gateway::RpcGateway;
use crate::host::Host;
use crate::observability::{events, fields};
use crate::pattern::{merge, Pattern};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

const COMPONENT: &str = "method_adapter";

/// Callable registered with the host for one declared method.
#[derive(Clone)]
pub struct ServerMethod {
    name: Arc<str>,
    template: Arc<Pattern>,
    gateway: RpcGateway,
}

impl ServerMethod {
    pub fn new(name: &str, template: Pattern, gateway: RpcGateway) -> Self {
        Self {
            name: name.into(),
            template: Arc::new(template),
            gateway,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The outgoing RPC pattern for a call with `args`.
    pub fn pattern_for(&self, args: Option<&Pattern>) -> Pattern {
        merge(&self.template, args)
    }

    /// Calls the method. RPC failures are returned as reported, without retries.
    pub async fn call(&self, args: Option<Pattern>) -> Result<Value, RpcError> {
        let pattern = self.pattern_for(args.as_ref());
        trace!(
            event = events::METHOD_CALL,
            component = COMPONENT,
            method = %self.name,
            pattern = %fields::format_pattern(&pattern),
            "calling server method"
        );
        self.gateway.act(pattern).await
    }

    /// Continuation-style call: `next` receives the outcome once the reply arrives.
    pub async fn call_with<F>(&self, args: Option<Pattern>, next: F)
    where
        F: FnOnce(Result<Value, RpcError>),
    {
        next(self.call(args).await)
    }
}

/// Key function bound to one cached method.
#[derive(Clone, Debug)]
pub struct MethodKeyGenerator {
    method: Arc<str>,
    generator: KeyGenerator,
}

impl MethodKeyGenerator {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.into(),
            generator: generate_key,
        }
    }

    /// Derives the cache key. An uncacheable call is reported at debug level and not cached.
    pub fn generate(&self, args: Option<&Pattern>) -> CacheKey {
        let key = (self.generator)(args);
        if !key.is_cacheable() {
            debug!(
                event = events::CACHE_KEY_UNCACHEABLE,
                component = COMPONENT,
                method = %self.method,
                "structured arguments, call is not cached"
            );
        }
        key
    }
}

/// Caching options handed to the host for a cached method.
#[derive(Clone, Debug)]
pub struct MethodCacheOptions {
    pub generate_key: MethodKeyGenerator,
    pub policy: CachePolicy,
}

/// Registers declared methods with the host.
pub struct MethodAdapter {
    gateway: RpcGateway,
    cache_defaults: CachePolicy,
}

impl MethodAdapter {
    pub fn new(gateway: RpcGateway, cache_defaults: CachePolicy) -> Self {
        Self {
            gateway,
            cache_defaults,
        }
    }

    /// Caching options for a method, `None` when the method is not cached.
    ///
    /// The declared policy is applied over the base policy and wins on every field it sets.
    pub fn cache_options(
        &self,
        name: &str,
        definition: &MethodDefinition,
    ) -> Option<MethodCacheOptions> {
        definition.cache.as_ref().map(|policy| MethodCacheOptions {
            generate_key: MethodKeyGenerator::new(name),
            policy: policy.apply_to_defaults(&self.cache_defaults),
        })
    }

    /// Registers exactly one host method for `definition`.
    pub fn register<H: Host + ?Sized>(
        &self,
        host: &mut H,
        name: &str,
        definition: &MethodDefinition,
    ) -> Result<(), HostError> {
        let method = ServerMethod::new(name, definition.pattern.clone(), self.gateway.clone());
        let cache = self.cache_options(name, definition);
        let cached = cache.is_some();

        match host.register_method(name, method, cache) {
            Ok(()) => {
                debug!(
                    event = events::METHOD_REGISTER_OK,
                    component = COMPONENT,
                    method = name,
                    cached,
                    "server method registered"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::METHOD_REGISTER_FAILED,
                    component = COMPONENT,
                    method = name,
                    err = %err,
                    "host rejected server method"
                );
                Err(err)
            }
        }
    }

    /// Registers every declared method, in declaration order.
    pub fn register_all<H: Host + ?Sized>(
        &self,
        host: &mut H,
        methods: &MethodDeclarations,
    ) -> Result<(), HostError> {
        for (name, definition) in methods.iter() {
            self.register(host, name, definition)?;
        }
        Ok(())
    }
}
