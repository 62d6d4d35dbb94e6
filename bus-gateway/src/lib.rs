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

//! # bus-gateway
//!
//! `bus-gateway` exposes a request/reply RPC backend running over a pub/sub message bus through
//! a host server's routing and method registration.
//!
//! Inbound requests (route parameters, query string, body) are merged onto a declared pattern,
//! sent over the bus, and the reply (or the error object) becomes the response body. Declared
//! server methods do the same for in-process callers, optionally memoized by the host's cache.
//!
//! ## Pattern merging and cache keys
//!
//! ```
//! use bus_gateway::cache_key::{generate_key, CacheKey};
//! use bus_gateway::route_adapter::{RouteAdapter, RouteBinding, RouteRequest};
//! use serde_json::json;
//!
//! let binding = RouteBinding {
//!     pattern: serde_json::from_value(json!({"topic": "users", "cmd": "get"})).unwrap(),
//! };
//! let request = RouteRequest {
//!     params: Some(serde_json::from_value(json!({"id": "7"})).unwrap()),
//!     query: Some(serde_json::from_value(json!({"fields": "name"})).unwrap()),
//!     payload: None,
//! };
//!
//! let message = RouteAdapter::message_for(&binding, &request);
//! assert_eq!(
//!     serde_json::Value::Object(message.clone()),
//!     json!({"topic": "users", "cmd": "get", "id": "7", "fields": "name"})
//! );
//! assert_eq!(
//!     generate_key(Some(&message)),
//!     CacheKey::Key("topic:users,cmd:get,id:7,fields:name".to_string())
//! );
//! ```
//!
//! ## Internal architecture map
//!
//! - [`pattern`]: template/overlay merge
//! - [`cache_key`]: memoization keys for cached server methods
//! - [`gateway`]: the shared handle to the bus client
//! - [`method_adapter`] and [`route_adapter`]: host-facing callables
//! - [`readiness`]: plugin `onReady` commands run once the bus is connected
//! - [`registration`]: wires everything into a [`host::Host`] from a [`config::GatewayConfig`]
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events. Library code emits events and does not initialize
//! a global subscriber; binaries and tests do that at process boundaries.

pub mod bus;
pub mod cache_key;
pub mod config;
pub mod error;
pub mod gateway;
pub mod host;
pub mod method_adapter;
#[doc(hidden)]
pub mod observability;
pub mod pattern;
pub mod readiness;
pub mod registration;
pub mod route_adapter;

pub use config::GatewayConfig;
pub use error::{GatewayError, RpcError};
pub use gateway::RpcGateway;
pub use pattern::Pattern;
pub use registration::{register, Registration};
