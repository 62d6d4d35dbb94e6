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

//! Route handlers backed by RPC calls.
//!
//! A route bound to the `act` handler carries a [`RouteBinding`]. Each request merges path
//! parameters, then the query string, then the body onto the bound pattern (later stages win),
//! sends it over the bus and writes the reply, or the error object, as the response body. No
//! status code translation happens here.

use crate::gateway::RpcGateway;
use crate::observability::{events, fields};
use crate::pattern::{merge, Pattern};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "route_adapter";

/// Name of the route handler type registered with the host.
pub const ACT_HANDLER: &str = "act";

/// Pattern template bound to one route.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RouteBinding {
    pub pattern: Pattern,
}

/// Host-side description of the route a handler is built for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
}

impl RouteSpec {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

/// Request data a route handler merges. Absent stages are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteRequest {
    pub params: Option<Pattern>,
    pub query: Option<Pattern>,
    pub payload: Option<Pattern>,
}

impl RouteRequest {
    /// Overlays in precedence order, lowest first.
    pub fn overlays(&self) -> impl Iterator<Item = &Pattern> {
        [&self.params, &self.query, &self.payload]
            .into_iter()
            .flatten()
    }
}

pub type RouteHandler = Arc<dyn Fn(RouteRequest) -> BoxFuture<'static, Value> + Send + Sync>;
pub type RouteHandlerFactory =
    Arc<dyn Fn(&RouteSpec, &RouteBinding) -> RouteHandler + Send + Sync>;

/// Terminal response action: sends a pattern as is and yields the response body.
///
/// Decorated onto the host's reply toolkit so response-building code can answer with an RPC.
#[derive(Clone)]
pub struct ReplyAct {
    gateway: RpcGateway,
}

impl ReplyAct {
    pub fn new(gateway: RpcGateway) -> Self {
        Self { gateway }
    }

    /// The reply payload on success, the serialized error object on failure.
    pub async fn act(&self, pattern: Pattern) -> Value {
        match self.gateway.act(pattern).await {
            Ok(reply) => reply,
            Err(err) => err.to_body(),
        }
    }
}

/// Builds `act` route handlers.
#[derive(Clone)]
pub struct RouteAdapter {
    reply: ReplyAct,
}

impl RouteAdapter {
    pub fn new(gateway: RpcGateway) -> Self {
        Self {
            reply: ReplyAct::new(gateway),
        }
    }

    /// The outgoing pattern for `request` on a route bound to `binding`.
    pub fn message_for(binding: &RouteBinding, request: &RouteRequest) -> Pattern {
        merge(&binding.pattern, request.overlays())
    }

    /// Builds the handler for one route.
    pub fn handle(&self, route: &RouteSpec, binding: &RouteBinding) -> RouteHandler {
        let reply = self.reply.clone();
        let binding = Arc::new(binding.clone());
        let route_label = Arc::<str>::from(format!("{} {}", route.method, route.path));

        Arc::new(move |request: RouteRequest| {
            let reply = reply.clone();
            let message = Self::message_for(&binding, &request);
            let route_label = route_label.clone();

            async move {
                debug!(
                    event = events::ROUTE_DISPATCH,
                    component = COMPONENT,
                    route = %route_label,
                    pattern = %fields::format_pattern(&message),
                    "dispatching route over the bus"
                );
                reply.act(message).await
            }
            .boxed()
        })
    }

    /// Handler factory in the shape the host's route registry expects.
    pub fn factory(&self) -> RouteHandlerFactory {
        let adapter = self.clone();
        Arc::new(move |route: &RouteSpec, binding: &RouteBinding| adapter.handle(route, binding))
    }

    pub fn reply_act(&self) -> ReplyAct {
        self.reply.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteAdapter, RouteBinding, RouteRequest, RouteSpec};
    use crate::bus::{BusClient, BusOperation, BusPlugin};
    use crate::error::RpcError;
    use crate::gateway::RpcGateway;
    use crate::pattern::Pattern;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct EchoClient;

    #[async_trait]
    impl BusClient for EchoClient {
        async fn request(&self, pattern: Pattern) -> Result<Value, RpcError> {
            match pattern.get("cmd") {
                Some(Value::String(cmd)) if cmd == "boom" => {
                    Err(RpcError::new("BusinessError", "boom"))
                }
                _ => Ok(Value::Object(pattern)),
            }
        }

        async fn ready(&self) -> Result<(), RpcError> {
            Ok(())
        }

        fn operation(&self, _name: &str) -> Option<BusOperation> {
            None
        }

        async fn invoke(
            &self,
            _operation: &BusOperation,
            _args: Vec<Value>,
        ) -> Result<Value, RpcError> {
            Ok(Value::Null)
        }

        async fn use_plugin(
            &self,
            _plugin: Arc<dyn BusPlugin>,
            _options: Option<Value>,
        ) -> Result<(), RpcError> {
            Ok(())
        }
    }

    fn pattern(value: Value) -> Pattern {
        serde_json::from_value(value).unwrap()
    }

    fn binding(value: Value) -> RouteBinding {
        RouteBinding {
            pattern: pattern(value),
        }
    }

    #[test]
    fn path_params_are_merged_onto_binding() {
        let request = RouteRequest {
            params: Some(pattern(json!({"id": "7"}))),
            query: Some(Pattern::new()),
            payload: Some(Pattern::new()),
        };

        assert_eq!(
            RouteAdapter::message_for(&binding(json!({"type": "greet"})), &request),
            pattern(json!({"type": "greet", "id": "7"}))
        );
    }

    #[test]
    fn body_wins_over_query_which_wins_over_params() {
        let request = RouteRequest {
            params: Some(pattern(json!({"a": 0, "p": true}))),
            query: Some(pattern(json!({"a": 2, "q": true}))),
            payload: Some(pattern(json!({"a": 3}))),
        };

        let message = RouteAdapter::message_for(&binding(json!({"type": "x", "a": 1})), &request);

        assert_eq!(message, pattern(json!({"type": "x", "a": 3, "p": true, "q": true})));
    }

    #[test]
    fn absent_stages_are_skipped() {
        let request = RouteRequest {
            query: Some(pattern(json!({"page": 2}))),
            ..Default::default()
        };

        assert_eq!(
            RouteAdapter::message_for(&binding(json!({"topic": "users"})), &request),
            pattern(json!({"topic": "users", "page": 2}))
        );
    }

    #[tokio::test]
    async fn handler_writes_reply_as_body() {
        let adapter = RouteAdapter::new(RpcGateway::new(Arc::new(EchoClient)));
        let handler = adapter.handle(
            &RouteSpec::new("GET", "/users/{id}"),
            &binding(json!({"topic": "users", "cmd": "get"})),
        );

        let body = handler(RouteRequest {
            params: Some(pattern(json!({"id": "42"}))),
            ..Default::default()
        })
        .await;

        assert_eq!(body, json!({"topic": "users", "cmd": "get", "id": "42"}));
    }

    #[tokio::test]
    async fn handler_writes_error_object_as_body() {
        let adapter = RouteAdapter::new(RpcGateway::new(Arc::new(EchoClient)));
        let handler = adapter.factory()(
            &RouteSpec::new("POST", "/boom"),
            &binding(json!({"topic": "t", "cmd": "boom"})),
        );

        let body = handler(RouteRequest::default()).await;

        assert_eq!(body, json!({"name": "BusinessError", "message": "boom"}));
    }
}
