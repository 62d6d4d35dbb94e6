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

mod support;

use bus_gateway::error::{ConfigError, GatewayError};
use bus_gateway::host::{Decoration, DecorationTarget};
use bus_gateway::route_adapter::{RouteBinding, RouteRequest, RouteSpec};
use bus_gateway::{register, GatewayConfig, RpcError};
use integration_test_utils::BusClientFoo;
use serde_json::json;
use std::time::Duration;
use support::{make_harness, pattern};

const CONFIG: &str = r#"{
    bus: { servers: ["nats://127.0.0.1:4222"] },
    client: { timeout: 2000 },
    plugins: [
        "bus-stats",
        { name: "bus-math", options: { precision: 2 }, onReady: { add: [{ topic: "math" }] } },
        { name: "bus-users", onReady: [["expose", "users.v1"], ["ext", "onServerPreHandler"]] },
    ],
    methods: {
        add: { pattern: { topic: "math", cmd: "add" } },
        user: { pattern: { topic: "users", cmd: "get" }, cache: { ttl: 60000, segment: "users" } },
    },
}"#;

fn config() -> GatewayConfig {
    GatewayConfig::from_json5_str(CONFIG).expect("test config must parse")
}

#[tokio::test(flavor = "multi_thread")]
async fn registration_wires_host_and_runs_ready_commands() {
    let mut harness = make_harness(
        BusClientFoo::new("bus"),
        &["bus-stats", "bus-math", "bus-users"],
    );
    harness.client.signal_ready();

    let registration = register(
        &mut harness.host,
        &harness.connector,
        &harness.resolver,
        config(),
    )
    .await
    .expect("registration must succeed");

    assert_eq!(registration.ready_commands, 3);
    assert_eq!(
        harness.connector.connections().await,
        vec![(
            json!({"servers": ["nats://127.0.0.1:4222"]}),
            json!({"timeout": 2000})
        )]
    );
    assert_eq!(
        harness.client.installed_plugins().await,
        vec![
            ("bus-stats".to_string(), None),
            ("bus-math".to_string(), Some(json!({"precision": 2}))),
            ("bus-users".to_string(), None),
        ]
    );

    let invocations: Vec<(String, serde_json::Value)> = harness
        .client
        .invocations()
        .await
        .into_iter()
        .map(|invocation| (invocation.operation, json!(invocation.args)))
        .collect();
    assert_eq!(
        invocations,
        vec![
            ("add".to_string(), json!([{"topic": "math"}, "bus-math"])),
            ("expose".to_string(), json!(["users.v1", "bus-users"])),
            ("ext".to_string(), json!(["onServerPreHandler", "bus-users"])),
        ]
    );

    assert_eq!(harness.host.method_names(), vec!["add", "user"]);
    assert!(harness.host.cache_options("add").is_none());
    assert_eq!(
        harness
            .host
            .cache_options("user")
            .and_then(|cache| cache.policy.segment.clone()),
        Some("users".to_string())
    );
    assert!(matches!(
        harness.host.decoration(DecorationTarget::Server, "bus"),
        Some(Decoration::Gateway(_))
    ));
    assert!(matches!(
        harness.host.decoration(DecorationTarget::Request, "bus"),
        Some(Decoration::Gateway(_))
    ));
    assert!(matches!(
        harness.host.decoration(DecorationTarget::Reply, "act"),
        Some(Decoration::ReplyAct(_))
    ));
    assert_eq!(harness.host.decoration_count(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn registration_completes_only_after_ready() {
    let mut harness = make_harness(BusClientFoo::new("bus"), &["bus-stats", "bus-math", "bus-users"]);
    let client = harness.client.clone();

    let (registration, invocations_before_ready) = tokio::join!(
        register(
            &mut harness.host,
            &harness.connector,
            &harness.resolver,
            config(),
        ),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let before = client.invocations().await.len();
            client.signal_ready();
            before
        }
    );

    assert_eq!(invocations_before_ready, 0);
    assert_eq!(
        registration.expect("registration must succeed").ready_commands,
        3
    );
    assert!(harness
        .client
        .invocations()
        .await
        .iter()
        .all(|invocation| invocation.after_ready));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_plugin_fails_before_connecting() {
    let mut harness = make_harness(BusClientFoo::new("bus"), &["bus-stats", "bus-math"]);
    harness.client.signal_ready();

    let result = register(
        &mut harness.host,
        &harness.connector,
        &harness.resolver,
        config(),
    )
    .await;

    assert!(matches!(
        result,
        Err(GatewayError::Config(ConfigError::MissingPlugin(ref name))) if name == "bus-users"
    ));
    assert!(harness.connector.connections().await.is_empty());
    assert!(harness.host.method_names().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn ready_operation_unknown_to_the_bus_client_is_a_config_error() {
    let mut harness = make_harness(BusClientFoo::new("bus"), &["p"]);
    harness.client.signal_ready();
    let config = GatewayConfig::from_json5_str(
        r#"{ plugins: [{ name: "p", onReady: { add: ["x"], addPattern: ["y"] } }] }"#,
    )
    .expect("config must parse");

    let result = register(&mut harness.host, &harness.connector, &harness.resolver, config).await;

    assert!(matches!(
        result,
        Err(GatewayError::Config(ConfigError::UnknownOperation { ref operation, .. }))
            if operation == "addPattern"
    ));
    assert!(harness.client.invocations().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn registered_route_handler_dispatches_over_the_bus() {
    let mut harness = make_harness(
        BusClientFoo::with_responder("bus", |pattern| match pattern.get("id") {
            Some(id) if id == "404" => Err(RpcError::new("NotFound", "no such user")),
            _ => Ok(json!({"user": pattern.get("id").cloned()})),
        }),
        &[],
    );
    harness.client.signal_ready();
    register(
        &mut harness.host,
        &harness.connector,
        &harness.resolver,
        GatewayConfig::default(),
    )
    .await
    .expect("registration must succeed");

    let handler = harness
        .host
        .route(
            "act",
            &RouteSpec::new("GET", "/users/{id}"),
            &RouteBinding {
                pattern: pattern(json!({"topic": "users", "cmd": "get"})),
            },
        )
        .expect("act handler must be registered");

    let found = handler(RouteRequest {
        params: Some(pattern(json!({"id": "7"}))),
        query: Some(pattern(json!({}))),
        payload: None,
    })
    .await;
    let missing = handler(RouteRequest {
        params: Some(pattern(json!({"id": "404"}))),
        ..Default::default()
    })
    .await;

    assert_eq!(found, json!({"user": "7"}));
    assert_eq!(missing, json!({"name": "NotFound", "message": "no such user"}));
    assert_eq!(
        harness.client.requests().await[0],
        pattern(json!({"topic": "users", "cmd": "get", "id": "7"}))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn reply_act_decoration_sends_pattern_as_is() {
    let mut harness = make_harness(BusClientFoo::new("bus"), &[]);
    harness.client.signal_ready();
    register(
        &mut harness.host,
        &harness.connector,
        &harness.resolver,
        GatewayConfig::default(),
    )
    .await
    .expect("registration must succeed");

    let Some(Decoration::ReplyAct(reply)) =
        harness.host.decoration(DecorationTarget::Reply, "act").cloned()
    else {
        panic!("reply act decoration must be present");
    };

    let body = reply.act(pattern(json!({"topic": "ping"}))).await;

    assert_eq!(body, json!({"topic": "ping"}));
}
