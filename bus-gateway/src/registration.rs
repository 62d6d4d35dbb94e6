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

//! Installs the gateway into a host server.

use crate::bus::{BusConnector, BusPlugin, PluginResolver};
use crate::config::GatewayConfig;
use crate::error::{ConfigError, GatewayError};
use crate::gateway::RpcGateway;
use crate::host::{Decoration, DecorationTarget, Host};
use crate::method_adapter::MethodAdapter;
use crate::observability::events;
use crate::readiness::ReadinessOrchestrator;
use crate::route_adapter::{RouteAdapter, ACT_HANDLER};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

const COMPONENT: &str = "registration";

/// Name of the reply decoration carrying [`ReplyAct`](crate::route_adapter::ReplyAct).
pub const REPLY_ACT_DECORATION: &str = "act";

/// Outcome of a completed registration.
pub struct Registration {
    pub gateway: RpcGateway,
    /// Number of `onReady` commands run at the ready transition.
    pub ready_commands: usize,
}

/// Connects the bus, installs plugins, registers methods, routes and decorations, then waits
/// for readiness and runs the plugins' `onReady` commands.
///
/// Configuration problems (malformed `onReady`, invalid methods, missing plugins) are reported
/// before the bus is contacted. `onReady` operations the bus client does not know are reported
/// at the ready transition, before any of them runs. Registration completes only after the
/// ready transition.
pub async fn register<H: Host + ?Sized>(
    host: &mut H,
    connector: &dyn BusConnector,
    resolver: &dyn PluginResolver,
    config: GatewayConfig,
) -> Result<Registration, GatewayError> {
    info!(
        event = events::GATEWAY_REGISTER_START,
        component = COMPONENT,
        plugins = config.plugins.len(),
        methods = config.methods.len(),
        "registering bus gateway"
    );

    let result = register_inner(host, connector, resolver, config).await;
    match &result {
        Ok(registration) => info!(
            event = events::GATEWAY_REGISTER_OK,
            component = COMPONENT,
            ready_commands = registration.ready_commands,
            "bus gateway registered"
        ),
        Err(err) => error!(
            event = events::GATEWAY_REGISTER_FAILED,
            component = COMPONENT,
            err = %err,
            "bus gateway registration failed"
        ),
    }
    result
}

async fn register_inner<H: Host + ?Sized>(
    host: &mut H,
    connector: &dyn BusConnector,
    resolver: &dyn PluginResolver,
    config: GatewayConfig,
) -> Result<Registration, GatewayError> {
    let commands = config.validate()?;
    let plugins = resolve_plugins(resolver, &config)?;

    let client = connector
        .connect(&config.bus, &config.client)
        .await
        .map_err(GatewayError::Connect)?;
    let gateway = RpcGateway::new(client);
    debug!(
        event = events::BUS_CONNECT_OK,
        component = COMPONENT,
        "bus client connected"
    );

    for (plugin, options) in plugins {
        let name = plugin.name().to_string();
        if let Err(err) = gateway.use_plugin(plugin, options).await {
            error!(
                event = events::BUS_PLUGIN_INSTALL_FAILED,
                component = COMPONENT,
                plugin = %name,
                err = %err,
                "unable to install bus plugin"
            );
            return Err(GatewayError::PluginInstall { plugin: name, err });
        }
        debug!(
            event = events::BUS_PLUGIN_INSTALL_OK,
            component = COMPONENT,
            plugin = %name,
            "bus plugin installed"
        );
    }

    MethodAdapter::new(gateway.clone(), config.cache_defaults.clone())
        .register_all(host, &config.methods)?;

    let route_adapter = RouteAdapter::new(gateway.clone());
    host.decorate(
        DecorationTarget::Server,
        &config.decoration_name,
        Decoration::Gateway(gateway.clone()),
    )?;
    host.decorate(
        DecorationTarget::Request,
        &config.decoration_name,
        Decoration::Gateway(gateway.clone()),
    )?;
    host.decorate(
        DecorationTarget::Reply,
        REPLY_ACT_DECORATION,
        Decoration::ReplyAct(route_adapter.reply_act()),
    )?;
    debug!(
        event = events::HOST_DECORATE_OK,
        component = COMPONENT,
        name = %config.decoration_name,
        "host decorated"
    );

    host.register_route_handler(ACT_HANDLER, route_adapter.factory())?;
    debug!(
        event = events::ROUTE_HANDLER_REGISTER_OK,
        component = COMPONENT,
        handler = ACT_HANDLER,
        "route handler registered"
    );

    let ready_commands = ReadinessOrchestrator::new(gateway.clone(), commands)
        .run()
        .await?;

    Ok(Registration {
        gateway,
        ready_commands,
    })
}

type ResolvedPlugin = (Arc<dyn BusPlugin>, Option<Value>);

fn resolve_plugins(
    resolver: &dyn PluginResolver,
    config: &GatewayConfig,
) -> Result<Vec<ResolvedPlugin>, ConfigError> {
    config
        .plugins
        .iter()
        .map(|declaration| {
            resolver
                .resolve(declaration.name())
                .map(|plugin| (plugin, declaration.options().cloned()))
                .ok_or_else(|| ConfigError::MissingPlugin(declaration.name().to_string()))
        })
        .collect()
}
