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

use bus_gateway::config::PluginDeclaration;
use bus_gateway::error::ConfigError;
use bus_gateway::GatewayConfig;
use clap::Parser;
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(about = "Validates a bus gateway configuration and prints its startup plan")]
struct GatewayArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt::try_init();

    let args = GatewayArgs::parse();
    info!("Checking gateway configuration {}", &args.config);

    match GatewayConfig::from_file(&args.config).and_then(|config| startup_plan(&config)) {
        Ok(plan) => {
            println!("{plan:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Invalid gateway configuration: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Describes what registering `config` would do, in order, without contacting a bus.
fn startup_plan(config: &GatewayConfig) -> Result<Value, ConfigError> {
    let commands = config.validate()?;

    let plugins: Vec<Value> = config
        .plugins
        .iter()
        .map(|plugin| match plugin {
            PluginDeclaration::Bare(name) => json!({ "name": name }),
            PluginDeclaration::Detailed(spec) => {
                json!({ "name": spec.name, "options": spec.options })
            }
        })
        .collect();

    let methods: Vec<Value> = config
        .methods
        .iter()
        .map(|(name, definition)| {
            let cache = definition
                .cache
                .as_ref()
                .map(|policy| policy.apply_to_defaults(&config.cache_defaults));
            json!({ "name": name, "pattern": definition.pattern, "cache": cache })
        })
        .collect();

    let on_ready: Vec<Value> = commands
        .iter()
        .map(|command| {
            json!({
                "plugin": command.plugin,
                "operation": command.operation.as_str(),
                "args": command.invocation_args(),
            })
        })
        .collect();

    Ok(json!({
        "decoration_name": config.decoration_name,
        "route_handler": bus_gateway::route_adapter::ACT_HANDLER,
        "plugins": plugins,
        "methods": methods,
        "on_ready": on_ready,
    }))
}

#[cfg(test)]
mod tests {
    use super::startup_plan;
    use bus_gateway::GatewayConfig;
    use serde_json::json;

    #[test]
    fn plan_lists_commands_with_plugin_attribution() {
        let config = GatewayConfig::from_json5_str(
            r#"{
                plugins: ["stats", { name: "math", onReady: [["add", { topic: "math" }]] }],
                methods: { sum: { pattern: { topic: "math", cmd: "sum" }, cache: { ttl: 1000 } } },
                cache_defaults: { segment: "gateway" },
            }"#,
        )
        .expect("config must parse");

        let plan = startup_plan(&config).expect("config must validate");

        assert_eq!(
            plan["on_ready"],
            json!([{"plugin": "math", "operation": "add", "args": [{"topic": "math"}, "math"]}])
        );
        assert_eq!(
            plan["methods"][0]["cache"],
            json!({"expires_in": 1000, "segment": "gateway"})
        );
        assert_eq!(plan["plugins"][0], json!({"name": "stats"}));
    }

    #[test]
    fn plan_rejects_malformed_ready_commands() {
        let config = GatewayConfig::from_json5_str(
            r#"{ plugins: [{ name: "math", onReady: [["add"], [42]] }] }"#,
        )
        .expect("config must parse");

        assert!(startup_plan(&config).is_err());
    }
}
