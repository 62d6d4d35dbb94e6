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

//! Gateway configuration model.
//!
//! The configuration is usually read from a json5 file and mirrors the declarations the host
//! server passes when installing the gateway: bus connection settings, bus plugins with their
//! readiness commands, and server methods.

use crate::error::ConfigError;
use crate::pattern::Pattern;
use crate::readiness::{deferred_commands, DeferredCommand};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Formatter;
use std::path::Path;

const DEFAULT_DECORATION_NAME: &str = "bus";

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Transport connection settings, handed to the bus connector as is.
    #[serde(default = "empty_settings")]
    pub bus: Value,
    /// Request/reply client settings, handed to the bus connector as is.
    #[serde(default = "empty_settings")]
    pub client: Value,
    #[serde(default)]
    pub plugins: Vec<PluginDeclaration>,
    #[serde(default)]
    pub methods: MethodDeclarations,
    /// Base policy every cached method starts from.
    #[serde(default)]
    pub cache_defaults: CachePolicy,
    /// Name under which the gateway is decorated onto the host server and requests.
    #[serde(default = "default_decoration_name")]
    pub decoration_name: String,
}

fn empty_settings() -> Value {
    Value::Object(Pattern::new())
}

fn default_decoration_name() -> String {
    DEFAULT_DECORATION_NAME.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bus: empty_settings(),
            client: empty_settings(),
            plugins: Vec::new(),
            methods: MethodDeclarations::default(),
            cache_defaults: CachePolicy::default(),
            decoration_name: default_decoration_name(),
        }
    }
}

impl GatewayConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json5_str(&contents)
    }

    /// Checks every declaration that can be checked without a bus and returns the readiness
    /// commands in execution order.
    pub fn validate(&self) -> Result<Vec<DeferredCommand>, ConfigError> {
        for (name, definition) in self.methods.iter() {
            if name.is_empty() {
                return Err(ConfigError::InvalidMethod {
                    method: name.clone(),
                    reason: "method name must not be empty".to_string(),
                });
            }
            if let Some(policy) = &definition.cache {
                policy
                    .apply_to_defaults(&self.cache_defaults)
                    .check()
                    .map_err(|reason| ConfigError::InvalidMethod {
                        method: name.clone(),
                        reason,
                    })?;
            }
        }

        deferred_commands(&self.plugins)
    }
}

/// One entry of the bus plugin list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PluginDeclaration {
    Bare(String),
    Detailed(PluginSpec),
}

impl PluginDeclaration {
    pub fn name(&self) -> &str {
        match self {
            PluginDeclaration::Bare(name) => name,
            PluginDeclaration::Detailed(spec) => &spec.name,
        }
    }

    pub fn options(&self) -> Option<&Value> {
        match self {
            PluginDeclaration::Bare(_) => None,
            PluginDeclaration::Detailed(spec) => spec.options.as_ref(),
        }
    }

    pub fn on_ready(&self) -> Option<&Value> {
        match self {
            PluginDeclaration::Bare(_) => None,
            PluginDeclaration::Detailed(spec) => spec.on_ready.as_ref(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PluginSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Either a list of `[operation, args...]` entries or a mapping from operation name to
    /// its argument list.
    #[serde(default, alias = "onReady", skip_serializing_if = "Option::is_none")]
    pub on_ready: Option<Value>,
}

/// Declared server method.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MethodDefinition {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CachePolicy>,
}

/// Caching policy passed on to the host caching facility. Durations are in milliseconds.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    #[serde(default, alias = "ttl", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, alias = "staleness", skip_serializing_if = "Option::is_none")]
    pub stale_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl CachePolicy {
    /// Fills every field this policy leaves unset from `defaults`.
    pub fn apply_to_defaults(&self, defaults: &CachePolicy) -> CachePolicy {
        CachePolicy {
            expires_in: self.expires_in.or(defaults.expires_in),
            stale_in: self.stale_in.or(defaults.stale_in),
            stale_timeout: self.stale_timeout.or(defaults.stale_timeout),
            generate_timeout: self.generate_timeout.or(defaults.generate_timeout),
            segment: self.segment.clone().or_else(|| defaults.segment.clone()),
        }
    }

    fn check(&self) -> Result<(), String> {
        match (self.expires_in, self.stale_in, self.stale_timeout) {
            (None, Some(_), _) => Err("stale_in requires expires_in".to_string()),
            (Some(expires_in), Some(stale_in), _) if stale_in >= expires_in => {
                Err("stale_in must be lower than expires_in".to_string())
            }
            (_, None, Some(_)) => Err("stale_timeout requires stale_in".to_string()),
            _ => Ok(()),
        }
    }
}

/// Method declarations in declaration order.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct MethodDeclarations(Vec<(String, MethodDefinition)>);

impl MethodDeclarations {
    pub fn new(methods: Vec<(String, MethodDefinition)>) -> Self {
        Self(methods)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MethodDefinition)> {
        self.0.iter().map(|(name, definition)| (name, definition))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for MethodDeclarations {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MethodDeclarationsVisitor;

        impl<'de> Visitor<'de> for MethodDeclarationsVisitor {
            type Value = MethodDeclarations;

            fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
                write!(f, "a mapping from method name to method definition")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut methods = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, definition)) =
                    access.next_entry::<String, MethodDefinition>()?
                {
                    if methods.iter().any(|(existing, _)| existing == &name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate method `{name}`"
                        )));
                    }
                    methods.push((name, definition));
                }
                Ok(MethodDeclarations(methods))
            }
        }

        deserializer.deserialize_map(MethodDeclarationsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{CachePolicy, GatewayConfig, PluginDeclaration};
    use crate::error::ConfigError;
    use serde_json::json;

    const CONFIG: &str = r#"{
        // transport settings are passed through untouched
        bus: { url: "nats://127.0.0.1:4222" },
        plugins: [
            "bus-stats",
            {
                name: "bus-store",
                options: { collection: "users" },
                onReady: { add: [{ topic: "store", cmd: "ping" }] },
            },
        ],
        methods: {
            zeta: { pattern: { topic: "math", cmd: "sub" } },
            alpha: {
                pattern: { topic: "math", cmd: "add" },
                cache: { ttl: 60000, staleness: 1000, segment: "math" },
            },
        },
        cache_defaults: { generate_timeout: 100, stale_timeout: 50 },
    }"#;

    #[test]
    fn json5_config_is_parsed_with_defaults() {
        let config = GatewayConfig::from_json5_str(CONFIG).expect("config must parse");

        assert_eq!(config.bus, json!({"url": "nats://127.0.0.1:4222"}));
        assert_eq!(config.client, json!({}));
        assert_eq!(config.decoration_name, "bus");
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(
            config.plugins[0],
            PluginDeclaration::Bare("bus-stats".to_string())
        );
        assert_eq!(config.plugins[1].name(), "bus-store");
        assert_eq!(
            config.plugins[1].options(),
            Some(&json!({"collection": "users"}))
        );
    }

    #[test]
    fn methods_keep_declaration_order() {
        let config = GatewayConfig::from_json5_str(CONFIG).expect("config must parse");

        let names: Vec<&str> = config.methods.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn cache_policy_aliases_and_defaults() {
        let config = GatewayConfig::from_json5_str(CONFIG).expect("config must parse");
        let (_, alpha) = config
            .methods
            .iter()
            .find(|(name, _)| name.as_str() == "alpha")
            .expect("alpha must be declared");

        let policy = alpha
            .cache
            .as_ref()
            .expect("alpha is cached")
            .apply_to_defaults(&config.cache_defaults);

        assert_eq!(
            policy,
            CachePolicy {
                expires_in: Some(60000),
                stale_in: Some(1000),
                stale_timeout: Some(50),
                generate_timeout: Some(100),
                segment: Some("math".to_string()),
            }
        );
    }

    #[test]
    fn declared_policy_wins_over_defaults() {
        let defaults = CachePolicy {
            expires_in: Some(10),
            segment: Some("base".to_string()),
            ..Default::default()
        };
        let declared = CachePolicy {
            expires_in: Some(20),
            ..Default::default()
        };

        let merged = declared.apply_to_defaults(&defaults);

        assert_eq!(merged.expires_in, Some(20));
        assert_eq!(merged.segment.as_deref(), Some("base"));
    }

    #[test]
    fn validate_returns_ready_commands() {
        let config = GatewayConfig::from_json5_str(CONFIG).expect("config must parse");

        let commands = config.validate().expect("config must validate");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].plugin, "bus-store");
    }

    #[test]
    fn validate_rejects_stale_in_beyond_expiry() {
        let config = GatewayConfig::from_json5_str(
            r#"{ methods: { m: { pattern: { topic: "t" }, cache: { ttl: 10, staleness: 10 } } } }"#,
        )
        .expect("config must parse");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            GatewayConfig::from_json5_str(r#"{ nats: {} }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn duplicate_methods_are_rejected() {
        assert!(GatewayConfig::from_json5_str(
            r#"{ methods: { m: { pattern: {} }, m: { pattern: {} } } }"#
        )
        .is_err());
    }
}
