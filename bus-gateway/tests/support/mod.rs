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

use bus_gateway::Pattern;
use integration_test_utils::{BusClientFoo, BusConnectorFoo, HostFoo, PluginResolverFoo};
use serde_json::Value;
use std::sync::Arc;

pub(crate) fn pattern(value: Value) -> Pattern {
    serde_json::from_value(value).expect("test pattern must be an object")
}

pub(crate) struct Harness {
    pub(crate) client: Arc<BusClientFoo>,
    pub(crate) connector: BusConnectorFoo,
    pub(crate) resolver: PluginResolverFoo,
    pub(crate) host: HostFoo,
}

pub(crate) fn make_harness(client: BusClientFoo, known_plugins: &[&str]) -> Harness {
    integration_test_utils::init_logging();

    let client = Arc::new(client);
    Harness {
        connector: BusConnectorFoo::new(client.clone()),
        client,
        resolver: PluginResolverFoo::new(known_plugins),
        host: HostFoo::new(),
    }
}
