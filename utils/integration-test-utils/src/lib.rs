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

mod bus_client_foo;
pub use bus_client_foo::{
    BusClientFoo, BusConnectorFoo, Invocation, NamedPlugin, PluginResolverFoo,
};
mod host_foo;
pub use host_foo::HostFoo;

/// Installs a test-friendly `tracing` subscriber once per process.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
