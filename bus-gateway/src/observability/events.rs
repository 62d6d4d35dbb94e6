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

//! Canonical structured event names used across `bus-gateway`.

// Request path.
pub const RPC_ACT_START: &str = "rpc_act_start";
pub const RPC_ACT_OK: &str = "rpc_act_ok";
pub const RPC_ACT_FAILED: &str = "rpc_act_failed";
pub const ROUTE_DISPATCH: &str = "route_dispatch";
pub const METHOD_CALL: &str = "method_call";
pub const CACHE_KEY_UNCACHEABLE: &str = "cache_key_uncacheable";

// Registration.
pub const GATEWAY_REGISTER_START: &str = "gateway_register_start";
pub const GATEWAY_REGISTER_OK: &str = "gateway_register_ok";
pub const GATEWAY_REGISTER_FAILED: &str = "gateway_register_failed";
pub const BUS_CONNECT_OK: &str = "bus_connect_ok";
pub const BUS_PLUGIN_INSTALL_OK: &str = "bus_plugin_install_ok";
pub const BUS_PLUGIN_INSTALL_FAILED: &str = "bus_plugin_install_failed";
pub const METHOD_REGISTER_OK: &str = "method_register_ok";
pub const METHOD_REGISTER_FAILED: &str = "method_register_failed";
pub const HOST_DECORATE_OK: &str = "host_decorate_ok";
pub const ROUTE_HANDLER_REGISTER_OK: &str = "route_handler_register_ok";

// Readiness.
pub const READINESS_WAIT: &str = "readiness_wait";
pub const READINESS_TRANSITION: &str = "readiness_transition";
pub const READY_COMMAND_START: &str = "ready_command_start";
pub const READY_COMMAND_OK: &str = "ready_command_ok";
pub const READY_COMMAND_FAILED: &str = "ready_command_failed";
pub const READY_COMMAND_UNKNOWN: &str = "ready_command_unknown";
