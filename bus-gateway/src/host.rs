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

//! Host server registry consumed by the gateway.
//!
//! The host owns routing, method registration and caching. The gateway only needs to register
//! named methods (optionally cached), register a route handler factory and decorate the
//! server, request and reply objects.

use crate::error::HostError;
use crate::gateway::RpcGateway;
use crate::method_adapter::{MethodCacheOptions, ServerMethod};
use crate::route_adapter::{ReplyAct, RouteHandlerFactory};

/// Host object a decoration is attached to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecorationTarget {
    Server,
    Request,
    Reply,
}

/// Value attached by a decoration.
#[derive(Clone)]
pub enum Decoration {
    Gateway(RpcGateway),
    ReplyAct(ReplyAct),
}

pub trait Host {
    /// Registers a named method. Duplicate names are for the host to reject or overwrite.
    fn register_method(
        &mut self,
        name: &str,
        method: ServerMethod,
        cache: Option<MethodCacheOptions>,
    ) -> Result<(), HostError>;

    fn register_route_handler(
        &mut self,
        kind: &str,
        factory: RouteHandlerFactory,
    ) -> Result<(), HostError>;

    fn decorate(
        &mut self,
        target: DecorationTarget,
        name: &str,
        decoration: Decoration,
    ) -> Result<(), HostError>;
}
