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

//! Structured field value-format helpers.

use crate::pattern::Pattern;

pub const NONE: &str = "none";

/// Compact `name:value` rendering of a pattern's scalar fields, used in log lines.
///
/// Structured values are elided so log lines stay bounded.
pub fn format_pattern(pattern: &Pattern) -> String {
    if pattern.is_empty() {
        return NONE.to_string();
    }

    pattern
        .iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(value) => format!("{name}:{value}"),
            serde_json::Value::Object(_) => format!("{name}:{{..}}"),
            serde_json::Value::Array(_) => format!("{name}:[..]"),
            other => format!("{name}:{other}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}
