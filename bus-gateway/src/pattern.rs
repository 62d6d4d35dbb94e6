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

//! Pattern model and the template/overlay merge used to build outgoing RPC messages.

use serde_json::{Map, Value};

/// Ordered field-name to value mapping.
///
/// A pattern is both a call template (as declared for a method or a route) and a fully merged
/// outgoing RPC message. Iteration order is declaration order.
pub type Pattern = Map<String, Value>;

/// Merges `overlays` onto `template`, in order, into a new [`Pattern`].
///
/// Neither the template nor any overlay is modified. Each overlay is applied to the result of
/// the previous step, so a later overlay wins over earlier ones and over the template:
///
/// - an object overlay value landing on an object field is merged into it key by key, so the
///   existing object supplies defaults for every key the overlay omits
/// - any other non-null overlay value replaces the field (arrays are replaced, not concatenated)
/// - a `null` overlay value never overrides
///
/// ```
/// use bus_gateway::pattern::{merge, Pattern};
/// use serde_json::json;
///
/// let template: Pattern = serde_json::from_value(json!({"topic": "math", "cmd": "add"})).unwrap();
/// let query: Pattern = serde_json::from_value(json!({"a": 1})).unwrap();
/// let body: Pattern = serde_json::from_value(json!({"a": 2, "b": 3})).unwrap();
///
/// let merged = merge(&template, [&query, &body]);
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"topic": "math", "cmd": "add", "a": 2, "b": 3})
/// );
/// ```
pub fn merge<'a, I>(template: &Pattern, overlays: I) -> Pattern
where
    I: IntoIterator<Item = &'a Pattern>,
{
    overlays
        .into_iter()
        .fold(template.clone(), |merged, overlay| {
            apply_to_defaults(merged, overlay)
        })
}

/// Applies a single overlay onto an owned set of defaults.
pub fn apply_to_defaults(mut defaults: Pattern, overlay: &Pattern) -> Pattern {
    merge_into(&mut defaults, overlay);
    defaults
}

fn merge_into(target: &mut Pattern, source: &Pattern) {
    for (name, value) in source {
        match (target.get_mut(name), value) {
            (_, Value::Null) => {}
            (Some(Value::Object(sub_template)), Value::Object(sub_overlay)) => {
                merge_into(sub_template, sub_overlay)
            }
            _ => {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}
