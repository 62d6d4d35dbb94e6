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

//! Cache-key derivation for memoized server methods.
//!
//! Keys are built from the top-level scalar fields of the call arguments, in iteration order.
//! Two argument sets holding the same fields in a different order derive different keys, and any
//! structured value (object, array or `null`) makes the call uncacheable. Caching layers rely on
//! this exact contract, so it is kept as is.

use crate::pattern::Pattern;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Key reported for absent or empty arguments.
pub const EMPTY_ARGS_KEY: &str = "{}";

// Characters left as-is by URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Outcome of cache-key derivation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CacheKey {
    Key(String),
    /// Memoization is disabled for this call. Not an error.
    Uncacheable,
}

impl CacheKey {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            CacheKey::Key(key) => Some(key),
            CacheKey::Uncacheable => None,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, CacheKey::Key(_))
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Key(key) => write!(f, "{key}"),
            CacheKey::Uncacheable => write!(f, "<uncacheable>"),
        }
    }
}

/// Signature of a key function handed to the host caching facility.
pub type KeyGenerator = fn(Option<&Pattern>) -> CacheKey;

/// Derives the memoization key for a call's arguments.
///
/// ```
/// use bus_gateway::cache_key::{generate_key, CacheKey};
/// use serde_json::json;
///
/// let args = serde_json::from_value(json!({"a": 1, "b": "x y"})).unwrap();
/// assert_eq!(generate_key(Some(&args)), CacheKey::Key("a:1,b:x%20y".to_string()));
/// assert_eq!(generate_key(None), CacheKey::Key("{}".to_string()));
/// ```
pub fn generate_key(args: Option<&Pattern>) -> CacheKey {
    let args = match args {
        Some(args) if !args.is_empty() => args,
        _ => return CacheKey::Key(EMPTY_ARGS_KEY.to_string()),
    };

    let mut key = String::new();
    for (index, (name, value)) in args.iter().enumerate() {
        let Some(value) = stringify_scalar(value) else {
            return CacheKey::Uncacheable;
        };

        if index > 0 {
            key.push(',');
        }
        key.extend(utf8_percent_encode(name, URI_COMPONENT));
        key.push(':');
        key.extend(utf8_percent_encode(&value, URI_COMPONENT));
    }

    CacheKey::Key(key)
}

fn stringify_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(number) => Some(
            match (number.as_i64(), number.as_u64(), number.as_f64()) {
                (Some(int), _, _) => int.to_string(),
                (_, Some(uint), _) => uint.to_string(),
                (_, _, Some(float)) => format_float(float),
                _ => number.to_string(),
            },
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Renders a float the way ECMAScript number-to-string does: shortest round-trip digits,
/// no zero fraction ("2", not "2.0"), exponent form outside `[1e-6, 1e21)` with an explicit
/// sign ("1e+21", "1.5e-7").
fn format_float(float: f64) -> String {
    if float == 0.0 {
        return "0".to_string();
    }

    let magnitude = float.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return float.to_string();
    }

    let exponential = format!("{float:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}
