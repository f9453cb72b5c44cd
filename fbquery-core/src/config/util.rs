use std::env;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_yaml::{Deserializer, Mapping, Value};

/// Parses the supplied string as a config value
pub fn parse_config<'a>(conf_str: impl Into<&'a str>) -> Result<Value> {
    Value::deserialize(Deserializer::from_str(conf_str.into()))
        .context("Failed to parse configuration yaml")
}

/// Recursively walks the configuration nodes, transforming any strings found
pub fn process_strings(node: Value, cb: &impl Fn(String) -> Result<String>) -> Result<Value> {
    Ok(match node {
        Value::String(str) => Value::String(
            cb(str.clone()).with_context(|| format!("Failed to process config string {}", str))?,
        ),
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(|n| process_strings(n, cb))
                .collect::<Result<Vec<Value>>>()?,
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| -> Result<(Value, Value)> { Ok((k, process_strings(v, cb)?)) })
                .collect::<Result<Mapping>>()?,
        ),
        n => n,
    })
}

/// Replaces `${env:NAME}` and `${env:NAME:default}` in the config strings
pub fn interpolate_env(node: Value) -> Result<Value> {
    process_strings(node, &|str| interpolate_env_str(&str, |name| env::var(name).ok()))
}

fn interpolate_env_str(str: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    const START: &str = "${env:";

    let mut out = String::with_capacity(str.len());
    let mut rest = str;

    while let Some(start) = rest.find(START) {
        out.push_str(&rest[..start]);
        let expr = &rest[start + START.len()..];

        let end = match expr.find('}') {
            Some(end) => end,
            None => bail!("Failed to parse \"{}\", found unclosed ${{env:...}}", str),
        };

        let (name, default) = match expr[..end].split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (&expr[..end], None),
        };

        match (lookup(name), default) {
            (Some(val), _) => out.push_str(&val),
            (None, Some(default)) => out.push_str(default),
            (None, None) => bail!("Environment variable \"{}\" is not set", name),
        }

        rest = &expr[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
