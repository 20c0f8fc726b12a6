//! Built-in validators
//!
//! Every validator except `required` accepts an empty or null value, so optional
//! fields only need `required` when they must be present. Text validators reject
//! non-text input and numeric validators reject non-numeric input.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use crate::registry::Registry;
use crate::value::Value;
use anyhow::{anyhow, bail, ensure, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;

const SPECIAL_CHARACTERS: &str = "^$*.[]{}()?!\"@#%&/,><':;|_~`-";

pub(crate) fn register(registry: &mut Registry) {
    registry.register_validator("required", required);
    registry.register_validator("email", email);
    registry.register_validator("phone", phone);
    registry.register_validator("strongPassword", strong_password);
    registry.register_validator("date", date);
    registry.register_validator("time", time);
    registry.register_validator("datetime", datetime);
    registry.register_validator("url", web_address);
    registry.register_validator("ip", ip_address);
    registry.register_validator("minLength", min_length);
    registry.register_validator("maxLength", max_length);
    registry.register_validator("gt", |value: &Value, arg: &str| {
        compare(value, arg, |n, limit| n > limit, "greater than")
    });
    registry.register_validator("lt", |value: &Value, arg: &str| {
        compare(value, arg, |n, limit| n < limit, "less than")
    });
    registry.register_validator("gte", |value: &Value, arg: &str| {
        compare(value, arg, |n, limit| n >= limit, "greater than or equal to")
    });
    registry.register_validator("lte", |value: &Value, arg: &str| {
        compare(value, arg, |n, limit| n <= limit, "less than or equal to")
    });
    registry.register_validator("range", range);
    registry.register_validator("enum", one_of);
    registry.register_validator("boolean", boolean);
    registry.register_validator("contains", contains);
    registry.register_validator("notContains", not_contains);
    registry.register_validator("startsWith", starts_with);
    registry.register_validator("endsWith", ends_with);
}

/// Null, empty text, empty sequences and integer zero count as absent
fn is_empty_or_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(text) => text.is_empty(),
        Value::Seq(items) => items.is_empty(),
        Value::Int(n) => *n == 0,
        Value::UInt(n) => *n == 0,
        _ => false,
    }
}

fn text(value: &Value) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| anyhow!("failed to map the input to a string"))
}

fn number(value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| anyhow!("input must be a number"))
}

fn required(value: &Value, _: &str) -> Result<()> {
    match value {
        Value::Null => bail!("input is required and cannot be nil"),
        Value::Text(text) => ensure!(!text.trim().is_empty(), "input is required and cannot be empty"),
        Value::Seq(items) => ensure!(!items.is_empty(), "input is required and cannot be empty"),
        Value::Int(0) | Value::UInt(0) => bail!("input is required and cannot be zero"),
        Value::Float(n) if *n == 0.0 => bail!("input is required and cannot be zero"),
        Value::Bool(false) => bail!("input is required and cannot be false"),
        _ => {}
    }
    Ok(())
}

fn email(value: &Value, _: &str) -> Result<()> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    if is_empty_or_null(value) {
        return Ok(());
    }
    let pattern = EMAIL.get_or_init(|| {
        Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}$").expect("valid email pattern")
    });
    ensure!(pattern.is_match(text(value)?), "input is not a valid email address");
    Ok(())
}

fn phone(value: &Value, _: &str) -> Result<()> {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    if is_empty_or_null(value) {
        return Ok(());
    }
    let pattern = PHONE.get_or_init(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid phone pattern"));
    ensure!(
        pattern.is_match(text(value)?),
        "input is not a valid international phone number"
    );
    Ok(())
}

fn strong_password(value: &Value, _: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let password = text(value)?;
    ensure!(
        password.chars().count() >= 8,
        "password must be at least 8 characters long"
    );
    ensure!(
        password.chars().any(|ch| ch.is_ascii_uppercase()),
        "password must contain at least one uppercase letter"
    );
    ensure!(
        password.chars().any(|ch| ch.is_ascii_lowercase()),
        "password must contain at least one lowercase letter"
    );
    ensure!(
        password.chars().any(|ch| ch.is_ascii_digit()),
        "password must contain at least one digit"
    );
    ensure!(
        password.chars().any(|ch| SPECIAL_CHARACTERS.contains(ch)),
        "password must contain at least one special character"
    );
    Ok(())
}

fn date(value: &Value, _: &str) -> Result<()> {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    let shape = SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));
    ensure!(
        shape.is_match(input) && NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok(),
        "input is not a valid date, expected format YYYY-MM-DD"
    );
    Ok(())
}

fn time(value: &Value, _: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    let parsed = NaiveTime::parse_from_str(input, "%H:%M:%S").ok();
    // chrono admits a leap second as :60
    ensure!(
        input.len() == 8 && parsed.is_some_and(|at| at.nanosecond() < 1_000_000_000),
        "input is not a valid time, expected format HH:MM:SS"
    );
    Ok(())
}

fn datetime(value: &Value, _: &str) -> Result<()> {
    static ZONE: OnceLock<Regex> = OnceLock::new();
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    let zone = ZONE.get_or_init(|| {
        Regex::new(r"^(?:[A-Z]{3,5}|[+-]\d{2}:?\d{2})$").expect("valid zone pattern")
    });
    let valid = input
        .rsplit_once(' ')
        .filter(|(_, abbreviation)| zone.is_match(abbreviation))
        .and_then(|(local, _)| NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S").ok())
        .is_some_and(|at| at.nanosecond() < 1_000_000_000);
    ensure!(
        valid,
        "input is not a valid datetime with timezone, expected format YYYY-MM-DD HH:MM:SS MST"
    );
    Ok(())
}

fn web_address(value: &Value, _: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let parsed = url::Url::parse(text(value)?).ok();
    ensure!(
        parsed.is_some_and(|url| url.host_str().is_some_and(|host| !host.is_empty())),
        "input is not a valid URL"
    );
    Ok(())
}

fn ip_address(value: &Value, _: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    ensure!(
        text(value)?.parse::<IpAddr>().is_ok(),
        "input is not a valid IP address"
    );
    Ok(())
}

fn length_argument(arg: &str) -> Result<usize> {
    arg.trim()
        .parse()
        .map_err(|_| anyhow!("failed to convert length to integer"))
}

fn min_length(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    let minimum = length_argument(arg)?;
    ensure!(
        input.chars().count() >= minimum,
        "input does not meet the minimum length requirement, minimum length is {}",
        arg
    );
    Ok(())
}

fn max_length(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    let maximum = length_argument(arg)?;
    ensure!(
        input.chars().count() <= maximum,
        "input exceeds the maximum length requirement, maximum length is {}",
        arg
    );
    Ok(())
}

fn compare(value: &Value, arg: &str, holds: fn(f64, f64) -> bool, relation: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let n = number(value)?;
    let limit: f64 = arg
        .trim()
        .parse()
        .with_context(|| format!("failed to convert threshold '{}' to a number", arg))?;
    ensure!(holds(n, limit), "input must be {} {}", relation, arg);
    Ok(())
}

fn range(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let n = number(value)?;
    let Some((low, high)) = arg.split_once('-').filter(|(_, high)| !high.contains('-')) else {
        bail!("range format is incorrect, must be 'min-max'");
    };
    let min: f64 = low
        .trim()
        .parse()
        .map_err(|_| anyhow!("failed to parse minimum value: {}", low))?;
    let max: f64 = high
        .trim()
        .parse()
        .map_err(|_| anyhow!("failed to parse maximum value: {}", high))?;
    ensure!(min <= max, "minimum value must be less than maximum value");
    ensure!(
        (min..=max).contains(&n),
        "input must be between {} and {}",
        low,
        high
    );
    Ok(())
}

fn one_of(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?.trim();
    ensure!(
        arg.split('-').any(|allowed| allowed.trim() == input),
        "input must be one of the following values: {}",
        arg
    );
    Ok(())
}

fn boolean(value: &Value, _: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    ensure!(matches!(value, Value::Bool(_)), "input must be a boolean");
    Ok(())
}

fn contains(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    ensure!(
        arg.split(',').any(|needle| input.contains(needle.trim())),
        "input must contain one of the following values: {}",
        arg
    );
    Ok(())
}

fn not_contains(value: &Value, arg: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = text(value)?;
    if let Some(needle) = arg
        .split(',')
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .find(|needle| input.contains(needle))
    {
        bail!("input must not contain the following value: {}", needle);
    }
    Ok(())
}

fn starts_with(value: &Value, prefix: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = value.as_str().ok_or_else(|| anyhow!("input must be a string"))?;
    ensure!(input.starts_with(prefix), "input must start with '{}'", prefix);
    Ok(())
}

fn ends_with(value: &Value, suffix: &str) -> Result<()> {
    if is_empty_or_null(value) {
        return Ok(());
    }
    let input = value.as_str().ok_or_else(|| anyhow!("input must be a string"))?;
    ensure!(input.ends_with(suffix), "input must end with '{}'", suffix);
    Ok(())
}
