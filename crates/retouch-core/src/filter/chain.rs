//! Effect-chain grammar.
//!
//! Parses the subset of the CSS `<filter-function-list>` that the preview
//! can show, so the export compositor can replay exactly what the live
//! style computed. Invalid input is rejected as a whole, the way a browser
//! drops an unparsable `filter` declaration.

use thiserror::Error;

/// Errors produced while parsing an effect chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterParseError {
    /// Text that is not a `name(argument)` function.
    #[error("Malformed filter list near '{0}'")]
    Malformed(String),

    /// Opening parenthesis without a matching close.
    #[error("Unterminated filter function '{0}'")]
    Unterminated(String),

    /// A function name outside the supported set.
    #[error("Unknown filter function '{0}'")]
    UnknownFunction(String),

    /// The argument does not fit the function's value type.
    #[error("Invalid argument '{argument}' for {function}()")]
    InvalidArgument { function: String, argument: String },
}

/// One parsed filter function with its magnitude in canonical units.
///
/// Amounts are plain factors (`120%` is `1.2`), angles are degrees and
/// blur radii are CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterFunction {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
    Opacity(f32),
    HueRotate(f32),
    Blur(f32),
}

impl FilterFunction {
    /// True when the function leaves every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        match *self {
            FilterFunction::Brightness(v)
            | FilterFunction::Contrast(v)
            | FilterFunction::Saturate(v) => v == 1.0,
            FilterFunction::Opacity(v) => v >= 1.0,
            FilterFunction::Grayscale(v) | FilterFunction::Sepia(v) | FilterFunction::Invert(v) => {
                v <= 0.0
            }
            FilterFunction::HueRotate(deg) => deg % 360.0 == 0.0,
            FilterFunction::Blur(px) => px == 0.0,
        }
    }
}

/// Parse an effect chain such as `"brightness(120%) contrast(80%)"`.
///
/// `""` and `"none"` both mean "no filter" and yield an empty list.
pub fn parse_effect_chain(input: &str) -> Result<Vec<FilterFunction>, FilterParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let mut functions = Vec::new();
    let mut rest = trimmed;

    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| FilterParseError::Malformed(rest.to_string()))?;
        let name = &rest[..open];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return Err(FilterParseError::Malformed(rest.to_string()));
        }

        let close = rest[open..]
            .find(')')
            .map(|offset| open + offset)
            .ok_or_else(|| FilterParseError::Unterminated(name.to_string()))?;

        functions.push(parse_function(name, rest[open + 1..close].trim())?);
        rest = rest[close + 1..].trim_start();
    }

    Ok(functions)
}

fn parse_function(name: &str, argument: &str) -> Result<FilterFunction, FilterParseError> {
    let lower = name.to_ascii_lowercase();
    let function = match lower.as_str() {
        "brightness" => FilterFunction::Brightness(parse_amount(name, argument)?),
        "contrast" => FilterFunction::Contrast(parse_amount(name, argument)?),
        "saturate" => FilterFunction::Saturate(parse_amount(name, argument)?),
        "grayscale" => FilterFunction::Grayscale(parse_amount(name, argument)?),
        "sepia" => FilterFunction::Sepia(parse_amount(name, argument)?),
        "invert" => FilterFunction::Invert(parse_amount(name, argument)?),
        "opacity" => FilterFunction::Opacity(parse_amount(name, argument)?),
        "hue-rotate" => FilterFunction::HueRotate(parse_angle(name, argument)?),
        "blur" => FilterFunction::Blur(parse_length(name, argument)?),
        _ => return Err(FilterParseError::UnknownFunction(name.to_string())),
    };
    Ok(function)
}

fn invalid(function: &str, argument: &str) -> FilterParseError {
    FilterParseError::InvalidArgument {
        function: function.to_string(),
        argument: argument.to_string(),
    }
}

/// Split `"120%"` into `("120", "%")` and `"90deg"` into `("90", "deg")`.
fn split_unit(argument: &str) -> (&str, &str) {
    if let Some(number) = argument.strip_suffix('%') {
        return (number, "%");
    }
    let number = argument.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    (number, &argument[number.len()..])
}

fn parse_number(function: &str, argument: &str, number: &str) -> Result<f32, FilterParseError> {
    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(function, argument))
}

/// `<number> | <percentage>`, non-negative, defaulting to 1.
fn parse_amount(function: &str, argument: &str) -> Result<f32, FilterParseError> {
    if argument.is_empty() {
        return Ok(1.0);
    }
    let (number, unit) = split_unit(argument);
    let value = parse_number(function, argument, number)?;
    let amount = match unit {
        "" => value,
        "%" => value / 100.0,
        _ => return Err(invalid(function, argument)),
    };
    if amount < 0.0 {
        return Err(invalid(function, argument));
    }
    Ok(amount)
}

/// `<angle>` in degrees, defaulting to 0. Unitless only for zero.
fn parse_angle(function: &str, argument: &str) -> Result<f32, FilterParseError> {
    if argument.is_empty() {
        return Ok(0.0);
    }
    let (number, unit) = split_unit(argument);
    let value = parse_number(function, argument, number)?;
    match unit.to_ascii_lowercase().as_str() {
        "deg" => Ok(value),
        "rad" => Ok(value.to_degrees()),
        "grad" => Ok(value * 360.0 / 400.0),
        "turn" => Ok(value * 360.0),
        "" if value == 0.0 => Ok(0.0),
        _ => Err(invalid(function, argument)),
    }
}

/// Non-negative `<length>` in px, defaulting to 0. Unitless only for zero.
fn parse_length(function: &str, argument: &str) -> Result<f32, FilterParseError> {
    if argument.is_empty() {
        return Ok(0.0);
    }
    let (number, unit) = split_unit(argument);
    let value = parse_number(function, argument, number)?;
    let px = match unit.to_ascii_lowercase().as_str() {
        "px" => value,
        "" if value == 0.0 => 0.0,
        _ => return Err(invalid(function, argument)),
    };
    if px < 0.0 {
        return Err(invalid(function, argument));
    }
    Ok(px)
}
