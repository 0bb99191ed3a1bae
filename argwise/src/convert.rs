//! Raw text to typed [`Value`] conversion.
//!
//! Conversion never panics and never reaches past this module with anything
//! but a [`ConvertError`]; the dispatcher turns those into parse errors.

use crate::engine::{ParsedOption, Suffix};
use crate::result::ErrorKind;
use crate::value::{ArgType, EnumInfo, Value};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConvertError {
    pub kind: ErrorKind,
    pub reason: String,
}

impl ConvertError {
    fn missing(arg_type: &ArgType) -> Self {
        ConvertError {
            kind: ErrorKind::ExpectedOptionValue,
            reason: format!("expected a {} value", arg_type.describe()),
        }
    }

    pub(crate) fn invalid(reason: String) -> Self {
        ConvertError {
            kind: ErrorKind::OptionValueConversionFailed,
            reason,
        }
    }
}

/// Strip one pair of matching surrounding quotes.
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Convert one parsed occurrence to the option's type.
pub(crate) fn convert(arg_type: &ArgType, parsed: &ParsedOption) -> Result<Value, ConvertError> {
    match arg_type {
        ArgType::Bool => convert_bool(parsed),
        ArgType::List(element) => {
            reject_suffix(arg_type, parsed)?;
            if parsed.values.is_empty() {
                return Err(ConvertError::missing(arg_type));
            }
            convert_list(element, &parsed.values)
        }
        ArgType::Enum(info) if info.flags => {
            reject_suffix(arg_type, parsed)?;
            if parsed.values.is_empty() {
                return Err(ConvertError::missing(arg_type));
            }
            parse_flags(info, &parsed.values).map(Value::Enum)
        }
        _ => {
            reject_suffix(arg_type, parsed)?;
            let raw = parsed
                .value
                .as_deref()
                .ok_or_else(|| ConvertError::missing(arg_type))?;
            convert_text(arg_type, raw)
        }
    }
}

fn reject_suffix(arg_type: &ArgType, parsed: &ParsedOption) -> Result<(), ConvertError> {
    match parsed.suffix {
        Some(suffix) => Err(ConvertError::invalid(format!(
            "suffix '{}' only applies to boolean options, not {}",
            suffix.as_char(),
            arg_type.describe()
        ))),
        None => Ok(()),
    }
}

fn convert_bool(parsed: &ParsedOption) -> Result<Value, ConvertError> {
    match (parsed.suffix, parsed.value.as_deref()) {
        (None, None) => Ok(Value::Bool(true)),
        (Some(Suffix::Plus), None) => Ok(Value::Bool(true)),
        (Some(Suffix::Minus), None) => Ok(Value::Bool(false)),
        (Some(suffix), Some(raw)) => Err(ConvertError::invalid(format!(
            "conflicting boolean suffix '{}' and value {:?}",
            suffix.as_char(),
            raw
        ))),
        (None, Some(raw)) => parse_bool(raw).map(Value::Bool),
    }
}

fn parse_bool(raw: &str) -> Result<bool, ConvertError> {
    let text = unquote(raw).trim();
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("on") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("off") {
        Ok(false)
    } else {
        Err(ConvertError::invalid(format!(
            "{:?} is not a boolean (expected true, false, on or off)",
            raw
        )))
    }
}

/// Convert a single textual value. Also used for list elements.
fn convert_text(arg_type: &ArgType, raw: &str) -> Result<Value, ConvertError> {
    match arg_type {
        ArgType::Bool => parse_bool(raw).map(Value::Bool),
        ArgType::String => Ok(Value::Str(unquote(raw).to_string())),
        ArgType::Int => parse_number::<i32>(arg_type, raw).map(Value::Int),
        ArgType::Long => parse_number::<i64>(arg_type, raw).map(Value::Long),
        ArgType::Double => parse_number::<f64>(arg_type, raw).map(Value::Double),
        ArgType::Enum(info) if info.flags => {
            parse_flags(info, &[raw.to_string()]).map(Value::Enum)
        }
        ArgType::Enum(info) => parse_member(info, unquote(raw).trim()).map(Value::Enum),
        ArgType::List(element) => convert_list(element, &[raw.to_string()]),
    }
}

fn parse_number<N: std::str::FromStr>(arg_type: &ArgType, raw: &str) -> Result<N, ConvertError> {
    unquote(raw).trim().parse::<N>().map_err(|_| {
        ConvertError::invalid(format!(
            "{:?} is not a valid {}",
            raw,
            arg_type.describe()
        ))
    })
}

/// Match one member by name or by its underlying value.
fn parse_member(info: &EnumInfo, text: &str) -> Result<i64, ConvertError> {
    if let Some((_, v)) = info
        .members
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
    {
        return Ok(*v);
    }

    if let Ok(n) = text.parse::<i64>() {
        if info.flags {
            if n & !info.all_bits() == 0 {
                return Ok(n);
            }
        } else if info.members.iter().any(|(_, v)| *v == n) {
            return Ok(n);
        }
    }

    Err(ConvertError::invalid(format!(
        "{:?} is not a member of {}",
        text, info.type_name
    )))
}

/// OR together every member named by the value tokens. Each token is
/// unquoted on its own before splitting on whitespace, `,` or `|`.
fn parse_flags(info: &EnumInfo, values: &[String]) -> Result<i64, ConvertError> {
    let mut bits = 0;
    let mut seen = false;
    for part in values
        .iter()
        .flat_map(|value| unquote(value).split(|c: char| c.is_whitespace() || c == ',' || c == '|'))
        .filter(|p| !p.is_empty())
    {
        bits |= parse_member(info, unquote(part))?;
        seen = true;
    }
    if !seen {
        return Err(ConvertError::invalid(format!(
            "{:?} names no member of {}",
            values.join(" "),
            info.type_name
        )));
    }
    Ok(bits)
}

/// Quoted tokens are one item each; bare tokens split on whitespace.
fn list_items(values: &[String]) -> Vec<&str> {
    let mut items = Vec::new();
    for value in values {
        let inner = unquote(value);
        if inner.len() != value.len() {
            items.push(inner);
        } else {
            items.extend(value.split_whitespace());
        }
    }
    items
}

fn convert_list(element: &ArgType, values: &[String]) -> Result<Value, ConvertError> {
    list_items(values)
        .into_iter()
        .map(|item| convert_text(element, item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}
