// ============================================================================
// ArgType — semantic type tag of a registered option
// ============================================================================

/// The closed set of conversions an option can request.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    Bool,
    Int,
    Long,
    Double,
    String,
    Enum(EnumInfo),
    List(Box<ArgType>),
}

impl ArgType {
    pub fn is_list(&self) -> bool {
        matches!(self, ArgType::List(_))
    }

    /// Name used in conversion error messages.
    pub fn describe(&self) -> String {
        match self {
            ArgType::Bool => "boolean".to_string(),
            ArgType::Int => "32-bit integer".to_string(),
            ArgType::Long => "64-bit integer".to_string(),
            ArgType::Double => "floating point number".to_string(),
            ArgType::String => "string".to_string(),
            ArgType::Enum(info) if info.flags => format!("combination of {}", info.type_name),
            ArgType::Enum(info) => info.type_name.to_string(),
            ArgType::List(element) => format!("list of {}", element.describe()),
        }
    }
}

/// Member table of an enumerated option type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub type_name: &'static str,
    pub members: &'static [(&'static str, i64)],
    /// Members are independent bits that may be OR-ed together.
    pub flags: bool,
}

impl EnumInfo {
    pub fn of<E: ArgEnum>() -> Self {
        EnumInfo {
            type_name: short_type_name(std::any::type_name::<E>()),
            members: E::MEMBERS,
            flags: E::FLAGS,
        }
    }

    pub(crate) fn all_bits(&self) -> i64 {
        self.members.iter().fold(0, |acc, (_, v)| acc | v)
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

// ============================================================================
// Value — converted option value
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
    Enum(i64),
    List(Vec<Value>),
}

// ============================================================================
// OptionValue — mapping between Rust types and ArgType/Value
// ============================================================================

/// A Rust type an option can be registered as.
pub trait OptionValue: Sized + Send + Sync + 'static {
    fn arg_type() -> ArgType;
    fn from_value(value: Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

impl OptionValue for bool {
    fn arg_type() -> ArgType {
        ArgType::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl OptionValue for i32 {
    fn arg_type() -> ArgType {
        ArgType::Int
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl OptionValue for i64 {
    fn arg_type() -> ArgType {
        ArgType::Long
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Long(n) => Some(n),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Long(self)
    }
}

impl OptionValue for f64 {
    fn arg_type() -> ArgType {
        ArgType::Double
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl OptionValue for String {
    fn arg_type() -> ArgType {
        ArgType::String
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

macro_rules! list_option_value {
    ($($element:ty),*) => {
        $(
            impl OptionValue for Vec<$element> {
                fn arg_type() -> ArgType {
                    ArgType::List(Box::new(<$element>::arg_type()))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::List(items) => items.into_iter().map(<$element>::from_value).collect(),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::List(self.into_iter().map(OptionValue::into_value).collect())
                }
            }
        )*
    };
}

list_option_value!(String, i32, i64, f64);

// ============================================================================
// ArgEnum — enumerated and bit-flag option types
// ============================================================================

/// An enumerated option type.
///
/// Members are matched by name (case-insensitively) or by their underlying
/// value written as a number. With `FLAGS = true` an option value may name
/// several members, and the result is the bitwise OR of their values, so
/// `from_raw` must accept any combination of member bits.
///
/// ```
/// use argwise::ArgEnum;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Level { Low = 1, High = 2 }
///
/// impl ArgEnum for Level {
///     const MEMBERS: &'static [(&'static str, i64)] = &[("Low", 1), ("High", 2)];
///
///     fn from_raw(raw: i64) -> Option<Self> {
///         match raw {
///             1 => Some(Level::Low),
///             2 => Some(Level::High),
///             _ => None,
///         }
///     }
///
///     fn to_raw(&self) -> i64 {
///         *self as i64
///     }
/// }
/// ```
pub trait ArgEnum: Sized + Send + Sync + 'static {
    const MEMBERS: &'static [(&'static str, i64)];
    const FLAGS: bool = false;

    fn from_raw(raw: i64) -> Option<Self>;
    fn to_raw(&self) -> i64;
}

impl<E: ArgEnum> OptionValue for E {
    fn arg_type() -> ArgType {
        ArgType::Enum(EnumInfo::of::<E>())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Enum(raw) => E::from_raw(raw),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Enum(self.to_raw())
    }
}
