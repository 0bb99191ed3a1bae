use crate::value::{ArgType, OptionValue, Value};

/// Type-erased callback receiving a converted value.
pub(crate) type Sink = Box<dyn Fn(Value) + Send + Sync + 'static>;

/// Whether a converted value maps back to the registered Rust type.
fn accepts<T: OptionValue>(value: &Value) -> bool {
    T::from_value(value.clone()).is_some()
}

/// Typed option description handed to [`crate::Parser::register`].
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use argwise::{Opt, Parser};
///
/// let seen = Arc::new(Mutex::new(None));
/// let store = seen.clone();
///
/// let mut parser = Parser::new();
/// parser
///     .register(Opt::<i64>::new().short('l').long("limit").callback(move |v| {
///         *store.lock().unwrap() = Some(v);
///     }))
///     .unwrap();
///
/// let result = parser.parse(["--limit=2147483649"]);
/// assert!(!result.has_errors());
/// assert_eq!(*seen.lock().unwrap(), Some(2147483649));
/// ```
pub struct Opt<T: OptionValue> {
    short_name: Option<char>,
    long_name: Option<String>,
    required: bool,
    default_value: Option<T>,
    callback: Option<Box<dyn Fn(T) + Send + Sync + 'static>>,
}

impl<T: OptionValue> Opt<T> {
    pub fn new() -> Self {
        Opt {
            short_name: None,
            long_name: None,
            required: false,
            default_value: None,
            callback: None,
        }
    }

    pub fn short(mut self, c: char) -> Self {
        self.short_name = Some(c);
        self
    }

    pub fn long(mut self, name: &str) -> Self {
        self.long_name = Some(name.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value passed to the callback when the option does not appear.
    pub fn default_value(mut self, v: T) -> Self {
        self.default_value = Some(v);
        self
    }

    pub fn callback<F>(mut self, func: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(func));
        self
    }

    pub(crate) fn into_def(self) -> OptionDef {
        let sink = self.callback.map(|func| -> Sink {
            Box::new(move |value| {
                if let Some(typed) = T::from_value(value) {
                    func(typed)
                }
            })
        });

        OptionDef {
            short_name: self.short_name,
            long_name: self.long_name,
            arg_type: T::arg_type(),
            required: self.required,
            default_value: self.default_value.map(OptionValue::into_value),
            accepts: accepts::<T>,
            sink,
        }
    }
}

impl<T: OptionValue> Default for Opt<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered option, immutable after registration.
pub(crate) struct OptionDef {
    pub short_name: Option<char>,
    pub long_name: Option<String>,
    pub arg_type: ArgType,
    pub required: bool,
    pub default_value: Option<Value>,
    /// Rejects values the typed callback could not receive, such as a bit
    /// combination an `ArgEnum::from_raw` refuses.
    pub accepts: fn(&Value) -> bool,
    pub sink: Option<Sink>,
}

impl OptionDef {
    pub fn invoke(&self, value: Value) {
        if let Some(sink) = &self.sink {
            sink(value);
        }
    }
}

impl std::fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDef")
            .field("short_name", &self.short_name)
            .field("long_name", &self.long_name)
            .field("arg_type", &self.arg_type)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("has_callback", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn def_carries_type_and_default() {
        let def = Opt::<i32>::new().short('i').default_value(7).into_def();
        assert_eq!(def.arg_type, ArgType::Int);
        assert_eq!(def.default_value, Some(Value::Int(7)));
        assert!(!def.required);
        assert!(def.sink.is_none());
    }

    #[test]
    fn sink_forwards_typed_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = seen.clone();
        let def = Opt::<String>::new()
            .long("name")
            .callback(move |s| store.lock().unwrap().push(s))
            .into_def();

        def.invoke(Value::Str("first".to_string()));
        // Mismatched values never reach the typed callback.
        def.invoke(Value::Int(3));
        assert_eq!(*seen.lock().unwrap(), vec!["first".to_string()]);
    }

    #[test]
    fn accepts_checks_the_registered_type() {
        let def = Opt::<Vec<i32>>::new().short('n').into_def();
        assert!((def.accepts)(&Value::List(vec![Value::Int(1)])));
        assert!(!(def.accepts)(&Value::List(vec![Value::Long(1)])));
        assert!(!(def.accepts)(&Value::Int(1)));
    }
}
