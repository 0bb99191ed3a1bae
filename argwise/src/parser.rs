//! Option registry and dispatcher.
//!
//! A parse runs in three passes over the tokenizer output:
//! 1. match each occurrence to a registered option and convert its value,
//! 2. check required options,
//! 3. invoke callbacks for options that ended without an error, in order of
//!    first appearance, then defaults for options that never appeared.

use tracing::{debug, trace};

use crate::argv::split_command_line;
use crate::convert::{convert, ConvertError};
use crate::engine::{tokenize, ParsedOption};
use crate::error::{Error, Result};
use crate::opt::{Opt, OptionDef};
use crate::result::{ErrorKind, OptionKey, ParseError, ParseResult};
use crate::value::{OptionValue, Value};

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSettings {
    /// Compare short and long names case-sensitively. Enum member names
    /// are matched case-insensitively regardless.
    pub case_sensitive: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        ParserSettings {
            case_sensitive: true,
        }
    }
}

/// Returned by [`Parser::register`]; identifies one registered option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionHandle(usize);

/// Per-option state during one parse.
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Unseen,
    Converted(Value),
    ConversionFailed,
    Duplicate,
}

/// Characters the tokenizer gives meaning to; none may appear in a name.
const RESERVED: &[char] = &[':', '=', '"', '\''];

#[derive(Debug, Default)]
pub struct Parser {
    settings: ParserSettings,
    options: Vec<OptionDef>,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_settings(ParserSettings::default())
    }

    pub fn with_settings(settings: ParserSettings) -> Self {
        Parser {
            settings,
            options: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Register an option. Conflicting or malformed names are a caller
    /// error and fail immediately.
    pub fn register<T: OptionValue>(&mut self, opt: Opt<T>) -> Result<OptionHandle> {
        let def = opt.into_def();
        self.validate(&def)?;
        debug!(
            short = ?def.short_name,
            long = ?def.long_name,
            arg_type = %def.arg_type.describe(),
            required = def.required,
            "registered option"
        );
        self.options.push(def);
        Ok(OptionHandle(self.options.len() - 1))
    }

    /// Names of a registered option.
    pub fn option_key(&self, handle: OptionHandle) -> Option<OptionKey> {
        self.options.get(handle.0).map(key_of)
    }

    fn validate(&self, def: &OptionDef) -> Result<()> {
        if def.short_name.is_none() && def.long_name.is_none() {
            return Err(Error::Unnamed);
        }

        if let Some(c) = def.short_name {
            if c.is_whitespace() || RESERVED.contains(&c) || matches!(c, '+' | '-' | '/') {
                return Err(Error::InvalidShortName(c));
            }
            let taken = self.options.iter().filter_map(|o| o.short_name).any(|other| {
                self.names_equal(&other.to_string(), &c.to_string())
            });
            if taken {
                return Err(Error::DuplicateShortName(c));
            }
        }

        if let Some(name) = &def.long_name {
            let valid = name.chars().count() >= 2
                && !name.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c))
                && !name.starts_with(['-', '/'])
                && !name.ends_with(['+', '-']);
            if !valid {
                return Err(Error::InvalidLongName(name.clone()));
            }
            let taken = self
                .options
                .iter()
                .filter_map(|o| o.long_name.as_deref())
                .any(|other| self.names_equal(other, name));
            if taken {
                return Err(Error::DuplicateLongName(name.clone()));
            }
        }

        Ok(())
    }

    fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.settings.case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    /// Single-character keys match short names, longer keys long names.
    fn find(&self, key: &str) -> Option<usize> {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.options.iter().position(|o| {
                o.short_name
                    .is_some_and(|s| self.names_equal(&s.to_string(), &c.to_string()))
            }),
            _ => self.options.iter().position(|o| {
                o.long_name
                    .as_deref()
                    .is_some_and(|name| self.names_equal(name, key))
            }),
        }
    }

    /// Parse the current process arguments, skipping the program name.
    pub fn parse_env(&self) -> ParseResult {
        self.parse(std::env::args().skip(1))
    }

    /// Split `line` like a shell would (keeping quotes) and parse it.
    pub fn parse_line(&self, line: &str) -> Result<ParseResult> {
        Ok(self.parse(split_command_line(line)?))
    }

    /// Parse an argument list. Never fails: every problem is recorded in
    /// the returned result.
    pub fn parse<I, S>(&self, args: I) -> ParseResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let tokens = tokenize(&args);

        let mut bindings = vec![Binding::Unseen; self.options.len()];
        let mut order: Vec<usize> = Vec::new();
        let mut errors: Vec<ParseError> = Vec::new();

        for parsed in &tokens.parsed_options {
            let idx = match self.find(&parsed.key) {
                Some(idx) => idx,
                None => {
                    errors.push(ParseError::new(
                        ErrorKind::UnexpectedOption,
                        parsed.display_key(),
                        parsed.value.clone(),
                        format!("bad argument {}: unknown option", parsed.display_key()),
                    ));
                    continue;
                }
            };
            self.bind(idx, parsed, &mut bindings[idx], &mut order, &mut errors);
        }

        let mut unmatched = Vec::new();
        for (def, binding) in self.options.iter().zip(&bindings) {
            if *binding == Binding::Unseen {
                unmatched.push(key_of(def));
            }
            if def.required && matches!(binding, Binding::Unseen | Binding::ConversionFailed) {
                let key = key_of(def);
                errors.push(ParseError::new(
                    ErrorKind::RequiredOptionMissing,
                    key.to_string(),
                    None,
                    format!("missing required option {}", key),
                ));
            }
        }

        for &idx in &order {
            if let Binding::Converted(value) = &bindings[idx] {
                trace!(option = %key_of(&self.options[idx]), value = ?value, "invoking callback");
                self.options[idx].invoke(value.clone());
            }
        }
        for (def, binding) in self.options.iter().zip(&bindings) {
            if *binding != Binding::Unseen || def.required {
                continue;
            }
            if let Some(default) = &def.default_value {
                trace!(option = %key_of(def), value = ?default, "invoking callback with default");
                def.invoke(default.clone());
            }
        }

        for error in &errors {
            debug!(kind = ?error.kind, option = %error.option, "{}", error.message);
        }
        debug!(
            options = tokens.parsed_options.len(),
            additional = tokens.additional_values.len(),
            errors = errors.len(),
            "parsed arguments"
        );

        ParseResult::new(
            tokens.parsed_options,
            tokens.additional_values,
            errors,
            unmatched,
        )
    }

    /// Advance one option's state for one occurrence.
    fn bind(
        &self,
        idx: usize,
        parsed: &ParsedOption,
        binding: &mut Binding,
        order: &mut Vec<usize>,
        errors: &mut Vec<ParseError>,
    ) {
        let def = &self.options[idx];

        match binding {
            Binding::Unseen => {
                order.push(idx);
                match convert_for(def, parsed) {
                    Ok(value) => *binding = Binding::Converted(value),
                    Err(e) => {
                        errors.push(ParseError::new(
                            e.kind,
                            parsed.display_key(),
                            parsed.value.clone(),
                            format!("bad argument {}: {}", parsed.display_key(), e.reason),
                        ));
                        *binding = Binding::ConversionFailed;
                    }
                }
            }
            // Repeated list options accumulate their items.
            Binding::Converted(Value::List(items)) if def.arg_type.is_list() => {
                match convert_for(def, parsed) {
                    Ok(Value::List(more)) => items.extend(more),
                    Ok(_) => {}
                    Err(e) => {
                        errors.push(ParseError::new(
                            e.kind,
                            parsed.display_key(),
                            parsed.value.clone(),
                            format!("bad argument {}: {}", parsed.display_key(), e.reason),
                        ));
                        *binding = Binding::ConversionFailed;
                    }
                }
            }
            _ => {
                errors.push(ParseError::new(
                    ErrorKind::DuplicateOption,
                    parsed.display_key(),
                    parsed.value.clone(),
                    format!(
                        "bad argument {}: option {} given more than once",
                        parsed.display_key(),
                        key_of(def)
                    ),
                ));
                if *binding != Binding::ConversionFailed {
                    *binding = Binding::Duplicate;
                }
            }
        }
    }
}

/// Convert an occurrence and check the result against the registered type.
fn convert_for(def: &OptionDef, parsed: &ParsedOption) -> std::result::Result<Value, ConvertError> {
    let value = convert(&def.arg_type, parsed)?;
    if (def.accepts)(&value) {
        Ok(value)
    } else {
        Err(ConvertError::invalid(format!(
            "{:?} is not a valid {}",
            parsed.value.as_deref().unwrap_or_default(),
            def.arg_type.describe()
        )))
    }
}

fn key_of(def: &OptionDef) -> OptionKey {
    OptionKey {
        short: def.short_name,
        long: def.long_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArgEnum;
    use std::sync::{Arc, Mutex};

    /// Flags type that only admits single members, not combinations.
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Access(i64);

    impl ArgEnum for Access {
        const MEMBERS: &'static [(&'static str, i64)] = &[("Read", 1), ("Write", 2)];
        const FLAGS: bool = true;

        fn from_raw(raw: i64) -> Option<Self> {
            matches!(raw, 1 | 2).then_some(Access(raw))
        }

        fn to_raw(&self) -> i64 {
            self.0
        }
    }

    /// Records every value a callback receives.
    fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = seen.clone();
        (seen, move |v| store.lock().unwrap().push(v))
    }

    // -- registration --

    #[test]
    fn register_requires_a_name() {
        let mut parser = Parser::new();
        assert_eq!(parser.register(Opt::<bool>::new()), Err(Error::Unnamed));
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut parser = Parser::new();
        parser.register(Opt::<bool>::new().short('v').long("verbose")).unwrap();
        assert_eq!(
            parser.register(Opt::<bool>::new().short('v')),
            Err(Error::DuplicateShortName('v'))
        );
        assert_eq!(
            parser.register(Opt::<bool>::new().long("verbose")),
            Err(Error::DuplicateLongName("verbose".to_string()))
        );
        // Differing case is a different name when case-sensitive.
        assert!(parser.register(Opt::<bool>::new().short('V')).is_ok());
    }

    #[test]
    fn register_rejects_duplicates_ignoring_case_when_configured() {
        let mut parser = Parser::with_settings(ParserSettings {
            case_sensitive: false,
        });
        parser.register(Opt::<bool>::new().short('v').long("verbose")).unwrap();
        assert_eq!(
            parser.register(Opt::<bool>::new().short('V')),
            Err(Error::DuplicateShortName('V'))
        );
        assert_eq!(
            parser.register(Opt::<bool>::new().long("VERBOSE")),
            Err(Error::DuplicateLongName("VERBOSE".to_string()))
        );
    }

    #[test]
    fn register_rejects_reserved_names() {
        let mut parser = Parser::new();
        for c in [' ', ':', '=', '+', '-', '/', '"'] {
            assert_eq!(
                parser.register(Opt::<bool>::new().short(c)),
                Err(Error::InvalidShortName(c)),
                "{:?}",
                c
            );
        }
        for name in ["x", "has space", "key=value", "-dash", "/slash", "plus+", "minus-"] {
            assert_eq!(
                parser.register(Opt::<bool>::new().long(name)),
                Err(Error::InvalidLongName(name.to_string())),
                "{}",
                name
            );
        }
        assert!(parser.register(Opt::<bool>::new().long("dry-run")).is_ok());
    }

    #[test]
    fn option_key_reports_names() {
        let mut parser = Parser::new();
        let handle = parser.register(Opt::<bool>::new().short('b').long("bold")).unwrap();
        assert_eq!(
            parser.option_key(handle),
            Some(OptionKey {
                short: Some('b'),
                long: Some("bold".to_string()),
            })
        );
    }

    // -- matching --

    #[test]
    fn short_and_long_aliases_reach_same_option() {
        let (seen, cb) = recorder::<String>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<String>::new().short('f').long("fruit").callback(cb))
            .unwrap();

        for args in [["-f", "apple"], ["--fruit", "apple"], ["/fruit", "apple"], ["/f", "apple"]] {
            let result = parser.parse(args);
            assert!(!result.has_errors(), "{:?}", args);
        }
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn keys_are_case_sensitive_by_default() {
        let mut parser = Parser::new();
        parser.register(Opt::<bool>::new().short('b').long("bold")).unwrap();
        assert!(parser.settings().case_sensitive);
        let result = parser.parse(["-B", "--BOLD"]);
        assert_eq!(result.errors_of(ErrorKind::UnexpectedOption).count(), 2);
    }

    #[test]
    fn keys_ignore_case_when_configured() {
        let (seen, cb) = recorder::<bool>();
        let mut parser = Parser::with_settings(ParserSettings {
            case_sensitive: false,
        });
        assert_eq!(
            parser.settings(),
            &ParserSettings {
                case_sensitive: false
            }
        );
        parser
            .register(Opt::<bool>::new().long("bold").callback(cb))
            .unwrap();
        let result = parser.parse(["--BOLD"]);
        assert!(!result.has_errors());
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    #[test]
    fn unknown_key_is_an_error_not_a_value() {
        let mut parser = Parser::new();
        parser.register(Opt::<bool>::new().short('b')).unwrap();
        let result = parser.parse(["-z"]);
        assert!(result.has_errors());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::UnexpectedOption);
        assert_eq!(result.errors()[0].option, "-z");
        assert!(result.additional_values().is_empty());
        assert_eq!(result.parsed_options().len(), 1);
    }

    // -- state machine --

    #[test]
    fn conversion_failure_suppresses_callback() {
        let (seen, cb) = recorder::<i32>();
        let mut parser = Parser::new();
        parser.register(Opt::<i32>::new().short('i').callback(cb)).unwrap();
        let result = parser.parse(["-i", "abc"]);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::OptionValueConversionFailed);
        assert_eq!(result.errors()[0].raw_value.as_deref(), Some("abc"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_value_is_reported() {
        let mut parser = Parser::new();
        parser.register(Opt::<String>::new().short('s')).unwrap();
        let result = parser.parse(["-s"]);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::ExpectedOptionValue);
    }

    #[test]
    fn required_option_missing_once() {
        let mut parser = Parser::new();
        parser
            .register(Opt::<String>::new().short('n').long("name").required())
            .unwrap();
        parser.register(Opt::<bool>::new().short('v')).unwrap();
        let result = parser.parse(["-v"]);
        assert!(result.has_errors());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::RequiredOptionMissing);
        assert_eq!(result.errors()[0].option, "-n/--name");
    }

    #[test]
    fn required_option_with_bad_value_is_also_missing() {
        let mut parser = Parser::new();
        parser.register(Opt::<i32>::new().short('i').required()).unwrap();
        let result = parser.parse(["-i", "x"]);
        let kinds: Vec<ErrorKind> = result.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::OptionValueConversionFailed,
                ErrorKind::RequiredOptionMissing
            ]
        );
    }

    #[test]
    fn value_refused_by_type_is_conversion_failure() {
        let (seen, cb) = recorder::<Access>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<Access>::new().short('p').required().callback(cb))
            .unwrap();

        let result = parser.parse(["-p", "Read", "Write"]);
        let kinds: Vec<ErrorKind> = result.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::OptionValueConversionFailed,
                ErrorKind::RequiredOptionMissing
            ]
        );
        assert_eq!(result.errors()[0].option, "-p");
        assert_eq!(result.errors()[0].raw_value.as_deref(), Some("Read Write"));
        assert!(seen.lock().unwrap().is_empty());

        let result = parser.parse(["-p", "Write"]);
        assert!(!result.has_errors(), "{:?}", result.errors());
        assert_eq!(*seen.lock().unwrap(), vec![Access(2)]);
    }

    #[test]
    fn duplicate_option_suppresses_callback() {
        let (seen, cb) = recorder::<String>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<String>::new().short('f').long("fruit").callback(cb))
            .unwrap();
        let result = parser.parse(["-f", "apple", "--fruit", "pear"]);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::DuplicateOption);
        assert_eq!(result.errors()[0].option, "--fruit");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn repeated_list_option_accumulates() {
        let (seen, cb) = recorder::<Vec<i32>>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<Vec<i32>>::new().short('n').callback(cb))
            .unwrap();
        let result = parser.parse(["-n", "1", "2", "-n:3"]);
        assert!(!result.has_errors());
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn callbacks_fire_in_input_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut parser = Parser::new();
        for c in ['a', 'b', 'c'] {
            let order = order.clone();
            parser
                .register(Opt::<bool>::new().short(c).callback(move |_| order.lock().unwrap().push(c)))
                .unwrap();
        }
        let result = parser.parse(["-c", "-a", "-b"]);
        assert!(!result.has_errors());
        assert_eq!(*order.lock().unwrap(), vec!['c', 'a', 'b']);
    }

    #[test]
    fn good_options_fire_despite_other_errors() {
        let (seen, cb) = recorder::<bool>();
        let mut parser = Parser::new();
        parser.register(Opt::<bool>::new().short('v').callback(cb)).unwrap();
        let result = parser.parse(["-v", "-z"]);
        assert!(result.has_errors());
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    // -- defaults --

    #[test]
    fn default_is_bound_when_absent() {
        let (seen, cb) = recorder::<i32>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<i32>::new().short('i').default_value(42).callback(cb))
            .unwrap();

        let result = parser.parse(Vec::<String>::new());
        assert!(!result.has_errors());
        assert_eq!(
            result.unmatched_options(),
            &[OptionKey {
                short: Some('i'),
                long: None,
            }]
        );

        parser.parse(["-i", "7"]);
        assert_eq!(*seen.lock().unwrap(), vec![42, 7]);
    }

    #[test]
    fn default_is_not_bound_after_failure() {
        let (seen, cb) = recorder::<i32>();
        let mut parser = Parser::new();
        parser
            .register(Opt::<i32>::new().short('i').default_value(42).callback(cb))
            .unwrap();
        let result = parser.parse(["-i", "nope"]);
        assert!(result.has_errors());
        assert!(result.unmatched_options().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    // -- reuse --

    #[test]
    fn parser_is_reusable() {
        let (seen, cb) = recorder::<bool>();
        let mut parser = Parser::new();
        parser.register(Opt::<bool>::new().short('b').callback(cb)).unwrap();
        assert!(!parser.parse(["-b+"]).has_errors());
        assert!(!parser.parse(["-b-"]).has_errors());
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn parse_line_splits_first() {
        let (seen, cb) = recorder::<String>();
        let mut parser = Parser::new();
        parser.register(Opt::<String>::new().short('s').callback(cb)).unwrap();
        let result = parser.parse_line("-s \"Hello World\"").unwrap();
        assert!(!result.has_errors());
        assert_eq!(*seen.lock().unwrap(), vec!["Hello World".to_string()]);
        assert!(parser.parse_line("-s \"open").is_err());
    }
}
