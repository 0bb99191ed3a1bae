use crate::engine::ParsedOption;

/// What went wrong with one option during a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The key matches no registered option.
    UnexpectedOption,
    /// The option's type needs a value and none followed the key.
    ExpectedOptionValue,
    /// The value text could not become the option's type.
    OptionValueConversionFailed,
    /// A required option never appeared, or appeared with a bad value.
    RequiredOptionMissing,
    /// The same option appeared more than once.
    DuplicateOption,
}

/// One input-driven problem. Collected, never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// The offending key as typed (`-b`, `--flag`), or the registered names
    /// (`-b/--bold`) when the option never appeared.
    pub option: String,
    pub raw_value: Option<String>,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(
        kind: ErrorKind,
        option: String,
        raw_value: Option<String>,
        message: String,
    ) -> Self {
        ParseError {
            kind,
            option,
            raw_value,
            message,
        }
    }
}

/// The names a registered option answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionKey {
    pub short: Option<char>,
    pub long: Option<String>,
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.short, self.long.as_deref()) {
            (Some(c), Some(name)) => write!(f, "-{}/--{}", c, name),
            (Some(c), None) => write!(f, "-{}", c),
            (None, Some(name)) => write!(f, "--{}", name),
            (None, None) => Ok(()),
        }
    }
}

/// Outcome of one parse call. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    parsed_options: Vec<ParsedOption>,
    additional_values: Vec<String>,
    errors: Vec<ParseError>,
    unmatched_options: Vec<OptionKey>,
}

impl ParseResult {
    pub(crate) fn new(
        parsed_options: Vec<ParsedOption>,
        additional_values: Vec<String>,
        errors: Vec<ParseError>,
        unmatched_options: Vec<OptionKey>,
    ) -> Self {
        ParseResult {
            parsed_options,
            additional_values,
            errors,
            unmatched_options,
        }
    }

    /// Every option occurrence in input order, matched or not.
    pub fn parsed_options(&self) -> &[ParsedOption] {
        &self.parsed_options
    }

    pub fn additional_values(&self) -> &[String] {
        &self.additional_values
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Registered options that did not appear in the input.
    pub fn unmatched_options(&self) -> &[OptionKey] {
        &self.unmatched_options
    }

    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}
