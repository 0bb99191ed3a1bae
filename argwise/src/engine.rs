//! Argument tokenizer.
//!
//! Turns raw argument tokens into `(prefix, key, value, suffix)` records.
//! The tokenizer knows nothing about registered options: it only recognizes
//! syntax. Malformed input never fails here; tokens that are not options
//! end up in [`Tokens::additional_values`].

use tracing::trace;

/// Leading marker identifying a token as an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// `-`
    Short,
    /// `--`
    Long,
    /// `/`
    Slash,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Short => "-",
            Prefix::Long => "--",
            Prefix::Slash => "/",
        }
    }

    // Longest first, so "--" is never read as two "-".
    fn strip(arg: &str) -> Option<(Prefix, &str)> {
        if let Some(rest) = arg.strip_prefix("--") {
            Some((Prefix::Long, rest))
        } else if let Some(rest) = arg.strip_prefix('-') {
            Some((Prefix::Short, rest))
        } else {
            arg.strip_prefix('/').map(|rest| (Prefix::Slash, rest))
        }
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing `+`/`-` on a boolean option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    Plus,
    Minus,
}

impl Suffix {
    pub fn as_char(&self) -> char {
        match self {
            Suffix::Plus => '+',
            Suffix::Minus => '-',
        }
    }
}

/// One option occurrence as it appeared on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOption {
    pub prefix: Prefix,
    /// Never empty.
    pub key: String,
    /// All captured value tokens joined by a single space.
    pub value: Option<String>,
    /// Captured value tokens in input order, quoting preserved.
    pub values: Vec<String>,
    pub suffix: Option<Suffix>,
}

impl ParsedOption {
    /// The key as the user typed it, e.g. `--flag` or `/b`.
    pub fn display_key(&self) -> String {
        format!("{}{}", self.prefix, self.key)
    }
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    pub parsed_options: Vec<ParsedOption>,
    pub additional_values: Vec<String>,
}

/// End-of-options marker; everything after it is an additional value.
const END_OF_OPTIONS: &str = "--";

/// A single raw token split into its option parts.
struct OptionToken<'a> {
    prefix: Prefix,
    key: &'a str,
    inline: Option<&'a str>,
    suffix: Option<Suffix>,
}

impl<'a> OptionToken<'a> {
    fn split(arg: &'a str) -> Option<OptionToken<'a>> {
        let (prefix, rest) = Prefix::strip(arg)?;

        let (key, inline, suffix) = match rest.find([':', '=']) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..]), None),
            None => {
                if let Some(key) = rest.strip_suffix('+') {
                    (key, None, Some(Suffix::Plus))
                } else if let Some(key) = rest.strip_suffix('-') {
                    (key, None, Some(Suffix::Minus))
                } else {
                    (rest, None, None)
                }
            }
        };

        if key.is_empty() {
            return None;
        }

        Some(OptionToken {
            prefix,
            key,
            inline,
            suffix,
        })
    }

    /// Keys this token stands for. A single-dash token without an inline
    /// value fans out into one key per character.
    fn keys(&self) -> Vec<String> {
        if self.prefix == Prefix::Short && self.inline.is_none() && self.key.chars().count() > 1 {
            self.key.chars().map(String::from).collect()
        } else {
            vec![self.key.to_string()]
        }
    }
}

fn looks_like_option(arg: &str) -> bool {
    arg == END_OF_OPTIONS || OptionToken::split(arg).is_some()
}

/// Tokenize a raw argument list.
///
/// Runs in one pass, linear in the number of tokens.
pub fn tokenize<S: AsRef<str>>(args: &[S]) -> Tokens {
    let mut tokens = Tokens::default();
    let mut next = 0;

    while next < args.len() {
        let arg = args[next].as_ref();
        next += 1;

        if arg == END_OF_OPTIONS {
            tokens
                .additional_values
                .extend(args[next..].iter().map(|a| a.as_ref().to_string()));
            break;
        }

        let option = match OptionToken::split(arg) {
            Some(option) => option,
            None => {
                tokens.additional_values.push(arg.to_string());
                continue;
            }
        };

        let mut values = Vec::new();
        if let Some(inline) = option.inline {
            if !inline.is_empty() {
                values.push(inline.to_string());
            }
        }
        if option.suffix.is_none() {
            while next < args.len() && !looks_like_option(args[next].as_ref()) {
                values.push(args[next].as_ref().to_string());
                next += 1;
            }
        }

        let value = if values.is_empty() {
            None
        } else {
            Some(values.join(" "))
        };

        for key in option.keys() {
            trace!(prefix = option.prefix.as_str(), key = %key, value = ?value, "tokenized option");
            tokens.parsed_options.push(ParsedOption {
                prefix: option.prefix,
                key,
                value: value.clone(),
                values: values.clone(),
                suffix: option.suffix,
            });
        }
    }

    tokens
}
