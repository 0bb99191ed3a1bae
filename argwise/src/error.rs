/// Hard failures: caller misconfiguration detected at registration time, or
/// a command-line string that cannot be split.
///
/// Problems in the parsed input itself never surface here; they are
/// collected as [`crate::ParseError`] values on the parse result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("option must have a short name, a long name, or both")]
    Unnamed,

    #[error("invalid short name {0:?}: must be a single non-whitespace character other than : = + - / \" '")]
    InvalidShortName(char),

    #[error("invalid long name {0:?}: must be at least two characters without whitespace, ':', '=' or quotes")]
    InvalidLongName(String),

    #[error("short name -{0} is already registered")]
    DuplicateShortName(char),

    #[error("long name --{0} is already registered")]
    DuplicateLongName(String),

    #[error("{0}")]
    BadQuote(String),
}

pub type Result<T> = std::result::Result<T, Error>;
