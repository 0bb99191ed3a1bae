//! Command-line option parsing with typed callbacks and aggregated errors.
//!
//! - Prefixes `-`, `--` and `/`; values after a space, `:` or `=`
//! - Boolean suffixes (`-b+`, `-b-`) and literals (`true`/`false`, `on`/`off`)
//! - Combined short clusters (`-xyz`, `-xyz+`, `-xyz value`)
//! - Conversion to `bool`, `i32`, `i64`, `f64`, `String`, enums, bit-flag
//!   enums and lists
//! - Parsing never fails on bad input: problems are collected in
//!   [`ParseResult::errors`]
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use argwise::{ErrorKind, Opt, Parser};
//!
//! let verbose = Arc::new(Mutex::new(false));
//! let v = verbose.clone();
//!
//! let mut parser = Parser::new();
//! parser
//!     .register(Opt::<bool>::new().short('v').long("verbose").callback(move |b| {
//!         *v.lock().unwrap() = b;
//!     }))
//!     .unwrap();
//! parser
//!     .register(Opt::<String>::new().short('o').long("output").required())
//!     .unwrap();
//!
//! let result = parser.parse(["/verbose:on", "--", "input.txt"]);
//! assert!(*verbose.lock().unwrap());
//! assert_eq!(result.additional_values().to_vec(), vec!["input.txt".to_string()]);
//! assert_eq!(result.errors()[0].kind, ErrorKind::RequiredOptionMissing);
//! ```

pub mod argv;
pub mod convert;
pub mod engine;
pub mod error;
pub mod opt;
pub mod parser;
pub mod result;
pub mod value;

pub use argv::split_command_line;
pub use engine::{tokenize, ParsedOption, Prefix, Suffix, Tokens};
pub use error::{Error, Result};
pub use opt::Opt;
pub use parser::{OptionHandle, Parser, ParserSettings};
pub use result::{ErrorKind, OptionKey, ParseError, ParseResult};
pub use value::{ArgEnum, ArgType, EnumInfo, OptionValue, Value};
