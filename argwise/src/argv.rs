use crate::error::{Error, Result};

/// Split a command-line string into argument tokens.
///
/// Whitespace outside quotes separates tokens. Quote characters (`"` and
/// `'`) are kept in the token, so `-s "Hello World"` splits into `-s` and
/// `"Hello World"` and the quoting survives for the converter to strip.
/// A backslash escapes the following character.
pub fn split_command_line(s: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                current.push(c);
                quote = None;
            } else if c == '\\' {
                match chars.next() {
                    None => return Err(Error::BadQuote("unterminated backslash".to_string())),
                    Some(next) => {
                        if next != q && next != '\\' {
                            current.push('\\');
                        }
                        current.push(next);
                    }
                }
            } else {
                current.push(c);
            }
        } else if c.is_whitespace() {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
        } else {
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '\\' => match chars.next() {
                    None => return Err(Error::BadQuote("unterminated backslash".to_string())),
                    Some(next) => current.push(next),
                },
                _ => current.push(c),
            }
        }
    }

    if let Some(q) = quote {
        return Err(Error::BadQuote(format!("unterminated {} quote", q)));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
