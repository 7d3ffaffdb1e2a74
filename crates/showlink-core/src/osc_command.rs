//! Parser for user-typed OSC command strings.
//!
//! Syntax: `[host:port]/address arg arg; /other/address ...`
//!
//! Arguments are typed by their spelling: `12` is an int, `1.5` a float,
//! `true`/`false` booleans, quoted text (`"`, `'` or `` ` ``, with the quote
//! escaped by a backslash) a string, anything else a bare string.

use rosc::OscType;

use crate::error::{Error, Result};

/// One parsed command.
#[derive(Clone, Debug, PartialEq)]
pub struct OscCommand {
    /// Explicit `host:port` destination, if given.
    pub target: Option<String>,
    pub address: String,
    pub args: Vec<OscType>,
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Split on `;` outside of quoted strings.
fn split_commands(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q && prev != '\\' => quote = None,
            Some(_) => {}
            None if is_quote(c) => quote = Some(c),
            None if c == ';' => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
        prev = c;
    }
    parts.push(&input[start..]);
    parts
}

/// Split on whitespace, keeping quoted strings (quotes included) together.
fn tokenize(input: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    let mut start: Option<usize> = None;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != '\\' {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    tokens.push(&input[s..i]);
                }
            }
            None => {
                if start.is_none() {
                    start = Some(i);
                }
                if is_quote(c) {
                    quote = Some(c);
                }
            }
        }
        prev = c;
    }
    if let Some(s) = start {
        tokens.push(&input[s..]);
    }
    tokens
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_decimal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    match body.split_once('.') {
        Some((whole, frac)) => {
            !whole.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Type a single argument by its spelling.
pub fn parse_argument(arg: &str) -> OscType {
    if is_integer(arg) {
        if let Ok(i) = arg.parse::<i32>() {
            return OscType::Int(i);
        }
        if let Ok(l) = arg.parse::<i64>() {
            return OscType::Long(l);
        }
    }
    if is_decimal(arg) {
        if let Ok(f) = arg.parse::<f32>() {
            return OscType::Float(f);
        }
    }
    match arg {
        "true" => return OscType::Bool(true),
        "false" => return OscType::Bool(false),
        _ => {}
    }

    let mut chars = arg.chars();
    if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
        if is_quote(first) && first == last {
            let inner = &arg[first.len_utf8()..arg.len() - last.len_utf8()];
            let escaped = format!("\\{}", first);
            return OscType::String(inner.replace(&escaped, &first.to_string()));
        }
    }
    OscType::String(arg.to_string())
}

fn parse_target(prefix: &str) -> Result<Option<String>> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Ok(None);
    }
    let Some((host, port)) = prefix.rsplit_once(':') else {
        log::debug!("[OSC] Ignoring target without port: {}", prefix);
        return Ok(None);
    };
    let port: u16 = port
        .parse()
        .map_err(|_| Error::InvalidCommand(format!("invalid port in target {}", prefix)))?;
    if host.is_empty() {
        return Err(Error::InvalidCommand(format!("missing host in target {}", prefix)));
    }
    Ok(Some(format!("{}:{}", host, port)))
}

/// Parse a `;`-separated list of commands. Empty segments are skipped.
pub fn parse_osc_commands(input: &str) -> Result<Vec<OscCommand>> {
    let mut commands = Vec::new();
    for part in split_commands(input.trim()) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some(slash) = part.find('/') else {
            return Err(Error::InvalidCommand(format!("no OSC address in `{}`", part)));
        };
        let target = parse_target(&part[..slash])?;
        let mut tokens = tokenize(&part[slash..]).into_iter();
        let address = tokens.next().unwrap_or("/").to_string();
        let args = tokens.map(parse_argument).collect();
        commands.push(OscCommand {
            target,
            address,
            args,
        });
    }
    Ok(commands)
}
