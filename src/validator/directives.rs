//! Per-directive rules. Each checker stops at the first violated rule.

use std::fmt;

use super::DirectiveKind;
use crate::fs::FileSystem;

/// Largest accepted `client_max_body_size`, in bytes.
pub const MAX_BODY_SIZE: u64 = 2_147_483_647;

const MAX_SERVER_NAME_LEN: usize = 255;

const ALLOWED_METHODS: [&str; 3] = ["GET", "POST", "DELETE"];

/// How many values a directive takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::Between(lo, hi) => lo <= count && count <= hi,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(1) => write!(f, "exactly one value"),
            Self::Exactly(2) => write!(f, "exactly two values"),
            Self::Exactly(n) => write!(f, "exactly {n} values"),
            Self::AtLeast(1) => write!(f, "at least one value"),
            Self::AtLeast(2) => write!(f, "at least two values"),
            Self::AtLeast(n) => write!(f, "at least {n} values"),
            Self::Between(lo, hi) => write!(f, "between {lo} and {hi} values"),
        }
    }
}

/// The first rule a directive breaks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("'{directive}' directive requires {arity}")]
    Arity {
        directive: &'static str,
        arity: Arity,
    },
    #[error("invalid port number: '{0}'")]
    InvalidPort(String),
    #[error("invalid IP address: '{0}'")]
    InvalidAddress(String),
    #[error("invalid {directive} path: '{path}', it should start with '/'")]
    RelativePath {
        directive: &'static str,
        path: String,
    },
    #[error("{directive} path does not exist: '{path}'")]
    PathNotFound {
        directive: &'static str,
        path: String,
    },
    #[error("{directive} path is not a directory: '{path}'")]
    NotADirectory {
        directive: &'static str,
        path: String,
    },
    #[error("server name is too long: '{0}', maximum length is 255 characters")]
    ServerNameTooLong(String),
    #[error("invalid server name: '{0}'")]
    InvalidServerName(String),
    #[error("invalid body size: '{0}'")]
    InvalidBodySize(String),
    #[error("body size too large: '{0}', maximum is 2147483647 bytes")]
    BodySizeTooLarge(String),
    #[error("invalid autoindex value: '{0}', expected 'on' or 'off'")]
    InvalidToggle(String),
    #[error("invalid status code: '{0}', expected a code between 300 and 599")]
    InvalidStatusCode(String),
    #[error("invalid CGI extension: '{0}', it should start with '.'")]
    InvalidExtension(String),
    #[error("CGI interpreter cannot be a directory: '{0}'")]
    InterpreterIsDirectory(String),
    #[error("CGI interpreter is not executable: '{0}'")]
    InterpreterNotExecutable(String),
    #[error("invalid method: '{0}', allowed methods are GET, POST and DELETE")]
    InvalidMethod(String),
}

type Check = Result<(), Violation>;

/// Run the rules for `kind` against `values`.
pub fn check(kind: DirectiveKind, values: &[String], fs: &dyn FileSystem) -> Check {
    let arity = kind.arity();
    if !arity.accepts(values.len()) {
        return Err(Violation::Arity {
            directive: kind.name(),
            arity,
        });
    }

    match kind {
        DirectiveKind::Listen => check_listen(&values[0]),
        DirectiveKind::Root | DirectiveKind::UploadStore => {
            check_directory(kind.name(), &values[0], fs)
        }
        DirectiveKind::ServerName => values.iter().try_for_each(|v| check_server_name(v)),
        DirectiveKind::ClientMaxBodySize => parse_body_size(&values[0]).map(|_| ()),
        DirectiveKind::Index => Ok(()),
        DirectiveKind::Autoindex => check_toggle(&values[0]),
        DirectiveKind::ErrorPage => values[..values.len() - 1]
            .iter()
            .try_for_each(|v| check_status_code(v)),
        DirectiveKind::Return => match values {
            [code, _] => check_status_code(code),
            _ => Ok(()),
        },
        DirectiveKind::CgiExtension => check_cgi(&values[0], &values[1], fs),
        DirectiveKind::Methods => values.iter().try_for_each(|v| check_method(v)),
    }
}

/// `port` or `ip:port`, split on the first colon.
pub fn check_listen(value: &str) -> Check {
    let port = match value.split_once(':') {
        Some((ip, port)) => {
            if !is_valid_ip(ip) {
                return Err(Violation::InvalidAddress(ip.to_string()));
            }
            port
        }
        None => value,
    };
    if is_valid_port(port) {
        Ok(())
    } else {
        Err(Violation::InvalidPort(port.to_string()))
    }
}

fn is_valid_port(port: &str) -> bool {
    if port.is_empty() || port.len() > 5 || !port.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    port.parse::<u32>().is_ok_and(|p| (1..=65_535).contains(&p))
}

fn is_valid_ip(ip: &str) -> bool {
    if matches!(ip, "*" | "0.0.0.0" | "localhost") {
        return true;
    }
    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

fn check_directory(directive: &'static str, path: &str, fs: &dyn FileSystem) -> Check {
    if !path.starts_with('/') {
        return Err(Violation::RelativePath {
            directive,
            path: path.to_string(),
        });
    }
    if !fs.exists(path) {
        return Err(Violation::PathNotFound {
            directive,
            path: path.to_string(),
        });
    }
    if !fs.is_dir(path) {
        return Err(Violation::NotADirectory {
            directive,
            path: path.to_string(),
        });
    }
    Ok(())
}

fn check_server_name(name: &str) -> Check {
    if name.len() > MAX_SERVER_NAME_LEN {
        return Err(Violation::ServerNameTooLong(name.to_string()));
    }
    let valid = !name.is_empty()
        && !name.starts_with(['-', '.'])
        && !name.ends_with(['-', '.'])
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(Violation::InvalidServerName(name.to_string()))
    }
}

/// Parse a body size such as `10m` into bytes.
pub fn parse_body_size(value: &str) -> Result<u64, Violation> {
    let invalid = || Violation::InvalidBodySize(value.to_string());
    let too_large = || Violation::BodySizeTooLarge(value.to_string());

    let (digits, multiplier) = match value.as_bytes().last() {
        Some(b'k' | b'K') => (&value[..value.len() - 1], 1024),
        Some(b'm' | b'M') => (&value[..value.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&value[..value.len() - 1], 1024 * 1024 * 1024),
        _ => (value, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    // all digits, so a parse failure can only be overflow
    let number: u64 = digits.parse().map_err(|_| too_large())?;
    let bytes = number.checked_mul(multiplier).ok_or_else(too_large)?;
    if bytes > MAX_BODY_SIZE {
        return Err(too_large());
    }
    Ok(bytes)
}

fn check_toggle(value: &str) -> Check {
    match value {
        "on" | "off" => Ok(()),
        _ => Err(Violation::InvalidToggle(value.to_string())),
    }
}

fn check_status_code(code: &str) -> Check {
    let valid = code.len() == 3
        && code.bytes().all(|b| b.is_ascii_digit())
        && code.parse::<u16>().is_ok_and(|c| (300..=599).contains(&c));
    if valid {
        Ok(())
    } else {
        Err(Violation::InvalidStatusCode(code.to_string()))
    }
}

fn check_cgi(extension: &str, interpreter: &str, fs: &dyn FileSystem) -> Check {
    if !extension.starts_with('.') {
        return Err(Violation::InvalidExtension(extension.to_string()));
    }
    if !interpreter.starts_with('/') {
        return Err(Violation::RelativePath {
            directive: "cgi_extension",
            path: interpreter.to_string(),
        });
    }
    if !fs.exists(interpreter) {
        return Err(Violation::PathNotFound {
            directive: "cgi_extension",
            path: interpreter.to_string(),
        });
    }
    if fs.is_dir(interpreter) {
        return Err(Violation::InterpreterIsDirectory(interpreter.to_string()));
    }
    if !fs.is_executable(interpreter) {
        return Err(Violation::InterpreterNotExecutable(interpreter.to_string()));
    }
    Ok(())
}

fn check_method(method: &str) -> Check {
    if ALLOWED_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(Violation::InvalidMethod(method.to_string()))
    }
}
