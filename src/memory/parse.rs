//! Programs are written one byte per line as base-2 literals. Everything
//! after the first token of a line is ignored, so it can hold a comment:
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fmt, str::Lines};

use super::{Byte, RAM_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidLiteral,
    ProgramTooLarge { capacity: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidLiteral => f.write_str("invalid number"),
            ParseErrorKind::ProgramTooLarge { capacity } => {
                write!(f, "program exceeds memory of `{}` bytes", capacity)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// 1-based line of the program text the error was found on
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Failure to turn a program file into a [`Program`].
#[derive(Debug)]
pub enum LoadError {
    NotFound { path: PathBuf },
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, errors: Vec<ParseError> },
}

impl LoadError {
    /// Process exit status reported for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::NotFound { .. } => 2,
            LoadError::Io { .. } | LoadError::Parse { .. } => 1,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound { path } => write!(f, "couldn't open `{}`", path.display()),
            LoadError::Io { path, source } => {
                write!(f, "failed to read `{}`: {}", path.display(), source)
            }
            LoadError::Parse { path, errors } => write!(
                f,
                "`{}` is not a valid program ({} invalid line(s))",
                path.display(),
                errors.len()
            ),
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Machine code ready to be placed into memory at address 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    bytes: Vec<Byte>,
}

impl Program {
    pub fn new(bytes: Vec<Byte>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[Byte] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads and parses the program file at `path`.
    ///
    /// # Errors
    ///
    /// A missing file is reported as [`LoadError::NotFound`], every other
    /// read failure as [`LoadError::Io`]. Invalid lines are collected into
    /// [`LoadError::Parse`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();

        let data = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        log::debug!("Read {} bytes from `{}`", data.len(), path.display());

        data.parse().map_err(|errors| LoadError::Parse {
            path: path.to_path_buf(),
            errors,
        })
    }
}

impl FromStr for Program {
    type Err = Vec<ParseError>;

    fn from_str(data: &str) -> std::result::Result<Self, Self::Err> {
        Parser::new(data, RAM_SIZE).parse()
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    bytes: Vec<Byte>,
    capacity: usize,
    overflow_line: Option<usize>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data` which accepts at most `capacity` bytes.
    pub fn new(data: &'a str, capacity: usize) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            bytes: Vec::new(),
            capacity,
            overflow_line: None,
        }
    }

    /// Consumes `self` and tries to parse all lines into a [`Program`].
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if let Some(line_nr) = self.overflow_line {
            let err = ParseError::new(
                ParseErrorKind::ProgramTooLarge {
                    capacity: self.capacity,
                },
                format!("program has `{}` bytes", self.bytes.len()),
                line_nr,
            );
            log::error!("{}", err);
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(Program::new(self.bytes))
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Each byte should be located on it's
    /// own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        match line.split_whitespace().next() {
            // Comment or empty line; skip
            None => Some(Ok(())),
            Some(token) if token.starts_with('#') => Some(Ok(())),
            Some(token) => Some(self.parse_literal(token)),
        }
    }

    /// Tries to parse `token` as a base-2 byte literal.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `0b00000001`
    fn parse_literal(&mut self, token: &str) -> Result<()> {
        let digits = token.strip_prefix("0b").unwrap_or(token);

        let byte = Byte::from_str_radix(digits, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidLiteral,
                format!("`{}` is not a base-2 byte", token),
                self.line_nr,
            )
        })?;

        log::trace!("[{}] Found byte 0b{:08b}", self.line_nr, byte);

        self.write_byte(byte);

        Ok(())
    }

    /// Appends `byte` to the program, remembering the first line which no
    /// longer fits into memory.
    fn write_byte(&mut self, byte: Byte) {
        if self.bytes.len() == self.capacity && self.overflow_line.is_none() {
            self.overflow_line = Some(self.line_nr);
        }

        self.bytes.push(byte);
    }
}
