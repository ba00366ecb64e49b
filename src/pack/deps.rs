//! Package dependency declarations for RPM and DEB packages.
//!
//! Dependencies come from three places, merged in this order:
//! `--with-tarantool-deps`, `--deps-file`, then `--deps`.

use crate::pack::{
    error::{ErrorExt, MissingDependencyError, PackError, Result},
    request::RpmDebOptions,
};
use std::fmt;

/// Tools added by `--with-tarantool-deps`.
pub const TOOL_DEPENDENCIES: [&str; 2] = ["tarantool", "tt"];

/// Version comparison operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionOp {
    /// `=` or `==`
    Eq,
    /// `>=`
    GreaterEq,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `<`
    Less,
}

impl VersionOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "=" | "==" => Some(VersionOp::Eq),
            ">=" => Some(VersionOp::GreaterEq),
            ">" => Some(VersionOp::Greater),
            "<=" => Some(VersionOp::LessEq),
            "<" => Some(VersionOp::Less),
            _ => None,
        }
    }

    /// Debian relation spelling (`>>` and `<<` for strict comparisons).
    fn debian(&self) -> &'static str {
        match self {
            VersionOp::Eq => "=",
            VersionOp::GreaterEq => ">=",
            VersionOp::Greater => ">>",
            VersionOp::LessEq => "<=",
            VersionOp::Less => "<<",
        }
    }
}

/// A single package dependency.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Optional version constraint.
    pub constraint: Option<(VersionOp, String)>,
}

impl Dependency {
    /// Parses `name` or `name OP version`; spaces around `OP` are optional.
    ///
    /// ```
    /// use tt_pack::pack::deps::{Dependency, VersionOp};
    ///
    /// let dep = Dependency::parse("tarantool >= 2.10").unwrap();
    /// assert_eq!(dep.name, "tarantool");
    /// assert_eq!(dep.constraint, Some((VersionOp::GreaterEq, "2.10".to_string())));
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| PackError::InvalidDependency {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        let is_op_char = |c: char| matches!(c, '=' | '<' | '>');
        let trimmed = spec.trim();

        let Some(op_start) = trimmed.find(is_op_char) else {
            if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
                return Err(invalid("expected 'package' or 'package OP version'"));
            }
            return Ok(Self {
                name: trimmed.to_string(),
                constraint: None,
            });
        };

        let name = trimmed[..op_start].trim_end();
        let rest = &trimmed[op_start..];
        let op_len = rest.find(|c: char| !is_op_char(c)).unwrap_or(rest.len());
        let (op, version) = (&rest[..op_len], rest[op_len..].trim());

        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(invalid("expected 'package' or 'package OP version'"));
        }
        let op = VersionOp::parse(op).ok_or_else(|| invalid(&format!("unknown operator '{}'", op)))?;
        if version.is_empty() || version.contains(char::is_whitespace) || version.contains(is_op_char) {
            return Err(invalid("expected a single version after the operator"));
        }

        Ok(Self {
            name: name.to_string(),
            constraint: Some((op, version.to_string())),
        })
    }

    /// Converts to the rpm builder's dependency type.
    pub fn to_rpm(&self) -> rpm::Dependency {
        match &self.constraint {
            None => rpm::Dependency::any(self.name.as_str()),
            Some((op, version)) => {
                let (name, version) = (self.name.as_str(), version.as_str());
                match op {
                    VersionOp::Eq => rpm::Dependency::eq(name, version),
                    VersionOp::GreaterEq => rpm::Dependency::greater_eq(name, version),
                    VersionOp::Greater => rpm::Dependency::greater(name, version),
                    VersionOp::LessEq => rpm::Dependency::less_eq(name, version),
                    VersionOp::Less => rpm::Dependency::less(name, version),
                }
            }
        }
    }

    /// Formats as a Debian `Depends` entry, e.g. `tarantool (>= 2.10)`.
    pub fn to_debian(&self) -> String {
        match &self.constraint {
            None => self.name.clone(),
            Some((op, version)) => format!("{} ({} {})", self.name, op.debian(), version),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            None => write!(f, "{}", self.name),
            Some((op, version)) => {
                let op = match op {
                    VersionOp::Eq => "=",
                    VersionOp::GreaterEq => ">=",
                    VersionOp::Greater => ">",
                    VersionOp::LessEq => "<=",
                    VersionOp::Less => "<",
                };
                write!(f, "{} {} {}", self.name, op, version)
            }
        }
    }
}

/// Parses a dependencies file body: one entry per line, `#` starts a comment.
pub fn parse_dependencies_file(contents: &str) -> Result<Vec<Dependency>> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(Dependency::parse)
        .collect()
}

/// Collects every dependency the options declare.
///
/// A dependencies file that does not exist is a
/// [`MissingDependencyError::File`].
pub fn collect_dependencies(opts: &RpmDebOptions) -> Result<Vec<Dependency>> {
    let mut deps = Vec::new();

    if opts.with_tool_dependencies {
        deps.extend(TOOL_DEPENDENCIES.iter().map(|name| Dependency {
            name: name.to_string(),
            constraint: None,
        }));
    }

    if let Some(path) = &opts.dependencies_file_path {
        if !path.is_file() {
            return Err(MissingDependencyError::File {
                kind: "dependencies",
                path: path.clone(),
            }
            .into());
        }
        let contents = std::fs::read_to_string(path).fs_context("reading dependencies file", path)?;
        deps.extend(parse_dependencies_file(&contents)?);
    }

    for spec in &opts.explicit_dependencies {
        deps.push(Dependency::parse(spec)?);
    }

    log::debug!("Collected {} package dependencies", deps.len());
    Ok(deps)
}
