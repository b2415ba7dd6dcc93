//! Strongly-typed migration module identifier.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::OnceLock;

static MODULE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn module_id_re() -> &'static Regex {
    MODULE_ID_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,4})_([a-z][a-z0-9_]*)$").expect("module id pattern is valid")
    })
}

/// Identifier of a migration module, e.g. `010_auth`.
///
/// The numeric prefix is a suggested ordering only; execution order always
/// comes from the dependency graph. A `ModuleId` can only be constructed from
/// a string matching `^\d{1,4}_[a-z][a-z0-9_]*$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl<'de> serde::Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ModuleId::try_new(s.clone())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid module id '{s}'")))
    }
}

impl ModuleId {
    /// Returns `true` if `s` follows the module id naming convention.
    pub fn is_valid(s: &str) -> bool {
        module_id_re().is_match(s)
    }

    /// Try to create a new `ModuleId`, returning `None` if the pattern does not match.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        if Self::is_valid(&s) {
            Some(Self(s))
        } else {
            None
        }
    }

    /// Parse a module id, failing with [`CoreError::InvalidModuleId`].
    pub fn parse(id: &str) -> CoreResult<Self> {
        Self::try_new(id).ok_or_else(|| CoreError::InvalidModuleId { id: id.to_string() })
    }

    /// The digit prefix as written, e.g. `"010"`.
    pub fn prefix(&self) -> &str {
        self.split().0
    }

    /// The numeric value of the prefix, e.g. `10` for `010_auth`.
    pub fn ordinal(&self) -> u32 {
        // at most four digits, always fits
        self.prefix().parse().unwrap_or_default()
    }

    /// The name part after the first underscore, e.g. `"auth"`.
    pub fn name(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        self.0.split_once('_').unwrap_or((&self.0, ""))
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ModuleId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModuleId {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl PartialEq<str> for ModuleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModuleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "module_id_test.rs"]
mod tests;
