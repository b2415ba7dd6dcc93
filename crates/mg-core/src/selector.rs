//! Module selector resolution
//!
//! A selector names exactly one module directory:
//! - `010_auth` - exact module id
//! - `10` / `010` - numeric prefix (compared by value)
//! - `auth` - name after the prefix
//!
//! Selection is strict: a selector matching more than one directory is an
//! error rather than a first-match pick.

use crate::discovery::discover_modules;
use crate::error::{CoreError, CoreResult};
use crate::module_id::ModuleId;
use std::path::Path;

/// Parsed form of a module selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSelector {
    /// Full module id, e.g. `010_auth`
    Id(ModuleId),
    /// Bare ordinal, e.g. `10`
    Ordinal(u32),
    /// Bare name, e.g. `auth`
    Name(String),
}

impl ModuleSelector {
    pub fn parse(selector: &str) -> CoreResult<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(CoreError::ModuleNotFound {
                selector: selector.to_string(),
            });
        }
        if let Some(id) = ModuleId::try_new(selector) {
            return Ok(Self::Id(id));
        }
        if selector.bytes().all(|b| b.is_ascii_digit()) {
            return selector
                .parse()
                .map(Self::Ordinal)
                .map_err(|_| CoreError::ModuleNotFound {
                    selector: selector.to_string(),
                });
        }
        Ok(Self::Name(selector.to_string()))
    }

    fn matches(&self, id: &ModuleId) -> bool {
        match self {
            Self::Id(want) => want == id,
            Self::Ordinal(n) => id.ordinal() == *n,
            Self::Name(name) => id.name() == name,
        }
    }

    /// Pick the single candidate this selector names.
    pub fn select<'a>(&self, raw: &str, candidates: &'a [ModuleId]) -> CoreResult<&'a ModuleId> {
        let matches: Vec<&ModuleId> = candidates.iter().filter(|id| self.matches(id)).collect();
        match matches.as_slice() {
            [only] => Ok(*only),
            [] => Err(CoreError::ModuleNotFound {
                selector: raw.to_string(),
            }),
            many => Err(CoreError::AmbiguousSelector {
                selector: raw.to_string(),
                candidates: many.iter().map(|id| id.to_string()).collect(),
            }),
        }
    }
}

/// Resolve a selector against the module directories under `root`.
pub fn resolve_module_selector(root: &Path, selector: &str) -> CoreResult<ModuleId> {
    let candidates = discover_modules(root)?.module_ids();
    let parsed = ModuleSelector::parse(selector)?;
    let id = parsed.select(selector, &candidates)?.clone();
    log::debug!("Selector '{selector}' resolved to {id}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(ids: &[&str]) -> Vec<ModuleId> {
        ids.iter().map(|s| ModuleId::parse(s).unwrap()).collect()
    }

    fn pick(selector: &str, ids: &[ModuleId]) -> CoreResult<String> {
        ModuleSelector::parse(selector)?
            .select(selector, ids)
            .map(|id| id.to_string())
    }

    #[test]
    fn test_exact_ordinal_and_name() {
        let ids = candidates(&["000_admin", "010_auth", "020_schema"]);
        assert_eq!(pick("010_auth", &ids).unwrap(), "010_auth");
        assert_eq!(pick("10", &ids).unwrap(), "010_auth");
        assert_eq!(pick("010", &ids).unwrap(), "010_auth");
        assert_eq!(pick("0", &ids).unwrap(), "000_admin");
        assert_eq!(pick("schema", &ids).unwrap(), "020_schema");
        assert_eq!(pick(" auth ", &ids).unwrap(), "010_auth");
    }

    #[test]
    fn test_no_match() {
        let ids = candidates(&["010_auth"]);
        for selector in ["999_missing", "99", "billing", ""] {
            let err = pick(selector, &ids).unwrap_err();
            assert!(
                matches!(err, CoreError::ModuleNotFound { .. }),
                "{selector}: {err:?}"
            );
        }
    }

    #[test]
    fn test_ambiguous_name_and_ordinal() {
        let ids = candidates(&["010_auth", "110_auth", "010_users"]);
        match pick("auth", &ids).unwrap_err() {
            CoreError::AmbiguousSelector { candidates, .. } => {
                assert_eq!(candidates, vec!["010_auth", "110_auth"]);
            }
            other => panic!("expected AmbiguousSelector, got {other:?}"),
        }
        assert!(matches!(
            pick("10", &ids).unwrap_err(),
            CoreError::AmbiguousSelector { .. }
        ));
        // a full id is never ambiguous
        assert_eq!(pick("010_auth", &ids).unwrap(), "010_auth");
    }

    #[test]
    fn test_parse_kinds() {
        assert!(matches!(ModuleSelector::parse("010_auth").unwrap(), ModuleSelector::Id(_)));
        assert_eq!(ModuleSelector::parse("7").unwrap(), ModuleSelector::Ordinal(7));
        assert_eq!(
            ModuleSelector::parse("auth").unwrap(),
            ModuleSelector::Name("auth".to_string())
        );
    }
}
