//! Per-model registry of custom literal prefixes (`money'12.50'` → `NS.Money`).

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::model_literals;
use crate::model::EdmModel;
use crate::types::TypeRef;
use crate::Error;

/// Case-sensitive mapping from literal prefix to type.
pub struct LiteralPrefixRegistry {
    prefixes: ArcSwap<HashMap<String, TypeRef>>,
}

impl fmt::Debug for LiteralPrefixRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefixes = self.prefixes.load();
        let mut names: Vec<&str> = prefixes.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("LiteralPrefixRegistry")
            .field("prefixes", &names)
            .finish()
    }
}

impl Default for LiteralPrefixRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralPrefixRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefixes: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// The registry of `model`, created on first access.
    #[must_use]
    pub fn get_or_create(model: &EdmModel) -> Arc<Self> {
        Arc::clone(&model_literals(model).prefixes)
    }

    /// Map `prefix` to `type_ref`. Returns `Ok(false)` if the prefix is taken;
    /// the existing mapping is kept.
    ///
    /// # Errors
    /// - `Error::EmptyArgument("prefix")` for an empty prefix
    /// - `Error::InvalidLiteralPrefix` if the prefix is not identifier-like
    pub fn add(&self, prefix: &str, type_ref: TypeRef) -> Result<bool, Error> {
        validate_prefix(prefix)?;

        let mut added = false;
        self.prefixes.rcu(|current| {
            added = !current.contains_key(prefix);
            if !added {
                return Arc::clone(current);
            }
            let mut next = HashMap::clone(current);
            next.insert(prefix.to_owned(), type_ref.clone());
            Arc::new(next)
        });

        if added {
            tracing::debug!(prefix, type_name = type_ref.full_name(), "Added literal prefix");
        } else {
            tracing::debug!(prefix, "Literal prefix already registered, keeping the existing type");
        }
        Ok(added)
    }

    /// Remove the mapping for exactly `prefix`.
    ///
    /// # Errors
    /// Returns `Error::EmptyArgument("prefix")` for an empty prefix.
    pub fn remove(&self, prefix: &str) -> Result<bool, Error> {
        require_non_empty(prefix)?;

        let mut removed = false;
        self.prefixes.rcu(|current| {
            removed = current.contains_key(prefix);
            if !removed {
                return Arc::clone(current);
            }
            let mut next = HashMap::clone(current);
            next.remove(prefix);
            Arc::new(next)
        });

        if removed {
            tracing::debug!(prefix, "Removed literal prefix");
        }
        Ok(removed)
    }

    /// The type mapped to exactly `prefix`.
    ///
    /// # Errors
    /// Returns `Error::EmptyArgument("prefix")` for an empty prefix.
    pub fn try_get(&self, prefix: &str) -> Result<Option<TypeRef>, Error> {
        require_non_empty(prefix)?;
        Ok(self.prefixes.load().get(prefix).cloned())
    }

    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.load().contains_key(prefix)
    }

    /// All mappings, as of now.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, TypeRef> {
        HashMap::clone(&self.prefixes.load())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.load().is_empty()
    }

    /// Recognize `prefix'body'` literal text.
    ///
    /// The text before the first quote must be a registered prefix. Returns the
    /// mapped type and the unquoted body (embedded quotes still doubled).
    #[must_use]
    pub fn match_prefixed<'t>(&self, text: &'t str) -> Option<(TypeRef, &'t str)> {
        let (prefix, quoted) = text.split_at(text.find('\'')?);
        let body = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
        let type_ref = self.prefixes.load().get(prefix).cloned()?;
        Some((type_ref, body))
    }
}

fn require_non_empty(prefix: &str) -> Result<(), Error> {
    if prefix.is_empty() {
        return Err(Error::EmptyArgument("prefix"));
    }
    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<(), Error> {
    require_non_empty(prefix)?;
    let mut chars = prefix.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_') {
        return Err(Error::InvalidLiteralPrefix(prefix.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::types::EdmPrimitiveKind;

    fn money() -> TypeRef {
        TypeRef::new("NS.Money", false)
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = LiteralPrefixRegistry::new();
        assert_eq!(registry.add("money", money()), Ok(true));
        assert_eq!(
            registry.add("money", TypeRef::primitive(EdmPrimitiveKind::Decimal, false)),
            Ok(false)
        );
        assert_eq!(
            registry.try_get("money").unwrap().map(|t| t.full_name().to_owned()),
            Some("NS.Money".to_owned())
        );
    }

    #[test]
    fn test_prefixes_are_case_sensitive() {
        let registry = LiteralPrefixRegistry::new();
        registry.add("money", money()).unwrap();
        assert!(registry.try_get("Money").unwrap().is_none());
        assert_eq!(registry.remove("MONEY"), Ok(false));
        assert!(registry.contains("money"));
        assert_eq!(registry.remove("money"), Ok(true));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_prefix_is_an_argument_error() {
        let registry = LiteralPrefixRegistry::new();
        assert_eq!(registry.add("", money()), Err(Error::EmptyArgument("prefix")));
        assert_eq!(registry.remove(""), Err(Error::EmptyArgument("prefix")));
        assert_eq!(registry.try_get("").unwrap_err(), Error::EmptyArgument("prefix"));
    }

    #[test]
    fn test_prefix_must_be_identifier_like() {
        let registry = LiteralPrefixRegistry::new();
        for bad in ["1money", "mo'ney", "mo ney", "_money", "m\u{e9}"] {
            assert_eq!(
                registry.add(bad, money()),
                Err(Error::InvalidLiteralPrefix(bad.to_owned())),
                "{bad}"
            );
        }
        assert_eq!(registry.add("ns.money_v2", money()), Ok(true));
    }

    #[test]
    fn test_match_prefixed() {
        let registry = LiteralPrefixRegistry::new();
        registry.add("money", money()).unwrap();

        let (ty, body) = registry.match_prefixed("money'12.50'").unwrap();
        assert_eq!(ty.full_name(), "NS.Money");
        assert_eq!(body, "12.50");

        assert!(registry.match_prefixed("cash'12.50'").is_none());
        assert!(registry.match_prefixed("money'12.50").is_none());
        assert!(registry.match_prefixed("'12.50'").is_none());
        assert!(registry.match_prefixed("money").is_none());
    }
}
