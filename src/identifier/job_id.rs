use std::fmt;

use serde::Serialize;

use crate::error::{JobAcctError, Result};

/// A Slurm job identifier as accepted on the command line or reported by
/// accounting: `42`, `42_3` (array task), `42_[1-5]` (unexpanded array
/// range) or `42+1` (heterogeneous component).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Parse a user-supplied token.
    ///
    /// Plain ids must be positive integers and are canonicalised (`007`
    /// becomes `7`). Tokens containing `_` are array task ids and are kept
    /// verbatim as long as they start with a numeric root.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();

        if let Some((root, index)) = token.split_once('_') {
            if is_digits(root) && !index.is_empty() {
                return Ok(Self(token.to_string()));
            }
            return Err(JobAcctError::MalformedIdentifier(token.to_string()));
        }

        match token.parse::<u64>() {
            Ok(n) if n > 0 && is_digits(token) => Ok(Self(n.to_string())),
            _ => Err(JobAcctError::MalformedIdentifier(token.to_string())),
        }
    }

    /// Parse a comma-separated list of tokens, keeping input order.
    pub fn parse_list(input: &str) -> Result<Vec<Self>> {
        input.split(',').map(Self::parse).collect()
    }

    /// Wrap an identifier reported by accounting without validation.
    pub fn from_accounting(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `<root>_<index>` identifiers.
    pub fn is_array_task(&self) -> bool {
        self.0.contains('_')
    }

    /// True for a component of a heterogeneous job (`<root>+<offset>`).
    pub fn is_heterogeneous_component(&self) -> bool {
        self.0.contains('+')
    }

    /// Numeric array index of an array task, `None` for plain ids and for
    /// unexpanded ranges such as `42_[1-5]`.
    pub fn array_index(&self) -> Option<u64> {
        let (_, index) = self.0.split_once('_')?;
        if is_digits(index) {
            index.parse().ok()
        } else {
            None
        }
    }

    /// True when `self` is an array task whose parent is `parent`.
    pub fn is_child_of(&self, parent: &JobId) -> bool {
        self.0
            .strip_prefix(parent.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_id() {
        let id = JobId::parse("4242").unwrap();
        assert_eq!(id.as_str(), "4242");
        assert!(!id.is_array_task());
        assert_eq!(id.array_index(), None);
    }

    #[test]
    fn parse_canonicalises_leading_zeros() {
        assert_eq!(JobId::parse("007").unwrap().as_str(), "7");
        assert_eq!(JobId::parse(" 12 ").unwrap().as_str(), "12");
    }

    #[test]
    fn parse_array_task() {
        let id = JobId::parse("42_3").unwrap();
        assert!(id.is_array_task());
        assert_eq!(id.array_index(), Some(3));
    }

    #[test]
    fn parse_unexpanded_range_passes_through() {
        let id = JobId::parse("42_[1-5]").unwrap();
        assert!(id.is_array_task());
        assert_eq!(id.array_index(), None);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for token in ["", "abc", "0", "-5", "4.2", "42+1", "_3", "42_", "x_1"] {
            assert!(
                matches!(
                    JobId::parse(token),
                    Err(JobAcctError::MalformedIdentifier(_))
                ),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_list_keeps_order() {
        let ids = JobId::parse_list("10,42_1,7").unwrap();
        let raw: Vec<&str> = ids.iter().map(JobId::as_str).collect();
        assert_eq!(raw, vec!["10", "42_1", "7"]);
    }

    #[test]
    fn parse_list_fails_on_any_bad_token() {
        assert!(JobId::parse_list("10,foo").is_err());
        assert!(JobId::parse_list("10,,11").is_err());
    }

    #[test]
    fn child_relationship_requires_underscore_boundary() {
        let parent = JobId::parse("42").unwrap();
        assert!(JobId::from_accounting("42_0").is_child_of(&parent));
        assert!(!JobId::from_accounting("420_0").is_child_of(&parent));
        assert!(!JobId::from_accounting("42").is_child_of(&parent));
        assert!(!JobId::from_accounting("42+1").is_child_of(&parent));
    }

    #[test]
    fn heterogeneous_component() {
        assert!(JobId::from_accounting("42+1").is_heterogeneous_component());
        assert!(!JobId::from_accounting("42").is_heterogeneous_component());
    }
}
