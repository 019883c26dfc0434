//! Repository identifier parsing.

use super::UpstreamError;
use std::fmt;

/// A validated GitHub repository identifier in "owner/name" format.
///
/// Each segment is non-empty and contains only ASCII letters, digits,
/// `_`, `.` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName {
    /// Repository owner (user or organization).
    owner: String,

    /// Repository name.
    name: String,
}

impl RepoName {
    /// Parses and validates an "owner/name" identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidFormat`] if the identifier does not
    /// match the grammar.
    pub fn parse(repo: &str) -> Result<Self, UpstreamError> {
        let invalid = || UpstreamError::InvalidFormat {
            repo: repo.to_string(),
        };

        let (owner, name) = repo.split_once('/').ok_or_else(invalid)?;
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full "owner/name" identifier.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Returns true if `repo` is a valid "owner/name" identifier.
#[must_use]
pub fn is_valid_repo_format(repo: &str) -> bool {
    RepoName::parse(repo).is_ok()
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.chars().all(|c| c == '.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let repo = RepoName::parse("rust-lang/rust.vim").unwrap();
        assert_eq!(repo.owner(), "rust-lang");
        assert_eq!(repo.name(), "rust.vim");
        assert_eq!(repo.full_name(), "rust-lang/rust.vim");
    }

    #[test]
    fn accepts_underscores_dots_and_digits() {
        assert!(is_valid_repo_format("octo_org/demo_2.0"));
        assert!(is_valid_repo_format("a/b"));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for repo in [
            "not-a-valid-id",
            "",
            "/",
            "owner/",
            "/name",
            "owner/name/extra",
            "owner/na me",
            "own@r/name",
            "owner/näme",
        ] {
            assert!(
                matches!(
                    RepoName::parse(repo),
                    Err(UpstreamError::InvalidFormat { .. })
                ),
                "{repo:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_dot_only_segments() {
        for repo in ["./name", "owner/.", "owner/..", "../..", ".../name"] {
            assert!(!is_valid_repo_format(repo), "{repo:?} should be rejected");
        }
        assert!(is_valid_repo_format("octo-org/.github"));
        assert!(is_valid_repo_format("owner/..name"));
    }
}
