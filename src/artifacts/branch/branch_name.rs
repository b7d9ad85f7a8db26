use crate::artifacts::branch::{HEADS_PREFIX, INVALID_BRANCH_NAME_REGEX};
use crate::errors::{Result, VcsError};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(VcsError::InvalidBranchName(
                "branch name cannot be empty".to_string(),
            ));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|e| VcsError::corrupt(format!("invalid branch name pattern: {e}")))?;

        if re.is_match(&name) {
            Err(VcsError::InvalidBranchName(name))
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic ref such as `refs/heads/master`
    pub fn try_parse_ref_path(ref_path: &str) -> Result<Self> {
        let name = ref_path.strip_prefix(HEADS_PREFIX).ok_or_else(|| {
            VcsError::corrupt(format!(
                "symbolic ref must start with '{HEADS_PREFIX}', got '{ref_path}'"
            ))
        })?;

        Self::try_parse(name)
    }

    /// `refs/heads/<name>`
    pub fn ref_path(&self) -> String {
        format!("{HEADS_PREFIX}{}", self.0)
    }

    /// Location of the branch file relative to the git dir
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(self.ref_path())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;

    #[test]
    fn ref_path_round_trips_hierarchical_names() {
        let branch = BranchName::try_parse("feature/docs").unwrap();

        assert_eq!(branch.ref_path(), "refs/heads/feature/docs");
        assert_eq!(BranchName::try_parse_ref_path(&branch.ref_path()).unwrap(), branch);
    }

    #[test]
    fn symbolic_refs_outside_heads_are_rejected() {
        assert!(BranchName::try_parse_ref_path("refs/tags/v1").is_err());
    }

    proptest! {
        #[test]
        fn alphanumeric_names_are_valid(branch_name in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(branch_name).is_ok());
        }

        #[test]
        fn names_with_slashes_are_valid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}/{suffix}")).is_ok());
        }

        #[test]
        fn names_starting_with_a_dot_are_invalid(suffix in "[a-zA-Z0-9_-]+") {
            assert!(matches!(
                BranchName::try_parse(format!(".{suffix}")),
                Err(VcsError::InvalidBranchName(_))
            ));
        }

        #[test]
        fn names_ending_with_lock_are_invalid(prefix in "[a-zA-Z0-9_-]+") {
            assert!(BranchName::try_parse(format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn names_with_consecutive_dots_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix}..{suffix}")).is_err());
        }

        #[test]
        fn names_with_whitespace_are_invalid(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(BranchName::try_parse(format!("{prefix} {suffix}")).is_err());
        }
    }
}
