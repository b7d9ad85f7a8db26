//! References (branches and HEAD)
//!
//! References are human-readable names pointing to commits:
//! - HEAD: the current branch (`ref: refs/heads/<name>`) or, when detached,
//!   a bare commit id
//! - Branches: files under `refs/heads/` holding the tip commit id
//!
//! A branch HEAD points at may not exist yet (an unborn branch before the
//! first commit).

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Result, VcsError};
use crate::fs::{FileSystem, mkdir_p, try_read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";

/// What HEAD currently selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(BranchName),
    Detached(ObjectId),
}

#[derive(Debug)]
pub struct Refs<F> {
    fs: Arc<F>,
    /// The git dir
    path: Box<Path>,
}

impl<F: FileSystem> Refs<F> {
    pub fn new(fs: Arc<F>, path: Box<Path>) -> Self {
        Refs { fs, path }
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs").join("heads")
    }

    fn branch_path(&self, branch_name: &BranchName) -> PathBuf {
        self.path.join(branch_name.to_path())
    }

    async fn read_ref_file(&self, path: &Path) -> Result<Option<String>> {
        let content = try_read(self.fs.as_ref(), path)
            .await
            .map_err(|e| VcsError::store_io(path, e))?;

        let Some(content) = content else {
            return Ok(None);
        };
        let content = String::from_utf8(content.to_vec())
            .map_err(|_| VcsError::corrupt(format!("ref file {path:?} is not UTF-8")))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content.to_string()))
        }
    }

    async fn write_ref_file(&self, path: &Path, raw_ref: String) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| VcsError::corrupt(format!("invalid ref path {path:?}")))?;
        mkdir_p(self.fs.as_ref(), parent)
            .await
            .map_err(|e| VcsError::store_io(parent, e))?;

        self.fs
            .write_file(path, format!("{raw_ref}\n").as_bytes())
            .await
            .map_err(|e| VcsError::store_io(path, e))
    }

    pub async fn read_head_target(&self) -> Result<Head> {
        let head_path = self.head_path();
        let content = self
            .read_ref_file(&head_path)
            .await?
            .ok_or_else(|| VcsError::NotFound(HEAD_REF_NAME.to_string()))?;

        let symref = regex::Regex::new(SYMREF_REGEX)
            .map_err(|e| VcsError::corrupt(format!("invalid symref pattern: {e}")))?
            .captures(&content)
            .map(|captures| captures[1].to_string());

        match symref {
            Some(ref_path) => Ok(Head::Branch(BranchName::try_parse_ref_path(&ref_path)?)),
            None => Ok(Head::Detached(ObjectId::try_parse(content)?)),
        }
    }

    /// Commit HEAD resolves to, `None` on an unborn branch
    pub async fn read_head(&self) -> Result<Option<ObjectId>> {
        match self.read_head_target().await? {
            Head::Branch(branch_name) => self.read_branch(&branch_name).await,
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Move whatever HEAD selects to `oid`: the current branch's tip, or
    /// HEAD itself when detached
    pub async fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.read_head_target().await? {
            Head::Branch(branch_name) => self.update_branch(&branch_name, oid).await,
            Head::Detached(_) => self.set_head_detached(oid).await,
        }
    }

    pub async fn set_head_branch(&self, branch_name: &BranchName) -> Result<()> {
        self.write_ref_file(&self.head_path(), format!("ref: {}", branch_name.ref_path()))
            .await
    }

    pub async fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        self.write_ref_file(&self.head_path(), oid.to_string()).await
    }

    pub async fn read_branch(&self, branch_name: &BranchName) -> Result<Option<ObjectId>> {
        self.read_ref_file(&self.branch_path(branch_name))
            .await?
            .map(ObjectId::try_parse)
            .transpose()
    }

    pub async fn branch_exists(&self, branch_name: &BranchName) -> Result<bool> {
        Ok(self.read_branch(branch_name).await?.is_some())
    }

    pub async fn update_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> Result<()> {
        self.write_ref_file(&self.branch_path(branch_name), oid.to_string())
            .await
    }

    pub async fn create_branch(&self, branch_name: &BranchName, source_oid: &ObjectId) -> Result<()> {
        if self.branch_exists(branch_name).await? {
            return Err(VcsError::InvalidBranchName(format!(
                "a branch named '{branch_name}' already exists"
            )));
        }

        self.update_branch(branch_name, source_oid).await
    }

    pub async fn current_branch(&self) -> Result<Option<BranchName>> {
        match self.read_head_target().await? {
            Head::Branch(branch_name) => Ok(Some(branch_name)),
            Head::Detached(_) => Ok(None),
        }
    }

    /// Every branch with a tip commit, sorted by name
    pub async fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();
        let mut pending = vec![heads_path.clone()];

        while let Some(dir) = pending.pop() {
            let names = match self.fs.readdir(&dir).await {
                Ok(names) => names,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(VcsError::store_io(dir, e)),
            };

            for name in names {
                let path = dir.join(name);
                let stat = self
                    .fs
                    .stat(&path)
                    .await
                    .map_err(|e| VcsError::store_io(&path, e))?;

                if stat.is_dir() {
                    pending.push(path);
                } else if let Some(name) = path
                    .strip_prefix(&heads_path)
                    .ok()
                    .and_then(|relative| relative.to_str())
                {
                    branches.push(BranchName::try_parse(name)?);
                }
            }
        }

        branches.sort();
        Ok(branches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn refs() -> Refs<MemoryFs> {
        Refs::new(
            Arc::new(MemoryFs::new()),
            PathBuf::from("/.git").into_boxed_path(),
        )
    }

    fn oid(digit: char) -> ObjectId {
        ObjectId::try_parse(digit.to_string().repeat(40)).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn unborn_branch_resolves_to_nothing(refs: Refs<MemoryFs>) {
        refs.set_head_branch(&branch("master")).await.unwrap();

        assert_eq!(refs.read_head().await.unwrap(), None);
        assert_eq!(refs.current_branch().await.unwrap(), Some(branch("master")));
        assert!(refs.list_branches().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn update_head_moves_the_current_branch(refs: Refs<MemoryFs>) {
        refs.set_head_branch(&branch("master")).await.unwrap();

        refs.update_head(&oid('a')).await.unwrap();

        assert_eq!(refs.read_branch(&branch("master")).await.unwrap(), Some(oid('a')));
        assert_eq!(refs.read_head().await.unwrap(), Some(oid('a')));
        let head = refs.fs.read_file(&refs.head_path()).await.unwrap();
        assert_eq!(&head[..], b"ref: refs/heads/master\n");
    }

    #[rstest]
    #[tokio::test]
    async fn detached_head_is_updated_in_place(refs: Refs<MemoryFs>) {
        refs.set_head_detached(&oid('b')).await.unwrap();

        refs.update_head(&oid('c')).await.unwrap();

        assert_eq!(refs.read_head_target().await.unwrap(), Head::Detached(oid('c')));
        assert_eq!(refs.current_branch().await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn branches_are_listed_by_name(refs: Refs<MemoryFs>) {
        refs.create_branch(&branch("master"), &oid('a')).await.unwrap();
        refs.create_branch(&branch("feature/docs"), &oid('b')).await.unwrap();
        refs.create_branch(&branch("draft"), &oid('c')).await.unwrap();

        assert_eq!(
            refs.list_branches().await.unwrap(),
            vec![branch("draft"), branch("feature/docs"), branch("master")]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_branches_are_rejected(refs: Refs<MemoryFs>) {
        refs.create_branch(&branch("master"), &oid('a')).await.unwrap();

        let result = refs.create_branch(&branch("master"), &oid('b')).await;

        assert!(matches!(result, Err(VcsError::InvalidBranchName(_))));
        assert_eq!(refs.read_branch(&branch("master")).await.unwrap(), Some(oid('a')));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_head_is_not_found(refs: Refs<MemoryFs>) {
        assert!(matches!(
            refs.read_head_target().await,
            Err(VcsError::NotFound(_))
        ));
    }
}
