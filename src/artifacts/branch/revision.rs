use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;

/// What a name given to checkout refers to
///
/// Resolution order:
/// 1. an existing branch
/// 2. a full 40-character commit id present in the store (detached HEAD)
/// 3. a new branch to create at the current commit
///
/// A 40-character hex string that names no branch and no stored commit is an
/// unknown revision rather than a request for a new branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Branch { name: BranchName, oid: ObjectId },
    Commit(ObjectId),
    NewBranch(BranchName),
}

impl Revision {
    pub async fn resolve<F: FileSystem>(
        name: &str,
        refs: &Refs<F>,
        database: &Database<F>,
    ) -> Result<Self> {
        let branch_name = BranchName::try_parse(name);

        if let Ok(branch_name) = &branch_name
            && let Some(oid) = refs.read_branch(branch_name).await?
        {
            return Ok(Revision::Branch {
                name: branch_name.clone(),
                oid,
            });
        }

        if Self::looks_like_oid(name) {
            return Self::resolve_commit(name, database).await.map(Revision::Commit);
        }

        branch_name.map(Revision::NewBranch)
    }

    fn looks_like_oid(name: &str) -> bool {
        name.len() == OBJECT_ID_LENGTH && name.chars().all(|c| c.is_ascii_hexdigit())
    }

    async fn resolve_commit<F: FileSystem>(name: &str, database: &Database<F>) -> Result<ObjectId> {
        let unknown = || VcsError::UnknownRevision(name.to_string());
        let oid = ObjectId::try_parse(name).map_err(|_| unknown())?;

        match database.get(&oid).await {
            Ok((ObjectType::Commit, _)) => Ok(oid),
            Ok(_) | Err(VcsError::NotFound(_)) => Err(unknown()),
            Err(e) => Err(e),
        }
    }
}
