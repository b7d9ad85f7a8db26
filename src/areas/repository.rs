use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Author;
use crate::config::RepositoryConfig;
use crate::errors::{Result, VcsError};
use crate::fs::FileSystem;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// Commit identity held by the handle
#[derive(Debug, Clone)]
enum Identity {
    /// Stamped with the current time at each commit
    Current(Author),
    /// Used exactly as given, timestamp included
    Pinned(Author),
}

/// An open repository
///
/// All state lives in the handle; nothing is process-wide. The index mutex
/// doubles as the repository lock: mutating operations hold it from start to
/// finish, read-only operations hold it just long enough to snapshot the
/// index and HEAD.
pub struct Repository<F> {
    fs: Arc<F>,
    config: RepositoryConfig,
    index: Arc<Mutex<Index>>,
    database: Database<F>,
    workspace: Workspace<F>,
    refs: Refs<F>,
    identity: RwLock<Option<Identity>>,
}

impl<F: FileSystem> Repository<F> {
    pub(crate) fn new(config: RepositoryConfig, fs: Arc<F>) -> Self {
        let git_dir = config.git_dir();

        let index = Index::new(git_dir.join("index").into_boxed_path());
        let database = Database::new(fs.clone(), git_dir.join("objects").into_boxed_path());
        let workspace = Workspace::new(fs.clone(), config.clone());
        let refs = Refs::new(fs.clone(), git_dir.into_boxed_path());

        Repository {
            fs,
            config,
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            identity: RwLock::new(None),
        }
    }

    pub fn fs(&self) -> &Arc<F> {
        &self.fs
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database<F> {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace<F> {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs<F> {
        &self.refs
    }

    /// Identity for subsequent commits, stamped with the time of each commit
    pub fn set_author(&self, name: impl Into<String>, email: impl Into<String>) {
        self.replace_identity(Identity::Current(Author::new(name, email)));
    }

    /// Identity for subsequent commits, timestamp included
    pub fn pin_author(&self, author: Author) {
        self.replace_identity(Identity::Pinned(author));
    }

    fn replace_identity(&self, identity: Identity) {
        let mut slot = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(identity);
    }

    /// The author to record on a commit made now
    pub(crate) fn commit_author(&self) -> Result<Author> {
        let slot = self
            .identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match slot.as_ref() {
            Some(Identity::Current(author)) => Ok(author.restamped()),
            Some(Identity::Pinned(author)) => Ok(author.clone()),
            None => Err(VcsError::MissingAuthor),
        }
    }
}

impl<F> std::fmt::Debug for Repository<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
