use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docvcs::artifacts::log::rev_list::LogEntry;
use docvcs::config::{DEFAULT_BRANCH, DEFAULT_NAMESPACE};
use docvcs::{Author, DiskFs, Repository, RepositoryConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docvcs",
    version = "0.1.0",
    about = "Version control for a document namespace",
    long_about = "Tracks the files under one namespace of a directory with git-compatible \
    objects, index and refs. Paths given to commands are relative to the namespace \
    unless they start with '/'.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(
        short = 'C',
        long,
        global = true,
        help = "Host directory backing the repository (defaults to the current directory)"
    )]
    root: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_NAMESPACE,
        help = "Tracked namespace, as an absolute path inside the repository"
    )]
    namespace: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Create the repository layout")]
    Init {
        #[arg(long, default_value = DEFAULT_BRANCH, help = "Name of the initial branch")]
        initial_branch: String,
    },
    #[command(name = "add", about = "Stage files or directories")]
    Add {
        #[arg(index = 1, required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "rm", about = "Unstage files, optionally deleting them")]
    Remove {
        #[arg(short, long, help = "Delete the files from the working tree as well")]
        force: bool,
        #[arg(index = 1, required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "status", about = "Show the status of one path or of the whole namespace")]
    Status {
        #[arg(index = 1)]
        path: Option<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Record the staged files as a new commit",
        long_about = "Creates a commit from the index. The author is read from \
        GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL and the optional GIT_AUTHOR_DATE."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the history reachable from HEAD")]
    Log {
        #[arg(long, help = "One line per commit")]
        oneline: bool,
    },
    #[command(name = "checkout", about = "Switch to a branch or commit, creating new branches")]
    Checkout {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "show", about = "Print a file as recorded in a tree")]
    Show {
        #[arg(index = 1, help = "The tree id")]
        tree: String,
        #[arg(index = 2)]
        path: PathBuf,
    },
    #[command(name = "ls-files", about = "List staged files")]
    LsFiles,
    #[command(name = "branch", about = "List branches")]
    Branch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let fs = Arc::new(DiskFs::new(root));
    let mut config = RepositoryConfig::with_namespace(&cli.namespace);

    if let Commands::Init { initial_branch } = &cli.command {
        config.default_branch = initial_branch.clone();
        Repository::init(config.clone(), fs)
            .await
            .context("Failed to initialize the repository")?;
        println!("Initialized empty repository in {}", config.git_dir().display());
        return Ok(());
    }

    let repository = Repository::open(config, fs)
        .await
        .context("Not a repository (run `docvcs init` first)")?;

    match &cli.command {
        Commands::Init { .. } => {}
        Commands::Add { paths } => {
            for path in paths {
                let path = namespaced(&cli.namespace, path);
                repository
                    .add(&path)
                    .await
                    .with_context(|| format!("Failed to add {}", path.display()))?;
            }
        }
        Commands::Remove { force, paths } => {
            for path in paths {
                let path = namespaced(&cli.namespace, path);
                repository
                    .remove(&path, *force)
                    .await
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Commands::Status { path: Some(path) } => {
            let path = namespaced(&cli.namespace, path);
            let status = repository.status(&path).await?;
            println!("{} {}", status.colored(), path.display());
        }
        Commands::Status { path: None } => {
            let report = repository.status_all().await?;
            for (path, status) in report.changes() {
                println!("{} {}", status.colored(), path.display());
            }
            for path in &report.unreadable {
                eprintln!("warning: could not read {}", path.display());
            }
        }
        Commands::Commit { message } => {
            let author = Author::load_from_env()
                .context("GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL must be set")?;
            repository.pin_author(author);

            let is_root = repository.log().await?.is_empty();
            let commit_id = repository.commit(message).await?;
            println!(
                "[{}{}] {}",
                if is_root { "(root-commit) " } else { "" },
                commit_id.to_short_oid(),
                message.lines().next().unwrap_or_default()
            );
        }
        Commands::Log { oneline } => {
            for entry in repository.log().await? {
                if *oneline {
                    println!("{} {}", entry.oid.to_short_oid(), entry.commit.short_message());
                } else {
                    print_medium(&entry);
                }
            }
        }
        Commands::Checkout { name } => {
            repository
                .checkout(name)
                .await
                .with_context(|| format!("Failed to check out {name}"))?;
            match repository.current_branch().await? {
                Some(branch) => println!("Switched to branch '{branch}'"),
                None => println!("HEAD is now at {}", &name[..name.len().min(7)]),
            }
        }
        Commands::Show { tree, path } => {
            let path = namespaced(&cli.namespace, path);
            let content = repository
                .read_obj_from_tree(tree, &path)
                .await?
                .with_context(|| format!("{} not found in tree {tree}", path.display()))?;
            print!("{}", String::from_utf8_lossy(&content));
        }
        Commands::LsFiles => {
            for path in repository.list_files().await? {
                println!("{}", path.display());
            }
        }
        Commands::Branch => {
            let current = repository.current_branch().await?;
            for branch in repository.branches().await? {
                let marker = if current.as_ref() == Some(&branch) { "*" } else { " " };
                println!("{marker} {branch}");
            }
        }
    }

    repository.close().await?;
    Ok(())
}

/// Resolve a command-line path against the namespace
fn namespaced(namespace: &Path, path: &Path) -> PathBuf {
    if path.has_root() {
        path.to_path_buf()
    } else {
        namespace.join(path)
    }
}

fn print_medium(entry: &LogEntry) {
    let author = entry.commit.author();

    println!("commit {}", entry.oid);
    println!("Author: {}", author.display_name());
    println!("Date:   {}", author.readable_timestamp());
    println!();
    for line in entry.commit.message().lines() {
        println!("    {line}");
    }
    println!();
}
