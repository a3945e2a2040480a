use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use colored::{ColoredString, Colorize};
use tracing::debug;
use vstat_engine::{EngineConfig, SyncEngine};
use vstat_repo::{discover_root, find_repository_root, OpOutcome, RepoOp, RepoOpKind, RepositoryHandle};
use vstat_types::{CollectionId, ItemState, TrackedItem};
use walkdir::WalkDir;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Command::Status(args) => cmd_status(args, config, format),
        Command::Refresh(args) => cmd_refresh(args, config, format),
        Command::Add(args) => cmd_op(RepoOp::Stage, args.paths, config, format),
        Command::Rm(args) => cmd_op(RepoOp::Remove, args.paths, config, format),
        Command::Revert(args) => cmd_op(RepoOp::Revert, args.paths, config, format),
        Command::Diff(args) => cmd_op(RepoOp::Diff, args.paths, config, format),
        Command::Commit(args) => cmd_op(
            RepoOp::Commit { message: args.message },
            args.paths,
            config,
            format,
        ),
        Command::Branch(args) => cmd_branch(args),
    }
}

fn cmd_status(args: StatusArgs, config: EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let dir = absolutize(&args.path)?;
    let root = find_repository_root(&dir)
        .with_context(|| format!("no repository at or below {}", dir.display()))?;
    let snapshot = collect_files(&dir);
    debug!(dir = %dir.display(), files = snapshot.len(), "collected files");

    let mut engine = SyncEngine::with_git(config);
    let id = CollectionId::from_path(&root);
    engine.open_collection(id.clone(), root.clone())?;
    engine.request_full_scan(&id, snapshot)?;

    let Some(done) = engine.wait_and_dispatch(Duration::from_secs(args.timeout), &mut |_: &TrackedItem| {})
    else {
        bail!("scan did not finish within {}s", args.timeout);
    };
    engine.close_collection(&id)?;

    let mut items = done.items;
    items.retain(|item| args.all || item.state() != ItemState::UpToDate);
    items.sort_by(|a, b| a.path().cmp(b.path()));
    print_items(&items, &root, format)
}

fn cmd_refresh(args: PathsArgs, config: EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (root, mut items) = open_items(&args.paths)?;
    let mut engine = SyncEngine::with_git(config);
    let id = CollectionId::from_path(&root);
    engine.open_collection(id.clone(), root.clone())?;
    engine.request_small_update(&id, &mut items, &mut |_: &TrackedItem| {})?;
    print_items(&items, &root, format)
}

fn cmd_op(op: RepoOp, paths: Vec<PathBuf>, config: EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let (root, mut items) = open_items(&paths)?;
    let mut engine = SyncEngine::with_git(config);
    let id = CollectionId::from_path(&root);
    engine.open_collection(id.clone(), root.clone())?;

    // Current states decide what the operation may touch.
    engine.request_small_update(&id, &mut items, &mut |_: &TrackedItem| {})?;
    let (mut items, skipped) = split_applicable(op.kind(), items);
    for item in &skipped {
        debug!(path = %item.path().display(), state = %item.state(), op = %op.kind(), "operation not applicable");
        eprintln!("{} {}", "skipping".yellow(), skip_reason(item, &root));
    }
    if items.is_empty() {
        println!("Nothing to {}.", op.kind());
        return print_items(&skipped, &root, format);
    }

    let outcome = engine
        .perform(&id, &op, &mut items, &mut |_: &TrackedItem| {})
        .with_context(|| format!("{} failed", op.kind()))?;
    items.extend(skipped);

    match outcome {
        OpOutcome::Applied { paths } => {
            println!("{} {} {} path(s)", "✓".green().bold(), op.kind(), paths);
        }
        OpOutcome::Committed { id: commit } => {
            println!("{} Committed {}", "✓".green().bold(), short_id(&commit).yellow());
        }
        OpOutcome::Diff(patch) => {
            print_patch(&patch);
            return Ok(());
        }
        OpOutcome::Skipped => {
            println!("Nothing to {}.", op.kind());
        }
    }
    print_items(&items, &root, format)
}

fn cmd_branch(args: BranchArgs) -> anyhow::Result<()> {
    let dir = absolutize(&args.path)?;
    let root = discover_root(&dir).with_context(|| format!("no repository at {}", dir.display()))?;
    let handle = RepositoryHandle::open(&root)?;
    match handle.current_branch()? {
        Some(branch) => println!("* {}", branch.green().bold()),
        None => println!("{}", "(no branch)".dimmed()),
    }
    Ok(())
}

/// Resolve the repository of the first path and track every path.
fn open_items(paths: &[PathBuf]) -> anyhow::Result<(PathBuf, Vec<TrackedItem>)> {
    let absolute = paths
        .iter()
        .map(|path| absolutize(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let Some(first) = absolute.first() else {
        bail!("no paths given");
    };
    let root = discover_root(first)
        .with_context(|| format!("{} is not inside a repository", first.display()))?;
    let items = absolute.into_iter().map(TrackedItem::file).collect();
    Ok((root, items))
}

/// Partition `items` into those `kind` applies to and the rest.
fn split_applicable(kind: RepoOpKind, items: Vec<TrackedItem>) -> (Vec<TrackedItem>, Vec<TrackedItem>) {
    items
        .into_iter()
        .partition(|item| kind.applicable_to(item.state()))
}

fn skip_reason(item: &TrackedItem, root: &Path) -> String {
    let shown = item
        .relative_path(root)
        .unwrap_or_else(|| item.path().display().to_string());
    let allowed: Vec<String> = RepoOpKind::applicable(item.state())
        .iter()
        .map(ToString::to_string)
        .collect();
    if allowed.is_empty() {
        format!("{shown} ({})", item.state().label())
    } else {
        format!("{shown} ({}; try {})", item.state().label(), allowed.join(", "))
    }
}

/// Every file under `dir`, skipping `.git`.
fn collect_files(dir: &Path) -> Vec<TrackedItem> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| TrackedItem::file(entry.into_path()))
        .collect()
}

/// Make `path` absolute without requiring it to exist.
fn absolutize(path: &Path) -> anyhow::Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    let name = path
        .file_name()
        .with_context(|| format!("invalid path {}", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = parent
        .canonicalize()
        .with_context(|| format!("directory {} not found", parent.display()))?;
    Ok(parent.join(name))
}

fn print_items(items: &[TrackedItem], root: &Path, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Text => {
            for item in items {
                let shown = item
                    .relative_path(root)
                    .unwrap_or_else(|| item.path().display().to_string());
                println!("{}  {}", paint(item.state()), shown);
            }
        }
    }
    Ok(())
}

fn paint(state: ItemState) -> ColoredString {
    let label = format!("{:>17}", state.label());
    match state {
        ItemState::Added => label.green(),
        ItemState::Modified => label.yellow(),
        ItemState::Removed | ItemState::Missing => label.red(),
        ItemState::Conflicted => label.red().bold(),
        ItemState::Untracked => label.cyan(),
        ItemState::UntrackedMissing => label.dimmed(),
        ItemState::UpToDate => label.normal(),
    }
}

fn print_patch(patch: &str) {
    if patch.is_empty() {
        println!("No changes.");
        return;
    }
    for line in patch.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}
