use anyhow::{Context, Result, anyhow};
use console::style;
use std::time::Duration;

use torprops::cli::{MoveArgs, PriorityArgs, RenameArgs, SeedsAction, SeedsArgs};
use torprops::{MetainfoHandle, RenameOutcome};

use crate::{Session, find_node};

/// Longest wait for old folders to be removed after a rename.
const CLEANUP_WAIT: Duration = Duration::from_secs(5);

fn save(handle: &mut MetainfoHandle) -> Result<()> {
    handle.persist().context("Failed to save resume data")?;
    if let Some(path) = handle.resume_path() {
        tracing::debug!(path = %path.display(), "resume data saved");
    }
    Ok(())
}

pub fn rename(session: &Session, args: RenameArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let mut panel = session.panel();
    panel.load_torrent(&handle);
    let node = find_node(&panel, &args.path)?;

    match panel.rename(&mut handle, node, &args.new_name)? {
        RenameOutcome::Unchanged => println!("No changes made."),
        RenameOutcome::Renamed { files, recheck } => {
            println!(
                "Renamed {} to {} ({} file{})",
                style(&args.path).cyan(),
                style(&args.new_name).cyan(),
                files,
                if files == 1 { "" } else { "s" }
            );
            if recheck {
                println!("{}", style("Existing data found at the destination, torrent rechecked.").yellow());
            }
        }
    }

    for outcome in panel.wait_cleanups(CLEANUP_WAIT) {
        if outcome.removed {
            println!("Removed old folder: {}", style(outcome.dir.display()).dim());
        }
    }
    save(&mut handle)
}

pub fn priority(session: &Session, args: PriorityArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let mut panel = session.panel();
    panel.load_torrent(&handle);
    let nodes = args
        .paths
        .iter()
        .map(|path| find_node(&panel, path))
        .collect::<Result<Vec<_>>>()?;

    panel.set_priority(&mut handle, &nodes, args.level)?;
    for path in &args.paths {
        println!("{}: {}", path, style(args.level).bold());
    }
    save(&mut handle)
}

pub fn seeds(session: &Session, args: SeedsArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let mut panel = session.panel();
    panel.load_torrent(&handle);

    match args.action {
        SeedsAction::List => {}
        SeedsAction::Add { url } => {
            panel.add_url_seed(&mut handle, &url)?;
            save(&mut handle)?;
        }
        SeedsAction::Remove { urls } => {
            let unknown: Vec<_> = urls.iter().filter(|url| !panel.url_seeds().contains(*url)).collect();
            if !unknown.is_empty() {
                tracing::warn!(?unknown, "not in the url seed list");
            }
            panel.remove_url_seeds(&mut handle, &urls)?;
            save(&mut handle)?;
        }
    }

    for url in panel.url_seeds() {
        println!("{}", url);
    }
    Ok(())
}

pub fn move_storage(session: &Session, args: MoveArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let mut panel = session.panel();
    panel.load_torrent(&handle);

    let shown = panel
        .change_save_path(&mut handle, &args.dir)?
        .ok_or_else(|| anyhow!("Torrent is not available"))?;
    println!("Save path: {}", style(shown).cyan());
    save(&mut handle)
}
