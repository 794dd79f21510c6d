use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};

use torprops::cli::RecheckArgs;

use crate::Session;

static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "OK");
static WARN: Emoji<'_, '_> = Emoji("⚠️ ", "WARN");

pub fn recheck(session: &Session, args: RecheckArgs) -> Result<()> {
    let mut handle = session.open(&args.torrent)?;
    let name = handle.metainfo().info.name.clone();
    let total = handle.num_pieces();

    println!("Checking torrent: {}", style(&name).bold());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pieces ({eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    let verified = handle.recheck(Some(&pb)).context("Recheck failed")?;
    pb.finish_and_clear();

    if verified == total {
        println!("{} {}", SUCCESS, style(format!("All {} pieces verified", total)).green().bold());
    } else {
        println!(
            "{} {}",
            WARN,
            style(format!("{} of {} pieces verified", verified, total)).yellow().bold()
        );
    }

    handle.persist().context("Failed to save resume data")
}
