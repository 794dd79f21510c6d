use anyhow::{Result, anyhow};
use console::{Term, style};
use crossbeam_channel::tick;

use torprops::PanelSettings;
use torprops::cli::WatchArgs;

use crate::Session;
use crate::inspect::{print_header, print_view};

/// Refresh the chosen page on the configured interval.
pub fn watch(session: &Session, args: WatchArgs) -> Result<()> {
    let handle = session.open(&args.torrent)?;
    let stored = session
        .settings_path
        .as_deref()
        .map(PanelSettings::load_from)
        .unwrap_or_default();
    let page = args.page.unwrap_or(stored.page);
    let mut panel = session.panel_with(PanelSettings { visible: true, page });

    let term = Term::stdout();
    let ticker = tick(session.config.refresh_interval());
    let mut ticks = 0u64;

    if panel.load_torrent(&handle).is_none() {
        return Err(anyhow!("Nothing to show for this torrent"));
    }
    loop {
        if let Some(view) = panel.view() {
            if term.is_term() && ticks > 0 {
                term.clear_screen()?;
            }
            if let Some(header) = panel.header() {
                print_header(header);
            }
            print_view(view);
            println!("{}", style(format!("refresh #{}", ticks + 1)).dim());
        }
        ticks += 1;
        if args.ticks.is_some_and(|limit| ticks >= limit) {
            break;
        }

        if ticker.recv().is_err() {
            break;
        }
        panel.refresh(&handle);
    }

    // An explicit page becomes the default for the next run
    if let (Some(_), Some(path)) = (args.page, &session.settings_path) {
        if let Err(e) = panel.settings().save_to(path) {
            tracing::warn!(error = %e, "could not save panel settings");
        }
    }
    Ok(())
}
