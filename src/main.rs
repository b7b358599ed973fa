//! pantrypal - Pantry tracker and recipe finder
//!
//! Run without a command for the terminal UI, or with one of the CLI
//! subcommands for scripting. Both operate on the same data folder, and a
//! running TUI picks up changes made by the CLI or by another TUI.

use crate::app::App;
use crate::cli::{Cli, CliContext};
use clap::Parser;
use color_eyre::{Report, Result, eyre::eyre};
use pantrypal::config::{Config, ConfigSource};
use pantrypal::logging::{self, LogTarget};
use pantrypal::models::Catalog;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event},
        execute,
        terminal::{
            Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
            enable_raw_mode,
        },
    },
};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::info;

mod app;
mod cli;
mod handlers;
mod ui;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    let (config, source) = Config::load(args.config.as_deref())?;
    let data_dir = config.resolve_data_dir(args.data_dir.as_deref())?;

    let target = if args.command.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File {
            data_dir: &data_dir,
        }
    };
    logging::init(&config.logging, target)?;

    match &source {
        ConfigSource::File(path) => info!(config = %path.display(), "Loaded configuration"),
        ConfigSource::Defaults => info!("No config file found, using defaults"),
    }

    let catalog = Catalog::builtin()?;

    match args.command {
        Some(command) => {
            let ctx = CliContext {
                config,
                data_dir,
                catalog,
            };
            cli::execute_cli(command, &ctx).map_err(report)?;
        }
        None => run_tui(&config, &data_dir, catalog)?,
    }

    Ok(())
}

/// Keep the whole context chain of a glue-code error in the report
fn report(error: anyhow::Error) -> Report {
    eyre!("{:#}", error)
}

/// Terminal setup, the event loop, and terminal cleanup
fn run_tui(config: &Config, data_dir: &Path, catalog: Catalog) -> Result<()> {
    let mut app = App::new(config, data_dir, catalog).map_err(report)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("TUI closed");
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut should_quit = false;

    while !should_quit {
        if app.needs_redraw {
            force_redraw(terminal, app)?;
            app.needs_redraw = false;
        } else {
            terminal.draw(|frame| app.render(frame))?;
        }

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => should_quit = handlers::keys::handle_key_events(key, app),
                Event::Resize(_, _) => app.needs_redraw = true,
                _ => {}
            }
        }
        app.tick();
    }

    Ok(())
}

/// Clear the screen and draw from scratch, e.g. after a resize
fn force_redraw<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<()> {
    terminal.clear()?;
    execute!(io::stdout(), Clear(ClearType::All))?;
    terminal.draw(|frame| app.render(frame))?;
    Ok(())
}
