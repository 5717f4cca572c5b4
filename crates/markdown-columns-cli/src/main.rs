mod app;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_columns_config::Config;
use markdown_columns_engine::io;
use ratatui::{Terminal, backend::CrosstermBackend};
use relative_path::RelativePathBuf;
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};

use app::App;

/// Longest wait for input when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Log to a file: the terminal belongs to the UI.
fn init_logging() {
    let log_path = env::temp_dir().join("markdown-columns.log");
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env();
    if let Ok(file) = File::create(&log_path) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
}

/// Split the file argument into a notes root and a path relative to it.
///
/// The configured notes directory is used when the file lives inside it,
/// otherwise the file's own directory.
fn locate_note(file: &Path, config: Option<&Config>) -> Result<(PathBuf, RelativePathBuf)> {
    let file = file
        .canonicalize()
        .with_context(|| format!("cannot open {}", file.display()))?;

    let configured = config
        .and_then(|c| c.notes_path.as_ref())
        .and_then(|p| p.canonicalize().ok())
        .filter(|root| file.starts_with(root));
    let root = match configured {
        Some(root) => root,
        None => file
            .parent()
            .map(Path::to_path_buf)
            .context("file has no parent directory")?,
    };

    io::validate_notes_dir(&root)?;
    let relative = RelativePathBuf::from_path(file.strip_prefix(&root)?)?;
    Ok((root, relative))
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <note.md>", args[0]);
        process::exit(1);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: ignoring config file {}: {e}",
                Config::config_path().display()
            );
            None
        }
    };

    let (notes_root, file) = match locate_note(Path::new(&args[1]), config.as_ref()) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };
    log::info!("opening {file} in {}", notes_root.display());

    let settings = config.map(|c| c.columns).unwrap_or_default();
    let mut app = App::open(notes_root, file, settings)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Sleep until input arrives or the next deferred write is due.
        let timeout = app
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key, Instant::now())? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }

        app.tick(Instant::now())?;
    }
}
