use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::{BaseDirs, ProjectDirs};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{env, fs::File, io, path::PathBuf, time::Duration};

use hostdeck::{connect, ui, App, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let settings = Settings::load().await.unwrap_or_else(|e| {
        log::error!("Failed to load settings: {}", e);
        Settings::default()
    });

    let cli_path = env::args().nth(1).map(PathBuf::from);
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    let config_path = settings.resolve_ssh_config_path(cli_path, home.as_deref());
    log::info!("Using SSH config: {}", config_path.display());

    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialize terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        eprintln!("Failed to configure terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, config_path);
    let res = run_app(&mut terminal, &mut app).await;

    restore_terminal()?;

    if let Err(err) = res {
        log::error!("Application error: {}", err);
        eprintln!("Error: {}", err);
        return Err(err);
    }

    if let Some(host) = app.take_connection() {
        if let Err(e) = connect::connect(&host, app.settings.shell.as_deref()) {
            log::error!("SSH connection failed: {:#}", e);
            eprintln!("SSH connection failed: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Log to `hostdeck.log` in the data directory; stderr would draw over the UI.
fn init_logging() {
    let mut logger = env_logger::Builder::from_default_env();
    if env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("hostdeck", LevelFilter::Debug);
        logger.filter_module("sshconf", LevelFilter::Debug);
    }

    if let Some(file) = open_log_file() {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();
}

fn open_log_file() -> Option<File> {
    let dirs = ProjectDirs::from("com", "hostdeck", "hostdeck")?;
    let dir = dirs.data_local_dir();
    std::fs::create_dir_all(dir).ok()?;
    File::create(dir.join("hostdeck.log")).ok()
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    log::info!("Starting main application loop");

    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();

        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Err(e) = app.handle_key_event(key).await {
                        log::error!("Key event handling error: {}", e);
                        app.status.set_error(e.to_string());
                    }
                }
                Event::Mouse(mouse) => {
                    let area = terminal.size()?;
                    app.handle_mouse_event(mouse, area);
                }
                Event::Resize(width, height) => {
                    log::debug!("Terminal resized to {}x{}", width, height);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
