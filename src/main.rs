//! Scroll-effect engine with a terminal page preview.
//!
//! `scrollfx preview` opens an interactive view of a simulated page.
//! `scrollfx replay --to Y` scrolls the page headlessly and prints the
//! classes and styles every effect left behind.

use std::io::{self, stderr, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use scrollfx::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    replay::{self, ReplayPlan},
    runtime::{PageEvent, PageRuntime},
    state::AppState,
};
use scrollfx::config::{self, AppConfig};
use scrollfx::page::{
    dom::{Bindings, Document},
    sim::SimDocument,
    store::{FileStore, KeyValueStore},
};
use scrollfx::ui::{
    inspector::InspectorWidget, layout::AppLayout, page_view::PageView, theme::Palette,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-driven page effects in the terminal")]
struct Cli {
    /// Config file (defaults to `$XDG_CONFIG_HOME/scrollfx/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Page storage file holding the theme preference.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive preview (default).
    Preview {
        /// Page layout TOML (defaults to the bundled portfolio).
        layout: Option<PathBuf>,
    },
    /// Scroll headlessly and print the resulting element states.
    Replay {
        layout: Option<PathBuf>,
        /// Final scroll offset in pixels.
        #[arg(long, default_value_t = 0.0)]
        to: f64,
        /// Pixels per scroll event.
        #[arg(long, default_value_t = 40.0)]
        step: f64,
    },
    /// Write the current config (defaults included) to the config file.
    InitConfig,
}

fn load_layout(path: Option<&PathBuf>) -> Result<SimDocument> {
    match path {
        Some(p) => SimDocument::from_path(p)
            .with_context(|| format!("loading layout {}", p.display())),
        None => SimDocument::demo().context("loading bundled layout"),
    }
}

fn open_store(path: Option<PathBuf>) -> FileStore {
    match path {
        Some(p) => FileStore::open(p),
        None => FileStore::open_default(),
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let user_config = AppConfig::load_from(&config_path);

    match cli.command.unwrap_or(Command::Preview { layout: None }) {
        Command::Preview { layout } => {
            let doc = load_layout(layout.as_ref())?;
            preview(doc, open_store(cli.store), user_config).await
        }
        Command::Replay { layout, to, step } => {
            let doc = load_layout(layout.as_ref())?;
            let mut rt = PageRuntime::new(
                doc,
                open_store(cli.store),
                user_config.tuning.clone(),
                Bindings::default(),
            );
            let plan = ReplayPlan {
                to,
                step,
                frame: user_config.frame_interval(),
            };
            replay::run(&mut rt, plan);
            let mut out = io::stdout().lock();
            out.write_all(replay::report(&rt).as_bytes())?;
            Ok(())
        }
        Command::InitConfig => {
            user_config.save_to(&config_path)?;
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

async fn preview(doc: SimDocument, store: FileStore, user_config: AppConfig) -> Result<()> {
    let frame_interval = user_config.frame_interval();
    let mut state = AppState::new(doc, store, user_config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // Size the page viewport to the pane before the page loads.
    let size = terminal.size()?;
    let layout = AppLayout::from_area(Rect::new(0, 0, size.width, size.height));
    handler::handle_resize(&mut state, &layout, Duration::ZERO);

    let now = state.now();
    state.runtime.dispatch(PageEvent::DomContentLoaded, now);
    state.runtime.dispatch(PageEvent::Load, now);

    let mut events = spawn_event_reader(frame_interval);
    let result = run_loop(&mut terminal, &mut state, &mut events, layout).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

async fn run_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState<S>,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<AppEvent>,
    mut layout: AppLayout,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            layout = AppLayout::from_area(frame.area());
            let theme = state.runtime.theme();

            let page_block = Block::default()
                .title(format!(" scroll {:.0}px ", state.doc().scroll_y()))
                .title_style(Palette::title_style())
                .borders(Borders::ALL)
                .border_style(Palette::border_style());
            let page = PageView::new(state.doc(), state.runtime.bindings(), theme)
                .background(state.runtime.background().map(|g| g.mean_lightness()))
                .focused(state.focused_link_handle())
                .hovered(state.hovered)
                .inspected(state.inspected)
                .block(page_block);
            frame.render_widget(page, layout.page_area);

            let inspector_block = Block::default()
                .title(" Inspector ")
                .title_style(Palette::title_style())
                .borders(Borders::ALL)
                .border_style(Palette::border_style());
            let inspector = InspectorWidget::new(&state.runtime)
                .selected(state.inspected)
                .block(inspector_block);
            frame.render_widget(inspector, layout.inspector_area);

            let hint = state.config.status_bar_hint();
            let status_text = state.status_message.as_deref().unwrap_or(&hint);
            let status = Paragraph::new(status_text).style(Palette::status_bar_style());
            frame.render_widget(status, layout.status_area);
        })?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                let now = state.now();
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k, now),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m, &layout, now),
                    AppEvent::Resize(w, h) => {
                        layout = AppLayout::from_area(Rect::new(0, 0, w, h));
                        handler::handle_resize(state, &layout, now);
                    }
                    AppEvent::Frame => handler::handle_frame(state, now),
                }
            }

            else => break,
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}
