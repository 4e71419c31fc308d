use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use fltk::{app, prelude::*};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use guide_pad::app::controllers::session::GuideSession;
use guide_pad::app::domain::{Catalog, GuideConfig, Message};
use guide_pad::app::services::fetcher::HttpFetcher;
use guide_pad::app::services::preference_store::{FileBackend, PreferenceStore};
use guide_pad::app::state::AppState;
use guide_pad::cli::{self, Cli};
use guide_pad::ui::main_window::build_main_window;
use guide_pad::ui::menu::build_menu;

/// Seconds between checks of the OS color scheme.
const AMBIENT_POLL_SECS: f64 = 2.0;

fn init_logging() {
    let filter = EnvFilter::try_from_env("GUIDEPAD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let args = Cli::parse();
    let mut config = GuideConfig::load();
    args.apply_to(&mut config);
    let request = args.launch_request();

    if let Some(command) = &args.command {
        let mut stdout = std::io::stdout().lock();
        return match cli::run(command, &request, &config, &mut stdout) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // A broken catalog leaves the window up with an empty sidebar
    let catalog = config.load_catalog().unwrap_or_else(|e| {
        tracing::error!("Failed to load catalog: {}", e);
        Catalog::default()
    });
    tracing::info!(documents = catalog.len(), "starting GuidePad");

    let app = app::App::default();
    let (s, r) = app::channel::<Message>();

    let mut widgets = build_main_window(&s);
    let session = GuideSession::new(catalog, PreferenceStore::new(FileBackend::default()));
    build_menu(&mut widgets.menu, &s, session.preferences().theme, config.sidebar_open);

    let fetcher = Arc::new(HttpFetcher::from_config(&config));
    let mut state = AppState::new(widgets, session, fetcher, s, config);

    state.widgets.wind.show();
    state.start(request.document(), request.language());

    app::add_timeout3(AMBIENT_POLL_SECS, move |handle| {
        s.send(Message::AmbientTick);
        app::repeat_timeout3(AMBIENT_POLL_SECS, handle);
    });

    while app.wait() {
        if let Some(msg) = r.recv() {
            if !state.handle(msg) {
                break;
            }
        }
    }

    ExitCode::SUCCESS
}
