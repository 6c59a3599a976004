use clap::Parser;
use color_eyre::Result;
use pseudodojo_core::{PreferenceKey, PseudoType, Remembered};
use pseudodojo_tui::app::App;
use pseudodojo_tui::cli::CliArgs;
use pseudodojo_tui::event::LoopContext;
use pseudodojo_tui::probe::Prober;
use pseudodojo_tui::{config, db, event, loader, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = config::init_app_config()?;

    let interactive = !(args.headless || args.check_links) && is_terminal();
    init_logging(config.debug, interactive);

    let loaded = loader::load_or_empty(&config.data_dir).await;
    let prober = Prober::new(config.base_url.clone())?;

    if args.check_links {
        return event::run_check_links(&loaded.catalog, &prober, args.json).await;
    }

    let pool = match db::create_database_pool(&config.database_url).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Preferences will not be remembered: {e}");
            None
        }
    };
    let mut remembered = match &pool {
        Some(pool) => db::load_remembered(pool).await.unwrap_or_else(|e| {
            log::warn!("Failed to read preferences: {e}");
            Remembered::default()
        }),
        None => Remembered::default(),
    };

    // Command-line values win over remembered ones
    let [typ, xc, acc, fmt] = args.requested();
    let overrides = [
        (PreferenceKey::Functional, xc),
        (PreferenceKey::Accuracy, acc),
        (PreferenceKey::Format, fmt),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            remembered.set(key, value);
        }
    }
    let typ = typ.map_or(Ok(PseudoType::ALL[0]), PseudoType::parse)?;

    let mut app = App::new(loaded.catalog, typ, remembered, config.layout);
    for (key, value) in overrides {
        if let Some(value) = value.filter(|value| *value != key.value(&app.choice)) {
            log::warn!(
                "{value} is not offered for {}, using {}",
                typ.as_str(),
                key.value(&app.choice)
            );
        }
    }
    if let Some(warning) = loaded.banner {
        app.set_load_warning(warning);
    }
    if let Some(pool) = pool {
        if overrides.iter().any(|(_, value)| value.is_some()) {
            if let Err(e) = db::remember(&pool, &app.choice).await {
                log::warn!("Failed to remember selection: {e}");
            }
        }
        app.attach_db(pool);
    }

    if !interactive {
        return event::run_headless(&app, args.element.as_deref(), args.json);
    }

    let mut terminal = terminal::setup()?;
    let context = LoopContext {
        prober: &prober,
        download_dir: &config.download_dir,
        probe_failure: config.probe_failure,
    };

    let result = event::run(&mut terminal, &mut app, &context).await;

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

/// Logs go to stderr, which the full-screen browser would draw over.
fn init_logging(debug: bool, interactive: bool) {
    let log_level = if debug {
        "debug"
    } else if interactive {
        "off"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
