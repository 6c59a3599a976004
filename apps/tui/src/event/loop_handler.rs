use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use pseudodojo_core::elements::{self, ALL_ELEMENTS};
use pseudodojo_core::{
    complete_probe, select_element, Catalog, Choice, Completion, MetricKey, ProbeFailurePolicy,
    TableSummary,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::convert::TryFrom;
use std::fmt;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::app::{handle_input, App, PendingProbe};
use crate::probe::{LinkStatus, Prober, CHECK_CONCURRENCY};
use crate::ui;

// States of one probe-and-deliver round
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProbeState {
    Idle,
    Probing,
    Delivered,
    Failed,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Probing => write!(f, "Probing"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Clone, Debug)]
enum ProbeEvent {
    Start(String),
    Opened(String),
    Saved(PathBuf),
    Failed(String),
    Dropped,
    Reset,
}

impl fmt::Display for ProbeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(link) => write!(f, "Start({link})"),
            Self::Opened(link) => write!(f, "Opened({link})"),
            Self::Saved(path) => write!(f, "Saved({path})", path = path.display()),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Dropped => write!(f, "Dropped"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

#[derive(Debug)]
struct StateTransitionError {
    from: ProbeState,
    event: ProbeEvent,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

struct ProbeMachine {
    state: ProbeState,
}

impl ProbeMachine {
    const fn new() -> Self {
        Self {
            state: ProbeState::Idle,
        }
    }

    fn process_event(
        &mut self,
        event: &ProbeEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

struct NextState(ProbeState);

impl TryFrom<(ProbeState, &ProbeEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (ProbeState, &ProbeEvent, &mut App),
    ) -> std::result::Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (ProbeState::Idle, ProbeEvent::Start(link)) => {
                app.status_message = format!("Checking {link}...");
                Ok(Self(ProbeState::Probing))
            }
            (ProbeState::Probing, ProbeEvent::Opened(url)) => {
                app.status_message = format!("Open in a browser: {url}");
                Ok(Self(ProbeState::Delivered))
            }
            (ProbeState::Probing, ProbeEvent::Saved(path)) => {
                app.status_message = format!("Saved {}", path.display());
                Ok(Self(ProbeState::Delivered))
            }
            (ProbeState::Probing, ProbeEvent::Failed(error)) => {
                app.status_message = error.clone();
                Ok(Self(ProbeState::Failed))
            }
            (ProbeState::Probing, ProbeEvent::Dropped) => {
                app.status_message.clear();
                Ok(Self(ProbeState::Idle))
            }
            (ProbeState::Idle | ProbeState::Delivered | ProbeState::Failed, ProbeEvent::Reset) => {
                Ok(Self(ProbeState::Idle))
            }
            _ => Err(StateTransitionError {
                from: current_state,
                event: event.clone(),
            }),
        }
    }
}

/// Probes a queued link and delivers it the way its format asks.
async fn deliver(
    prober: Prober,
    pending: PendingProbe,
    download_dir: PathBuf,
    policy: ProbeFailurePolicy,
) -> ProbeEvent {
    let exists = prober.exists(&pending.link).await;
    match complete_probe(exists, pending.delivery, policy) {
        Completion::Navigate => match prober.resolve(&pending.link) {
            Ok(url) => ProbeEvent::Opened(url.to_string()),
            Err(e) => ProbeEvent::Failed(e.to_string()),
        },
        Completion::Download => match prober.download(&pending.link, &download_dir).await {
            Ok(path) => ProbeEvent::Saved(path),
            Err(e) => ProbeEvent::Failed(format!("Download failed: {e}")),
        },
        Completion::Notify(notice) => ProbeEvent::Failed(notice.message().to_string()),
        Completion::Nothing => ProbeEvent::Dropped,
    }
}

/// Starts a check-and-deliver round in the background. The outcome arrives on `results`.
fn start_round(
    machine: &mut ProbeMachine,
    pending: PendingProbe,
    app: &mut App,
    context: &LoopContext<'_>,
    results: &mpsc::UnboundedSender<ProbeEvent>,
) {
    if let Err(e) = machine.process_event(&ProbeEvent::Start(pending.link.clone()), app) {
        log::debug!("{e}");
        app.status_message = "Still working on the previous file".to_string();
        return;
    }

    let round = deliver(
        context.prober.clone(),
        pending,
        context.download_dir.to_path_buf(),
        context.probe_failure,
    );
    let results = results.clone();
    tokio::spawn(async move {
        if results.send(round.await).is_err() {
            log::debug!("loop ended before the round finished");
        }
    });
}

/// Applies the outcome of a background round and returns the machine to Idle.
fn finish_round(machine: &mut ProbeMachine, event: &ProbeEvent, app: &mut App) {
    if let Err(e) = machine.process_event(event, app) {
        log::debug!("{e}");
    }
    if let Err(e) = machine.process_event(&ProbeEvent::Reset, app) {
        log::debug!("{e}");
    }
}

/// Terminal-side settings the loop needs besides the app itself.
pub struct LoopContext<'a> {
    pub prober: &'a Prober,
    pub download_dir: &'a Path,
    pub probe_failure: ProbeFailurePolicy,
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    context: &LoopContext<'_>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut probe_machine = ProbeMachine::new();
    let (results, mut outcomes) = mpsc::unbounded_channel();

    loop {
        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    handle_input(app, key.code).await;
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                _ => {}
            }
        }

        while let Ok(event) = outcomes.try_recv() {
            finish_round(&mut probe_machine, &event, app);
        }
        if let Some(pending) = app.pending.take() {
            start_round(&mut probe_machine, pending, app, context, &results);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct HeadlessReport<'a> {
    choice: &'a Choice,
    available: usize,
    total: usize,
    archive: Option<&'a str>,
    means: &'a TableSummary,
    issues: Vec<String>,
    banner: Option<&'a str>,
    element: Option<HeadlessElement>,
}

#[derive(serde::Serialize)]
struct HeadlessElement {
    element: String,
    number: Option<u32>,
    link: Option<String>,
    values: Vec<(MetricKey, String)>,
}

fn build_report<'a>(app: &'a App, element: Option<&str>) -> HeadlessReport<'a> {
    let element = element.map(|symbol| {
        let readout = select_element(&app.metas, symbol);
        HeadlessElement {
            number: elements::atomic_number(symbol),
            link: app
                .catalog
                .resolve_pseudo(symbol, &app.choice)
                .map(str::to_string),
            element: readout.element,
            values: readout.values,
        }
    });

    HeadlessReport {
        choice: &app.choice,
        available: app.catalog.available_count(&app.choice),
        total: ALL_ELEMENTS.len(),
        archive: app.archive_link(),
        means: &app.summary,
        issues: app
            .catalog
            .validate()
            .iter()
            .map(ToString::to_string)
            .collect(),
        banner: app.banner.as_deref(),
        element,
    }
}

/// Run the application in headless mode (no UI)
pub fn run_headless(app: &App, element: Option<&str>, json: bool) -> Result<()> {
    if let Some(symbol) = element {
        if !elements::is_known(symbol) {
            return Err(color_eyre::eyre::eyre!("Unknown element symbol: {symbol}"));
        }
    }
    let report = build_report(app, element);

    if json {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{json}");
        return Ok(());
    }

    let choice = report.choice;
    println!("\nPseudoDojo table");
    println!("================");
    if let Some(banner) = report.banner {
        println!("Warning: {banner}");
    }
    println!(
        "Selection: {} / {} / {} / {}",
        choice.typ, choice.functional, choice.accuracy, choice.format
    );
    println!("Available: {}/{}", report.available, report.total);
    println!("Archive: {}", report.archive.unwrap_or("(not available)"));

    println!("\nMeans:");
    for key in MetricKey::ALL {
        println!("- {}: {}", key.label(), report.means.mean(key).display());
    }

    if !report.issues.is_empty() {
        println!("\nCatalog issues:");
        for issue in &report.issues {
            println!("- {issue}");
        }
    }

    if let Some(element) = report.element {
        println!("\n{} ({})", element.element, element.number.unwrap_or_default());
        println!("Link: {}", element.link.as_deref().unwrap_or("(not available)"));
        for (key, value) in element.values {
            println!("- {}: {value}", key.label());
        }
    }

    Ok(())
}

/// Probes every link in both tables, printing the broken ones.
pub async fn run_check_links(catalog: &Catalog, prober: &Prober, json: bool) -> Result<()> {
    let links: Vec<String> = catalog
        .files
        .links()
        .chain(catalog.archives.links())
        .map(str::to_string)
        .collect();
    let total = links.len();
    log::debug!("checking {total} links");

    let broken: Vec<LinkStatus> = prober
        .check_links(links, CHECK_CONCURRENCY)
        .await
        .into_iter()
        .filter(LinkStatus::is_broken)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&broken)?);
    } else {
        for status in &broken {
            let reason = status
                .status
                .map_or_else(|| status.error.clone().unwrap_or_default(), |code| code.to_string());
            println!("broken: {} ({reason})", status.link);
        }
        println!("{}/{total} links reachable", total - broken.len());
    }

    if broken.is_empty() {
        Ok(())
    } else {
        Err(color_eyre::eyre::eyre!("{} broken links", broken.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pseudodojo_core::{Layout, PseudoType, Remembered};

    fn app() -> Result<App, pseudodojo_core::DojoError> {
        let catalog = Catalog::from_json(
            r#"{"nc-sr-v0.4":{"PBE":{"standard":{"Si":{"psp8":"Si.psp8","meta":{"hl":"5.0","nv":"4"}}}}}}"#,
            "{}",
        )?;
        Ok(App::new(
            catalog,
            PseudoType::NcSr04,
            Remembered::default(),
            Layout::Full,
        ))
    }

    #[test]
    fn report_counts_available_elements() -> Result<(), Box<dyn std::error::Error>> {
        let app = app()?;
        let report = build_report(&app, Some("Si"));
        assert_eq!(report.available, 1);
        assert_eq!(report.total, 118);
        assert_eq!(report.archive, None);

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["element"]["link"], "Si.psp8");
        assert_eq!(json["means"]["hl"], 5.0);
        assert_eq!(json["means"]["hh"], serde_json::Value::Null);
        Ok(())
    }

    #[test]
    fn probe_machine_walks_a_round() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = app()?;
        let mut machine = ProbeMachine::new();

        machine.process_event(&ProbeEvent::Start("Si.psp8".to_string()), &mut app)?;
        assert_eq!(machine.state, ProbeState::Probing);
        machine.process_event(&ProbeEvent::Saved(PathBuf::from("downloads/Si.psp8")), &mut app)?;
        assert_eq!(machine.state, ProbeState::Delivered);
        assert!(app.status_message.contains("Si.psp8"));
        machine.process_event(&ProbeEvent::Reset, &mut app)?;
        assert_eq!(machine.state, ProbeState::Idle);

        assert!(machine.process_event(&ProbeEvent::Dropped, &mut app).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn rounds_run_in_the_background() -> Result<(), Box<dyn std::error::Error>> {
        let mut app = app()?;
        let prober = Prober::new(reqwest::Url::parse("data:text/plain,base")?)?;
        let download_dir = std::env::temp_dir();
        let context = LoopContext {
            prober: &prober,
            download_dir: &download_dir,
            probe_failure: ProbeFailurePolicy::Notify,
        };
        let (results, mut outcomes) = mpsc::unbounded_channel();
        let mut machine = ProbeMachine::new();
        let pending = PendingProbe {
            link: "Si.psp8".to_string(),
            delivery: pseudodojo_core::Delivery::Download,
        };

        start_round(&mut machine, pending.clone(), &mut app, &context, &results);
        assert_eq!(machine.state, ProbeState::Probing);

        // A second click while the first is still out is turned away
        start_round(&mut machine, pending, &mut app, &context, &results);
        assert_eq!(app.status_message, "Still working on the previous file");

        let event = outcomes.recv().await.ok_or("round never reported back")?;
        finish_round(&mut machine, &event, &mut app);
        assert_eq!(machine.state, ProbeState::Idle);
        assert_eq!(
            app.status_message,
            pseudodojo_core::Notice::Unreachable.message()
        );
        Ok(())
    }

    #[test]
    fn unknown_element_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let app = app()?;
        assert!(run_headless(&app, Some("Xx"), false).is_err());
        Ok(())
    }
}
