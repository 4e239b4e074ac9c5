//! TUI application state and event loop.
//!
//! Polling runs on a background thread so the UI never blocks on the
//! gateway. Device, cell-site and client details are refreshed on the same
//! thread every few polls.

use std::io;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use gatewatch_core::{CellSite, ClientCounts, GatewayInfo, Metric, MonitorView};

use crate::commands::Session;

/// Polls between device/cell-site refreshes.
const DETAILS_EVERY: u64 = 15;
const MIN_REFRESH: Duration = Duration::from_millis(250);
const MAX_REFRESH: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// ChartMode
// ---------------------------------------------------------------------------

/// What the trend chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Snr,
    Rsrp,
    Rsrq,
}

impl ChartMode {
    pub fn next(self) -> Self {
        match self {
            Self::Snr => Self::Rsrp,
            Self::Rsrp => Self::Rsrq,
            Self::Rsrq => Self::Snr,
        }
    }

    pub fn metric(self) -> Metric {
        match self {
            Self::Snr => Metric::Snr,
            Self::Rsrp => Metric::Rsrp,
            Self::Rsrq => Metric::Rsrq,
        }
    }

    pub fn label(self) -> &'static str {
        self.metric().label()
    }

    pub fn y_label(self) -> &'static str {
        self.metric().unit()
    }

    /// Short one-line summary for the chart title bar.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Snr => "Signal to noise; higher is cleaner",
            Self::Rsrp => "Received reference power; higher is stronger",
            Self::Rsrq => "Received reference quality; higher is less loaded",
        }
    }

    /// Default axis range for this metric.
    pub fn domain(self) -> (f64, f64) {
        match self {
            Self::Snr => (-5.0, 40.0),
            Self::Rsrp => (-140.0, -44.0),
            Self::Rsrq => (-19.5, -3.0),
        }
    }

    /// Axis range: the default domain, widened to fit outliers.
    pub fn y_bounds(self, min_val: f64, max_val: f64) -> (f64, f64) {
        let (lo, hi) = self.domain();
        let lo = if min_val.is_finite() { lo.min(min_val.floor()) } else { lo };
        let hi = if max_val.is_finite() { hi.max(max_val.ceil()) } else { hi };
        (lo, hi)
    }
}

// ---------------------------------------------------------------------------
// Snapshot: single-lock capture of shared state for UI rendering
// ---------------------------------------------------------------------------

/// All state one frame needs.
pub struct Snapshot {
    pub view: MonitorView,
    pub polling: bool,
    pub device: Option<GatewayInfo>,
    pub cell_site: Option<CellSite>,
    pub clients: Option<ClientCounts>,
    pub last_export: Option<PathBuf>,
    pub export_error: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedState: internal, written by collector thread
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SharedState {
    cycle: u64,
    device: Option<GatewayInfo>,
    cell_site: Option<CellSite>,
    clients: Option<ClientCounts>,
    last_export: Option<PathBuf>,
    export_error: Option<String>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    session: Arc<Session>,
    refresh_rate: Duration,
    running: bool,
    shared: Arc<Mutex<SharedState>>,
    collector_flag: Arc<AtomicBool>,
    chart_mode: ChartMode,
    paused: bool,
    export_dir: PathBuf,
}

impl App {
    pub fn new(session: Session) -> Self {
        let refresh_rate = session.poll_interval().clamp(MIN_REFRESH, MAX_REFRESH);
        Self {
            session: Arc::new(session),
            refresh_rate,
            running: true,
            shared: Arc::new(Mutex::new(SharedState::default())),
            collector_flag: Arc::new(AtomicBool::new(false)),
            chart_mode: ChartMode::default(),
            paused: false,
            export_dir: PathBuf::from("."),
        }
    }

    /// Directory that `s` writes snapshots into.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before printing a panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        if let Some(path) = self.lock_shared().last_export.as_ref() {
            println!("Last snapshot: {}", path.display());
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        self.kick_collect();
        let mut last_tick = Instant::now();

        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }

            if last_tick.elapsed() >= self.refresh_rate {
                if !self.paused {
                    self.kick_collect();
                }
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('g') => self.chart_mode = self.chart_mode.next(),
            KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('s') => self.export_snapshot(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => {
                self.refresh_rate = (self.refresh_rate / 2).max(MIN_REFRESH);
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                self.refresh_rate = (self.refresh_rate * 2).min(MAX_REFRESH);
            }
            _ => {}
        }
    }

    fn lock_shared(&self) -> std::sync::MutexGuard<'_, SharedState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn kick_collect(&self) {
        if self.collector_flag.swap(true, Ordering::AcqRel) {
            return;
        }

        let session = Arc::clone(&self.session);
        let shared = Arc::clone(&self.shared);
        let flag = Arc::clone(&self.collector_flag);

        thread::spawn(move || {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                // Errors are counted in the monitor status and shown in the UI.
                let _ = session.monitor.tick();

                let cycle = {
                    let mut s = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    s.cycle += 1;
                    s.cycle
                };
                if cycle == 1 || cycle % DETAILS_EVERY == 0 {
                    session.ensure_login();
                    let device = session.gateway_info();
                    let cell_site = session.cell_site();
                    let clients = session.client_counts();

                    let mut s = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    if device.is_some() {
                        s.device = device;
                    }
                    if cell_site.is_some() {
                        s.cell_site = cell_site;
                    }
                    if clients.is_some() {
                        s.clients = clients;
                    }
                }
            }));
            flag.store(false, Ordering::Release);
        });
    }

    fn export_snapshot(&self) {
        let view = self.session.monitor.view();
        let result = gatewatch_core::export_snapshot(&self.export_dir, &view.status, &view.history);

        let mut s = self.lock_shared();
        match result {
            Ok(path) => {
                s.last_export = Some(path);
                s.export_error = None;
            }
            Err(e) => s.export_error = Some(e.to_string()),
        }
    }

    // --- Public accessors (non-shared state, no lock needed) ---

    pub fn chart_mode(&self) -> ChartMode {
        self.chart_mode
    }
    pub fn refresh_rate(&self) -> Duration {
        self.refresh_rate
    }
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    pub fn is_running(&self) -> bool {
        self.running
    }
    pub fn model(&self) -> &str {
        self.session.model()
    }
    pub fn source_name(&self) -> &str {
        self.session.monitor.source_name()
    }

    /// Capture monitor and panel state for one UI frame.
    pub fn snapshot(&self) -> Snapshot {
        let view = self.session.monitor.view();
        let s = self.lock_shared();
        Snapshot {
            view,
            polling: self.collector_flag.load(Ordering::Acquire),
            device: s.device.clone(),
            cell_site: s.cell_site.clone(),
            clients: s.clients,
            last_export: s.last_export.clone(),
            export_error: s.export_error.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
