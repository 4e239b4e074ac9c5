use super::GlobalOpts;

pub fn run(opts: &GlobalOpts, interval_ms: Option<u64>) {
    let Some(session) = super::open_session(opts, interval_ms) else {
        return;
    };
    let mut app = crate::tui::app::App::new(session);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
