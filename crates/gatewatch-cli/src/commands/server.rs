use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gatewatch_core::spawn_poller;

use super::GlobalOpts;

pub fn run(opts: &GlobalOpts, host: &str, port: u16, interval_ms: Option<u64>) {
    let Some(session) = super::open_session(opts, interval_ms) else {
        return;
    };
    let period = session.poll_interval();

    let base = format!("http://{host}:{port}");
    println!("gatewatch server v{}", gatewatch_core::VERSION);
    println!("   {base}");
    println!(
        "   polling {} ({}) every {}ms",
        session.model(),
        session.monitor.source_name(),
        period.as_millis()
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /api/v1/signal    Latest normalized sample");
    println!("     GET /api/v1/history   Rolling history, oldest first");
    println!("     GET /api/v1/extrema   Best and worst values over the history");
    println!("     GET /health           Poller status");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let poller = match spawn_poller(Arc::clone(&session.monitor), period, Arc::clone(&running)) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error starting poller: {e}");
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };
    let result = rt.block_on(gatewatch_server::run_server(
        Arc::clone(&session.monitor),
        session.config.model.clone(),
        host,
        port,
    ));
    drop(rt);

    running.store(false, Ordering::SeqCst);
    let _ = poller.join();

    if let Err(e) = result {
        eprintln!("Server error on {host}:{port}: {e}");
        std::process::exit(1);
    }
}
