use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gatewatch_core::{ExtremaSummary, Metric, Radio, Tick, run_every};

use super::{GlobalOpts, format_metric, radio_summary};

pub fn run(opts: &GlobalOpts, interval_ms: Option<u64>, count: Option<u64>, json: bool) {
    let Some(session) = super::open_session(opts, interval_ms) else {
        return;
    };
    let monitor = Arc::clone(&session.monitor);
    let period = session.poll_interval();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    if !json {
        println!(
            "Watching {} ({}) every {}ms. Ctrl+C to stop.",
            session.model(),
            monitor.source_name(),
            period.as_millis()
        );
        println!();
    }

    let mut polls = 0u64;
    run_every(period, &running, || {
        match monitor.tick() {
            Ok(Tick::Sampled) => {
                if let Some(sample) = monitor.latest() {
                    if json {
                        match serde_json::to_string(&sample) {
                            Ok(line) => println!("{line}"),
                            Err(e) => eprintln!("Error encoding sample: {e}"),
                        }
                    } else {
                        println!("{:>8}  {}", sample.time_label, radio_summary(&sample, Radio::Lte));
                        println!("{:>8}  {}", "", radio_summary(&sample, Radio::Nr));
                    }
                }
            }
            Ok(Tick::Busy) => {}
            Err(e) => eprintln!("poll failed: {e} (retrying in {}ms)", period.as_millis()),
        }

        polls += 1;
        if count.is_some_and(|n| polls >= n) {
            running.store(false, Ordering::SeqCst);
        }
    });

    let view = monitor.view();
    if json {
        let summary = serde_json::json!({
            "polls": view.status.ticks,
            "samples": view.history.len(),
            "best": view.best,
            "worst": view.worst,
        });
        println!("{summary}");
        return;
    }

    println!();
    println!(
        "{} polls, {} ok, {} failed",
        view.status.ticks, view.status.successes, view.status.failures
    );
    if view.history.is_empty() {
        println!("No samples collected.");
        return;
    }
    print_summary(&view.best, &view.worst);
}

fn print_summary(best: &ExtremaSummary, worst: &ExtremaSummary) {
    println!("{:<8} {:>24} {:>24}", "", "best", "worst");
    for radio in Radio::ALL {
        for metric in Metric::ALL {
            println!(
                "{:<8} {:>24} {:>24}",
                format!("{} {}", short_radio(radio), metric.label()),
                format_metric(Some(best.get(radio, metric)), metric),
                format_metric(Some(worst.get(radio, metric)), metric),
            );
        }
    }
}

fn short_radio(radio: Radio) -> &'static str {
    match radio {
        Radio::Lte => "4G",
        Radio::Nr => "5G",
    }
}
