use gatewatch_core::{Radio, format_uptime};

use super::{GlobalOpts, radio_summary};

pub fn run(opts: &GlobalOpts) {
    let Some(session) = super::open_session(opts, None) else {
        return;
    };

    println!("gatewatch v{}", gatewatch_core::VERSION);
    println!("  Model:     {}", session.model());
    println!("  Source:    {}", session.monitor.source_name());
    println!();

    match session.gateway_info() {
        Some(info) => {
            let d = &info.device;
            let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
            println!("Device");
            println!("  {}", d.headline());
            println!("  Firmware:  {} ({})", field(&d.software_version), field(&d.update_state));
            println!("  MAC:       {}", field(&d.mac_id));
            println!("  Serial:    {}", field(&d.serial));
            if let Some(up) = info.uptime_secs {
                println!("  Uptime:    {}", format_uptime(up));
            }
        }
        None => println!("Device: unavailable"),
    }
    println!();

    println!("Signal");
    match session.monitor.tick() {
        Ok(_) => {
            if let Some(sample) = session.monitor.latest() {
                println!("  {}", radio_summary(&sample, Radio::Lte));
                println!("  {}", radio_summary(&sample, Radio::Nr));
            }
        }
        Err(e) => println!("  unavailable: {e}"),
    }
    println!();

    if session.monitor.credential().is_none() {
        println!("Cell site and clients need a login (set GATEWATCH_PASSWORD).");
        return;
    }

    match session.cell_site() {
        Some(site) => {
            println!("Cell site");
            println!(
                "  Operator:  {} ({})",
                site.operator_name(),
                site.plmn().unwrap_or_else(|| "-".to_string())
            );
            println!(
                "  eNB ID:    {}",
                site.enb_id.map_or("-".to_string(), |v| v.to_string())
            );
            println!(
                "  Cell ID:   {}",
                site.cell_id.map_or("-".to_string(), |v| v.to_string())
            );
            if let Some(fix) = site.gps {
                println!("  GPS:       {}, {}", fix.latitude, fix.longitude);
            }
            println!("  Map:       {}", site.cellmapper_url());
        }
        None => println!("Cell site: unavailable"),
    }
    println!();

    match session.client_counts() {
        Some(c) => {
            println!("Clients ({})", c.total());
            println!("  2.4 GHz:   {}", c.wifi_2_4ghz);
            println!("  5 GHz:     {}", c.wifi_5ghz);
            println!("  Ethernet:  {}", c.ethernet);
        }
        None => println!("Clients: unavailable"),
    }
}
