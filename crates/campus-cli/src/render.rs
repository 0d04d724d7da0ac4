use campus_session::Route;
use campus_views::{DashboardData, MonitoringData, Slot};
use tracing::info;

fn slot_line<T>(label: &str, slot: &Slot<T>, ready: impl FnOnce(&T) -> String) -> String {
    match slot {
        Slot::Loading => format!("{}: loading", label),
        Slot::Ready(value) => format!("{}: {}", label, ready(value)),
        Slot::Failed(message) => format!("{}: {}", label, message),
    }
}

pub fn dashboard_lines(data: &DashboardData) -> Vec<String> {
    let mut lines = vec![slot_line("AI recommendation", &data.recommendation, |text| text.clone())];
    if data.strategy_available() {
        lines.push(format!("Full strategy: {}", Route::Strategy.path()));
    }

    lines.push(slot_line("Metrics", &data.metrics, |metrics| {
        metrics
            .iter()
            .map(|m| match (&m.change, m.gauge_percent()) {
                (_, Some(percent)) => format!("{} {:.0}%", m.title, percent),
                (Some(change), None) => format!("{} {} {} ({})", m.title, m.value, m.unit, change),
                (None, None) => format!("{} {} {}", m.title, m.value, m.unit),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }));

    lines.push(slot_line("Power flow", &data.power_flow, |points| match points.last() {
        Some(p) => format!("{} consumption {:.1} kW, solar {:.1} kW", p.time, p.consumption, p.solar),
        None => "no samples".to_string(),
    }));

    lines.push(slot_line("Devices", &data.device_status, |devices| {
        let online = data.online_devices().map(|(online, _)| online).unwrap_or_default();
        let entries: Vec<String> = devices
            .iter()
            .map(|d| format!("{} {} {}", d.name, d.status, d.power_label()))
            .collect();
        format!("{}/{} online [{}]", online, devices.len(), entries.join("; "))
    }));

    lines
}

pub fn monitoring_lines(data: &MonitoringData) -> Vec<String> {
    let mut lines = vec![slot_line("Devices", &data.devices, |devices| {
        let online = devices.iter().filter(|d| d.is_online()).count();
        let entries: Vec<String> = devices
            .iter()
            .map(|d| format!("{} ({}) {} {} @ {}", d.name, d.device_type, d.status, d.reading, d.ip_address))
            .collect();
        format!("{}/{} online [{}]", online, devices.len(), entries.join("; "))
    })];

    let label = format!("Energy flow {}", data.time_range);
    lines.push(slot_line(&label, &data.energy_flows, |points| match data.latest_flow() {
        Some(p) => format!(
            "{} points, {} supply {:.1} kW, load {:.1} kW",
            points.len(),
            p.time,
            p.total_supply(),
            p.total_load()
        ),
        None => "no samples".to_string(),
    }));

    lines
}

pub fn dashboard(data: &DashboardData) {
    for line in dashboard_lines(data) {
        info!(view = "dashboard", round = data.round, "{}", line);
    }
}

pub fn monitoring(data: &MonitoringData) {
    for line in monitoring_lines(data) {
        info!(view = "monitoring", round = data.round, "{}", line);
    }
}
