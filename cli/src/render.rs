use pst_model::{DeviceRecord, ReportContext};

/// Lays the aggregated report out as CSV. Metadata headers come first as
/// comment lines, then the column header row, then one row per record.
/// Optional metric columns appear only when at least one record populated
/// them.
pub fn render_csv(ctx: &ReportContext) -> String {
    let mut output = String::new();

    if !ctx.header1.is_empty() {
        output.push_str(&format!("# {}\n", ctx.header1));
    }
    if !ctx.header2.is_empty() {
        output.push_str(&format!("# {}\n", ctx.header2));
    }
    let version = if ctx.pst_version.is_empty() {
        "unknown"
    } else {
        ctx.pst_version.as_str()
    };
    output.push_str(&format!(
        "# PST version {} | {}\n",
        version, ctx.cs_time_header
    ));

    output.push_str(&header_row(ctx).join(","));
    output.push('\n');

    for record in &ctx.records {
        output.push_str(&record_row(ctx, record).join(","));
        output.push('\n');
    }

    output
}

/// The full aggregate as pretty JSON, for downstream tooling.
pub fn render_json(ctx: &ReportContext) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ctx)
}

fn header_row(ctx: &ReportContext) -> Vec<String> {
    let mut cols: Vec<String> = [
        "Timestamp",
        "Device",
        "Path",
        "OS Build",
        "Slider",
        "Power Source",
        "Crash",
        "Bugchecks",
        "Drain Rate (mW)",
        "Net Interface",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let flags = &ctx.columns;
    for (enabled, name) in [
        (flags.c2, "C2 (%)"),
        (flags.c3, "C3 (%)"),
        (flags.c6, "C6 (%)"),
        (flags.c7, "C7 (%)"),
        (flags.c8, "C8 (%)"),
        (flags.c9, "C9 (%)"),
        (flags.c10, "C10 (%)"),
        (flags.sleep_s0, "Sleep S0 (%)"),
        (flags.hw_drips, "HW Drips (%)"),
        (flags.sw_drips, "SW Drips (%)"),
    ] {
        if enabled {
            cols.push(name.to_string());
        }
    }
    if flags.battery {
        cols.push("Battery (%)".to_string());
        cols.push("Bat Cell1 (%)".to_string());
        cols.push("Bat Cell2 (%)".to_string());
    }
    if ctx.show_active_energy && flags.active_energy {
        cols.push("Active Drain (mWh/h)".to_string());
    }
    cols
}

fn record_row(ctx: &ReportContext, record: &DeviceRecord) -> Vec<String> {
    let crash = format!("{}{}", record.memory_dump_flag, record.live_kernel_flag);
    let bugchecks = record
        .bugchecks
        .iter()
        .chain(record.live_kernel_reports.iter())
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    let mut cols = vec![
        record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        escape_csv(&record.device_name),
        escape_csv(&record.relative_path),
        record.os_build.clone(),
        record.slider_mode.label().to_string(),
        record.power_source.label().to_string(),
        escape_csv(&crash),
        escape_csv(&bugchecks),
        format!("{:.2}", record.energy_drain_rate),
        escape_csv(&record.net_interface),
    ];

    let flags = &ctx.columns;
    let cs = record.cstates.as_array();
    for (enabled, value) in [
        (flags.c2, cs[0]),
        (flags.c3, cs[1]),
        (flags.c6, cs[2]),
        (flags.c7, cs[3]),
        (flags.c8, cs[4]),
        (flags.c9, cs[5]),
        (flags.c10, cs[6]),
        (flags.sleep_s0, cs[7]),
        (flags.hw_drips, record.hw_drip_percent),
        (flags.sw_drips, record.sw_drip_percent),
    ] {
        if enabled {
            cols.push(format!("{:.3}", value));
        }
    }
    if flags.battery {
        cols.push(format!("{:.1}", record.battery_total));
        cols.push(format!("{:.1}", record.battery_cell1));
        cols.push(format!("{:.1}", record.battery_cell2));
    }
    if ctx.show_active_energy && flags.active_energy {
        cols.push(format!("{:.2}", record.active_energy_drain_rate));
    }
    cols
}

pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        let escaped = s.replace('"', "\"\"").replace('\n', " ");
        format!("\"{}\"", escaped)
    } else {
        s.to_string()
    }
}
