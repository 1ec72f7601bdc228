use std::path::Path;

use chrono::{Local, NaiveDateTime};
use pst_model::{DeviceRecord, ReportContext};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::{crash, cstate, drain, identity, meta, sleepstudy, slider, version, walker};

/// Builds one normalized record from a run folder.
///
/// Every extractor is tolerant: a field it cannot produce stays at its
/// default and the remaining extractors still run. The one rejection is an
/// unparsable folder name, which leaves no identity to report under.
pub fn build_device_record(
    folder: &Path,
    root: &Path,
    now: NaiveDateTime,
    show_active_energy: bool,
) -> Result<DeviceRecord, ExtractError> {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let identity = identity::parse_run_folder_name(&folder_name, now)
        .ok_or(ExtractError::IdentityParse(folder_name))?;

    let mut record = DeviceRecord {
        timestamp: identity.timestamp,
        device_name: identity.device_name,
        ..DeviceRecord::default()
    };

    if let Ok(rel) = folder.strip_prefix(root) {
        if let Some(parent) = rel.parent() {
            record.relative_path = parent.to_string_lossy().into_owned();
        }
    }

    record.os_build = version::extract_os_build_label(folder);

    let drips = sleepstudy::extract_sleep_drips(folder, show_active_energy);
    record.hw_drip_percent = drips.hw_drip_percent;
    record.sw_drip_percent = drips.sw_drip_percent;
    record.active_energy_drain_rate = drips.active_energy_drain_rate;

    if let Some(state) = slider::extract_slider_state(folder) {
        record.slider_mode = state.slider;
        record.power_source = state.source;
        record.net_interface = state.net_interface;
        record.battery_total = state.battery_total;
        record.battery_cell1 = state.battery_cell1;
        record.battery_cell2 = state.battery_cell2;
    } else {
        debug!(folder = %folder.display(), "no slider state found");
    }

    let crash_scan = crash::scan_memory_dumps(folder);
    record.has_memory_dump = crash_scan.has_dump;
    record.memory_dump_flag = if crash_scan.has_dump { "Yes" } else { "No" }.to_string();
    record.bugchecks = crash_scan.summaries;
    record.memory_dump_files = crash_scan.artifacts;

    let live_scan = crash::scan_live_kernel_dumps(folder);
    record.has_live_kernel_dump = live_scan.has_dump;
    record.live_kernel_flag = if live_scan.has_dump { "(LiveKernel)" } else { "" }.to_string();
    record.live_kernel_reports = live_scan.summaries;
    record.live_kernel_files = live_scan.artifacts;

    record.energy_drain_rate = drain::extract_energy_drain_rate(folder);
    record.cstates = cstate::extract_cstate_averages(folder);

    Ok(record)
}

/// Runs the full pipeline against `ctx.root_path`: discovers run folders,
/// collects report metadata, extracts one record per folder, and
/// accumulates them into the context. Returns how many records were
/// produced; rejected folders are logged and skipped.
pub fn run_pipeline(ctx: &mut ReportContext) -> Result<usize, ExtractError> {
    let root = ctx.root_path.clone();
    let folders = walker::find_run_folders(&root)?;
    info!(root = %root.display(), folders = folders.len(), "discovered run folders");

    let report_meta = meta::collect_report_meta(&folders);
    ctx.cs_time_header = report_meta.cs_time_header;
    // A version supplied on the command line takes precedence over the one
    // recovered from the trace.
    if ctx.pst_version.is_empty() {
        if let Some(version) = report_meta.pst_version {
            ctx.pst_version = version;
        }
    }

    let now = Local::now().naive_local();
    let mut processed = 0;
    for folder in &folders {
        match build_device_record(folder, &root, now, ctx.show_active_energy) {
            Ok(record) => {
                ctx.push_record(record);
                processed += 1;
            }
            Err(e) => warn!(folder = %folder.display(), error = %e, "skipping run folder"),
        }
    }
    Ok(processed)
}
