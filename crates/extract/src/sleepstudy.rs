use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime};
use pst_model::PowerConsumptionInterval;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use tracing::{debug, warn};

/// Drip percentages and active drain rate computed from the sleep-study
/// trace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SleepDrips {
    pub hw_drip_percent: f64,
    pub sw_drip_percent: f64,
    pub active_energy_drain_rate: f64,
}

#[derive(Debug, Default)]
struct TraceData {
    sw_seconds: Vec<f64>,
    hw_seconds: Vec<f64>,
    durations: Vec<f64>,
    intervals: Vec<PowerConsumptionInterval>,
}

/// Computes normalized hardware/software low-power "drip" percentages and
/// the weighted active-energy drain rate from the sleep-study XML trace.
///
/// Reads `Power/sleepstudy-report_verbose.xml`, falling back to
/// `sleepstudy.xml` in the run folder root (older test plans). As a side
/// effect the discharging intervals are persisted to `ActiveDrains.csv`
/// for audit; the computation never reads that file back.
///
/// The active drain rate is total mWh drained over the discharging
/// intervals divided by the whole elapsed hours across them, and is
/// reported as 0.0 unless `show_active_energy` is set or no whole hour
/// elapsed.
pub fn extract_sleep_drips(folder: &Path, show_active_energy: bool) -> SleepDrips {
    let Some(path) = [
        folder.join("Power").join("sleepstudy-report_verbose.xml"),
        folder.join("sleepstudy.xml"),
    ]
    .into_iter()
    .find(|p| p.is_file()) else {
        return SleepDrips::default();
    };
    let Ok(xml) = fs::read_to_string(&path) else {
        return SleepDrips::default();
    };
    let Some(data) = parse_trace(&xml) else {
        warn!(file = %path.display(), "unparsable sleep-study trace");
        return SleepDrips::default();
    };
    debug!(
        scenarios = data.durations.len(),
        intervals = data.intervals.len(),
        file = %path.display(),
        "parsed sleep-study trace"
    );

    let total_duration: f64 = data.durations.iter().sum();
    let (hw_drip_percent, sw_drip_percent) = if total_duration == 0.0 {
        (0.0, 0.0)
    } else {
        (
            round3(data.hw_seconds.iter().sum::<f64>() / total_duration * 100.0),
            round3(data.sw_seconds.iter().sum::<f64>() / total_duration * 100.0),
        )
    };

    write_active_drains(folder, &data.intervals);

    let mut elapsed = Duration::zero();
    let mut drained_mwh = 0.0;
    for interval in &data.intervals {
        elapsed += interval.elapsed();
        drained_mwh += interval.drained();
    }
    let whole_hours = elapsed.num_hours();
    let active_energy_drain_rate = if show_active_energy && whole_hours > 0 {
        drained_mwh / whole_hours as f64
    } else {
        0.0
    };

    SleepDrips {
        hw_drip_percent,
        sw_drip_percent,
        active_energy_drain_rate,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn parse_trace(xml: &str) -> Option<TraceData> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut data = TraceData::default();
    // Depth inside the EnergyDrains subtree; its direct children carry the
    // per-interval attributes.
    let mut drains_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if drains_depth == 0 && name == b"EnergyDrains" {
                    drains_depth = 1;
                } else if drains_depth >= 1 {
                    if drains_depth == 1 {
                        record_drain_child(&e, &mut data.intervals);
                    }
                    drains_depth += 1;
                }
                if name == b"ScenarioInstance" {
                    record_scenario(&e, &mut data);
                }
            }
            Ok(XmlEvent::Empty(e)) => {
                if drains_depth == 1 {
                    record_drain_child(&e, &mut data.intervals);
                }
                if e.name().as_ref() == b"ScenarioInstance" {
                    record_scenario(&e, &mut data);
                }
            }
            Ok(XmlEvent::End(_)) => {
                drains_depth = drains_depth.saturating_sub(1);
            }
            Ok(XmlEvent::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    Some(data)
}

fn record_scenario(e: &BytesStart, data: &mut TraceData) {
    for attr in e.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        let target = match attr.key.as_ref() {
            b"LowPowerStateTime" => &mut data.sw_seconds,
            b"HwLowPowerStateTime" => &mut data.hw_seconds,
            b"Duration" => &mut data.durations,
            _ => continue,
        };
        // Non-numeric attributes are skipped, not zero-filled.
        if let Ok(seconds) = value.parse::<f64>() {
            target.push(seconds);
        }
    }
}

/// One child of EnergyDrains describes a charge interval; `ac="0"` marks a
/// discharging one. The timestamps and capacities sit at fixed attribute
/// positions (1, 3, 4, 6); a malformed interval is dropped silently.
fn record_drain_child(e: &BytesStart, intervals: &mut Vec<PowerConsumptionInterval>) {
    let attrs: Vec<(Vec<u8>, String)> = e
        .attributes()
        .flatten()
        .map(|a| {
            let value = a
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_default();
            (a.key.as_ref().to_vec(), value)
        })
        .collect();

    let discharging = attrs
        .iter()
        .any(|(key, value)| key.eq_ignore_ascii_case(b"ac") && value == "0");
    if !discharging {
        return;
    }

    let interval = (|| {
        Some(PowerConsumptionInterval {
            start: parse_trace_timestamp(&attrs.get(1)?.1)?,
            end: parse_trace_timestamp(&attrs.get(3)?.1)?,
            start_capacity: attrs.get(4)?.1.parse().ok()?,
            end_capacity: attrs.get(6)?.1.parse().ok()?,
        })
    })();
    if let Some(interval) = interval {
        intervals.push(interval);
    }
}

fn parse_trace_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local())
}

/// Persists the normalized discharging intervals next to the trace, under
/// `Power/` when that directory exists, else in the run folder itself.
fn write_active_drains(folder: &Path, intervals: &[PowerConsumptionInterval]) {
    let power_dir = folder.join("Power");
    let path = if power_dir.is_dir() {
        power_dir.join("ActiveDrains.csv")
    } else {
        folder.join("ActiveDrains.csv")
    };

    let mut out = String::from("Drain_Start,Drain_End,Start_Capacity,End_Capacity\n");
    for interval in intervals {
        out.push_str(&format!(
            "{},{},{},{}\n",
            interval.start, interval.end, interval.start_capacity, interval.end_capacity
        ));
    }
    if let Err(e) = fs::write(&path, out) {
        warn!(file = %path.display(), error = %e, "failed to write active-drains audit file");
    }
}
