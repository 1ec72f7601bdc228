use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OS performance-vs-battery slider position for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerSliderMode {
    #[default]
    None,
    Best,
    Better,
    Recommended,
    Saver,
}

impl PowerSliderMode {
    pub fn label(&self) -> &'static str {
        match self {
            PowerSliderMode::None => "None",
            PowerSliderMode::Best => "Best",
            PowerSliderMode::Better => "Better",
            PowerSliderMode::Recommended => "Recommended",
            PowerSliderMode::Saver => "Saver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerSource {
    #[default]
    None,
    Battery,
    Ac,
}

impl PowerSource {
    pub fn label(&self) -> &'static str {
        match self {
            PowerSource::None => "None",
            PowerSource::Battery => "Battery",
            PowerSource::Ac => "AC",
        }
    }
}

/// One bugcheck event from a crash or live-kernel report.
///
/// Renders as `CODE {p1, p2, p3, p4} ANNOTATION`; parameters that failed
/// the hex parse are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrashSummary {
    pub code: String,
    pub params: Vec<u64>,
    pub annotation: Option<String>,
}

impl fmt::Display for CrashSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| format!("{:x}", p))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} {{{}}}", self.code, params)?;
        if let Some(note) = &self.annotation {
            write!(f, " {}", note)?;
        }
        Ok(())
    }
}

/// Average C-state residency percentages for one run, in file column
/// order, plus the trailing sleep-S0 column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CStateAverages {
    pub c2: f64,
    pub c3: f64,
    pub c6: f64,
    pub c7: f64,
    pub c8: f64,
    pub c9: f64,
    pub c10: f64,
    pub sleep_s0: f64,
}

impl CStateAverages {
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.c2,
            self.c3,
            self.c6,
            self.c7,
            self.c8,
            self.c9,
            self.c10,
            self.sleep_s0,
        ]
    }
}

impl From<[f64; 8]> for CStateAverages {
    fn from(v: [f64; 8]) -> Self {
        Self {
            c2: v[0],
            c3: v[1],
            c6: v[2],
            c7: v[3],
            c8: v[4],
            c9: v[5],
            c10: v[6],
            sleep_s0: v[7],
        }
    }
}

/// One normalized metrics record per processed run folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceRecord {
    pub timestamp: NaiveDateTime,
    pub device_name: String,
    /// Path between the report root and the run folder itself, used to
    /// disambiguate duplicate device names under different subfolders.
    pub relative_path: String,
    pub os_build: String,
    pub slider_mode: PowerSliderMode,
    pub power_source: PowerSource,
    pub has_memory_dump: bool,
    pub memory_dump_flag: String,
    pub bugchecks: Vec<CrashSummary>,
    pub memory_dump_files: Vec<PathBuf>,
    pub has_live_kernel_dump: bool,
    pub live_kernel_flag: String,
    pub live_kernel_reports: Vec<CrashSummary>,
    pub live_kernel_files: Vec<PathBuf>,
    pub energy_drain_rate: f64,
    pub cstates: CStateAverages,
    pub sw_drip_percent: f64,
    pub hw_drip_percent: f64,
    pub battery_total: f64,
    pub battery_cell1: f64,
    pub battery_cell2: f64,
    pub active_energy_drain_rate: f64,
    pub net_interface: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn crash_summary_renders_hex_params_and_annotation() {
        let summary = CrashSummary {
            code: "0x000000ef".to_string(),
            params: vec![0xdeadbeef, 1, 2, 3],
            annotation: Some("CRITICAL_PROCESS_DIED".to_string()),
        };
        assert_eq!(
            summary.to_string(),
            "0x000000ef {deadbeef, 1, 2, 3} CRITICAL_PROCESS_DIED"
        );
    }

    #[test]
    fn crash_summary_without_annotation() {
        let summary = CrashSummary {
            code: "0x1a".to_string(),
            params: vec![0x41790],
            annotation: None,
        };
        assert_eq!(summary.to_string(), "0x1a {41790}");
    }

    #[test]
    fn default_record_has_no_power_state() {
        let record = DeviceRecord::default();
        assert_eq!(record.slider_mode, PowerSliderMode::None);
        assert_eq!(record.power_source, PowerSource::None);
    }
}
