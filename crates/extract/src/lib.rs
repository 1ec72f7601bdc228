//! Extraction-and-aggregation pipeline for PST power-stress test results.
//!
//! A report root contains per-device run folders (identified by a
//! `DeviceInfo.csv` marker file) whose log formats drifted across harness
//! versions. Each extractor here tolerates that drift: a missing file or
//! malformed line yields the field's default, never an error, and no single
//! device can abort the run. The only fatal condition is an invalid root.

mod builder;
mod crash;
mod cstate;
mod drain;
mod error;
mod identity;
mod meta;
mod sleepstudy;
mod slider;
mod version;
mod walker;

pub use builder::{build_device_record, run_pipeline};
pub use crash::{scan_live_kernel_dumps, scan_memory_dumps, DumpScan};
pub use cstate::extract_cstate_averages;
pub use drain::extract_energy_drain_rate;
pub use error::ExtractError;
pub use identity::{parse_run_folder_name, RunIdentity};
pub use meta::{collect_report_meta, ReportMeta};
pub use sleepstudy::{extract_sleep_drips, SleepDrips};
pub use slider::{extract_slider_state, SliderState};
pub use version::extract_os_build_label;
pub use walker::{find_run_folders, is_run_folder, RUN_FOLDER_MARKER};
