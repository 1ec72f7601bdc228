use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::record::DeviceRecord;

/// Which optional report columns have data in at least one record.
///
/// A flag latches on the first record with a nonzero value for its column
/// and never downgrades afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ColumnFlags {
    pub c2: bool,
    pub c3: bool,
    pub c6: bool,
    pub c7: bool,
    pub c8: bool,
    pub c9: bool,
    pub c10: bool,
    pub sleep_s0: bool,
    pub hw_drips: bool,
    pub sw_drips: bool,
    pub battery: bool,
    pub active_energy: bool,
}

/// Per-report-run state handed to the renderer once extraction finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReportContext {
    pub header1: String,
    pub header2: String,
    pub pst_version: String,
    pub root_path: PathBuf,
    pub cs_time_header: String,
    pub show_active_energy: bool,
    pub columns: ColumnFlags,
    pub records: Vec<DeviceRecord>,
}

impl ReportContext {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            ..Self::default()
        }
    }

    /// Takes ownership of a finished record and latches the optional-column
    /// flags for every nonzero metric it carries.
    pub fn push_record(&mut self, record: DeviceRecord) {
        let cs = &record.cstates;
        self.columns.c2 |= cs.c2 != 0.0;
        self.columns.c3 |= cs.c3 != 0.0;
        self.columns.c6 |= cs.c6 != 0.0;
        self.columns.c7 |= cs.c7 != 0.0;
        self.columns.c8 |= cs.c8 != 0.0;
        self.columns.c9 |= cs.c9 != 0.0;
        self.columns.c10 |= cs.c10 != 0.0;
        self.columns.sleep_s0 |= cs.sleep_s0 != 0.0;
        self.columns.hw_drips |= record.hw_drip_percent != 0.0;
        self.columns.sw_drips |= record.sw_drip_percent != 0.0;
        self.columns.battery |= record.battery_total != 0.0
            || record.battery_cell1 != 0.0
            || record.battery_cell2 != 0.0;
        self.columns.active_energy |= record.active_energy_drain_rate != 0.0;
        self.records.push(record);
    }
}
