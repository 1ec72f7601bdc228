mod build_label;
mod context;
mod interval;
mod record;

pub use build_label::os_build_label;
pub use context::{ColumnFlags, ReportContext};
pub use interval::PowerConsumptionInterval;
pub use record::{CStateAverages, CrashSummary, DeviceRecord, PowerSliderMode, PowerSource};
