use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Report-wide metadata discovered from the run folders themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    pub cs_time_header: String,
    pub pst_version: Option<String>,
}

/// Derives the connected-standby time header and the harness version from
/// the first run folder that carries each piece of information.
pub fn collect_report_meta(run_folders: &[PathBuf]) -> ReportMeta {
    let cs_time_header = match find_cs_time_secs(run_folders) {
        Some(secs) => format!("CS time = {}min", secs / 60),
        None => "CS time not specified".to_string(),
    };
    ReportMeta {
        cs_time_header,
        pst_version: find_pst_version(run_folders),
    }
}

fn find_cs_time_secs(run_folders: &[PathBuf]) -> Option<i64> {
    for folder in run_folders {
        let Ok(text) = fs::read_to_string(folder.join("CStimeLog.csv")) else {
            continue;
        };
        for line in text.lines() {
            if line.contains("Session#") {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() >= 4 {
                if let Ok(secs) = fields[1].trim().parse() {
                    debug!(folder = %folder.display(), secs, "found CS time");
                    return Some(secs);
                }
            }
        }
    }
    None
}

/// The harness logs a start banner like
/// `... power state stress test 2.3.1 ... - start` within the first few
/// lines of its trace; the version is the first dotted token after the
/// marker.
fn find_pst_version(run_folders: &[PathBuf]) -> Option<String> {
    const MARKER: &str = "power state stress test";

    for folder in run_folders {
        let Ok(text) = fs::read_to_string(folder.join("Trace").join("PSTtrace.txt")) else {
            continue;
        };
        for line in text.lines().take(10) {
            let lower = line.to_lowercase();
            if !lower.contains(MARKER) || !lower.trim().ends_with("- start") {
                continue;
            }
            let idx = lower.find(MARKER).map(|i| i + MARKER.len())?;
            let Some(rest) = line.get(idx..) else {
                continue;
            };
            if let Some(token) = rest.split_whitespace().next() {
                if token.contains('.') {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}
