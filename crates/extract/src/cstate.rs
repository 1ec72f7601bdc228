use std::fs;
use std::path::Path;

use pst_model::CStateAverages;

/// Averages the per-session C-state residency columns of
/// `Power/CStateInfo.csv`: C2, C3, C6, C7, C8, C9, C10 and sleep-S0.
///
/// A missing or unreadable file yields all zeros.
pub fn extract_cstate_averages(folder: &Path) -> CStateAverages {
    let Ok(text) = fs::read_to_string(folder.join("Power").join("CStateInfo.csv")) else {
        return CStateAverages::default();
    };
    average_residency_rows(text.lines()).into()
}

fn average_residency_rows<'a>(lines: impl Iterator<Item = &'a str>) -> [f64; 8] {
    let mut sums = [0.0_f64; 8];
    let mut count = 0u32;

    for line in lines {
        // The header row carries the ActivePer label.
        if line.contains("ActivePer") {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 8 {
            continue;
        }
        for (i, sum) in sums.iter_mut().enumerate() {
            if let Ok(value) = fields[i].trim().trim_matches('"').parse::<f64>() {
                *sum += value;
            }
        }
        count += 1;
    }

    // A sum of exactly 0.0 stays 0.0 rather than being divided.
    sums.map(|sum| {
        if sum == 0.0 || count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        }
    })
}
