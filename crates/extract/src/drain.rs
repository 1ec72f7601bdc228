use std::fs;
use std::path::Path;

// Plausibility bounds for a per-session drain sample in mW. Fixed policy
// values; samples outside the range are instrumentation glitches.
const DRAIN_MIN: f64 = 30.0;
const DRAIN_MAX: f64 = 1900.0;

/// Average energy drain rate from `Power/EnergyDrain.csv`, falling back to
/// `EnergyDrain.csv` in the run folder root. Samples outside the inclusive
/// [30, 1900] band are excluded; 0.0 when nothing qualifies.
pub fn extract_energy_drain_rate(folder: &Path) -> f64 {
    let Some(path) = [
        folder.join("Power").join("EnergyDrain.csv"),
        folder.join("EnergyDrain.csv"),
    ]
    .into_iter()
    .find(|p| p.is_file()) else {
        return 0.0;
    };
    let Ok(text) = fs::read_to_string(&path) else {
        return 0.0;
    };
    bounded_average(text.lines(), DRAIN_MIN, DRAIN_MAX)
}

fn bounded_average<'a>(lines: impl Iterator<Item = &'a str>, min: f64, max: f64) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0u32;

    for line in lines {
        if line.contains("EnergyDrain") {
            continue;
        }
        let Some(first) = line.split(',').next() else {
            continue;
        };
        if let Ok(value) = first.trim().trim_matches('"').parse::<f64>() {
            if value >= min && value <= max {
                sum += value;
                count += 1;
            }
        }
    }

    if sum == 0.0 || count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filters_out_of_band_samples() {
        let lines = ["EnergyDrain", "10", "50", "2000", "100"];
        assert_eq!(bounded_average(lines.into_iter(), 30.0, 1900.0), 75.0);
    }

    #[test]
    fn bounds_are_inclusive() {
        let lines = ["30", "1900"];
        assert_eq!(bounded_average(lines.into_iter(), 30.0, 1900.0), 965.0);
    }

    #[test]
    fn nothing_qualifies() {
        let lines = ["EnergyDrain", "5", "not-a-number"];
        assert_eq!(bounded_average(lines.into_iter(), 30.0, 1900.0), 0.0);
    }

    #[test]
    fn root_fallback_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("EnergyDrain.csv"), "EnergyDrain\n40\n60\n").unwrap();
        assert_eq!(extract_energy_drain_rate(dir.path()), 50.0);
    }

    #[test]
    fn power_subdir_file_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("Power")).unwrap();
        std::fs::write(dir.path().join("Power/EnergyDrain.csv"), "100\n").unwrap();
        std::fs::write(dir.path().join("EnergyDrain.csv"), "500\n").unwrap();
        assert_eq!(extract_energy_drain_rate(dir.path()), 100.0);
    }
}
