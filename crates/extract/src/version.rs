use std::fs;
use std::path::Path;

use pst_model::os_build_label;

/// OS release label for a run, from the `CurrentBuild` line of
/// `VersionInformation.txt`. A missing file or unparsable build number
/// reports "None".
pub fn extract_os_build_label(folder: &Path) -> String {
    let Ok(text) = fs::read_to_string(folder.join("VersionInformation.txt")) else {
        return os_build_label(0).to_string();
    };

    let mut build = 0u32;
    for line in text.lines() {
        if let Some(idx) = line.find("CurrentBuild") {
            let rest = &line[idx + "CurrentBuild".len()..];
            build = rest.trim().parse().unwrap_or(0);
            break;
        }
    }
    os_build_label(build).to_string()
}
