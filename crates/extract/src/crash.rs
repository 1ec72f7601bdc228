use std::fs;
use std::path::{Path, PathBuf};

use pst_model::CrashSummary;
use tracing::debug;

/// Result of scanning one crash-report family: the presence flag, parsed
/// bugcheck summaries, and the on-disk dump artifacts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DumpScan {
    pub has_dump: bool,
    pub summaries: Vec<CrashSummary>,
    pub artifacts: Vec<PathBuf>,
}

/// Scans `CrashReport.csv` and the `MemDump` directory.
///
/// Any non-header line containing the literal `CRASHED,` marker is a crash
/// event; lines with at least 9 fields also yield a bugcheck summary.
pub fn scan_memory_dumps(folder: &Path) -> DumpScan {
    let mut scan = DumpScan::default();

    if let Ok(text) = fs::read_to_string(folder.join("CrashReport.csv")) {
        for line in text.lines() {
            if !line.contains("CRASHED,") {
                continue;
            }
            scan.has_dump = true;
            if line.contains("Session#,") {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() >= 9 {
                let mut summary = parse_summary(fields[3], &fields[4..8]);
                let note = fields[8].trim();
                if !note.is_empty() {
                    summary.annotation = Some(note.to_uppercase());
                }
                scan.summaries.push(summary);
            }
        }
    }

    scan.artifacts = list_files(&folder.join("MemDump"));
    scan
}

/// Scans `LiveKernelReport.csv` and the `LiveKernelReports` directory.
///
/// The live-kernel report has no `CRASHED` marker; every line without the
/// `Serial#` header token is a data line, with the fields shifted one
/// column left relative to the crash report and the annotation kept as-is.
pub fn scan_live_kernel_dumps(folder: &Path) -> DumpScan {
    let mut scan = DumpScan::default();

    if let Ok(text) = fs::read_to_string(folder.join("LiveKernelReport.csv")) {
        for line in text.lines() {
            if line.contains("Serial#") {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() >= 8 {
                let mut summary = parse_summary(fields[2], &fields[3..7]);
                let note = fields[7].trim();
                if !note.is_empty() {
                    summary.annotation = Some(note.to_string());
                }
                scan.summaries.push(summary);
                scan.has_dump = true;
            }
        }
    }

    scan.artifacts = reconcile_artifacts(&folder.join("LiveKernelReports"));
    scan
}

fn parse_summary(code: &str, params: &[&str]) -> CrashSummary {
    CrashSummary {
        code: code.trim().to_string(),
        params: params.iter().filter_map(|p| parse_hex_param(p)).collect(),
        annotation: None,
    }
}

/// Hex parameter parse tolerant of `0x`/`X` prefixes and stray spaces.
/// All leading characters from the prefix set are stripped, so a bare
/// zero strips to nothing and the parameter is dropped.
fn parse_hex_param(raw: &str) -> Option<u64> {
    let trimmed = raw.trim().trim_start_matches(['0', 'x', 'X', ' ']);
    if trimmed.is_empty() {
        return None;
    }
    u64::from_str_radix(trimmed, 16).ok()
}

/// Flat file listing of a dump directory, sorted for a stable report order.
fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.dedup();
    files
}

/// Merges the flat directory listing with every per-attempt subdirectory.
///
/// Nested report folders may hold a more complete copy of a top-level
/// summary file: when a subdirectory file shares its name with a flat
/// entry, the strictly larger copy wins; otherwise it joins the list.
fn reconcile_artifacts(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<(PathBuf, u64)> = Vec::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if let Ok(meta) = entry.metadata() {
            files.push((path, meta.len()));
        }
    }
    files.sort();
    subdirs.sort();

    for sub in subdirs {
        for (path, size) in list_files_with_sizes(&sub) {
            let name = path.file_name().map(|n| n.to_os_string());
            match files
                .iter_mut()
                .find(|(existing, _)| existing.file_name().map(|n| n.to_os_string()) == name)
            {
                Some(entry) if size > entry.1 => {
                    debug!(
                        replaced = %entry.0.display(),
                        with = %path.display(),
                        "larger duplicate in report subdirectory"
                    );
                    *entry = (path, size);
                }
                Some(_) => {}
                None => files.push((path, size)),
            }
        }
    }

    files.into_iter().map(|(path, _)| path).collect()
}

fn list_files_with_sizes(dir: &Path) -> Vec<(PathBuf, u64)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(PathBuf, u64)> = entries
        .flatten()
        .filter_map(|e| {
            let path = e.path();
            let meta = e.metadata().ok()?;
            meta.is_file().then(|| (path, meta.len()))
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, contents: &[u8]) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn crash_line_parses_code_params_and_annotation() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "CrashReport.csv",
            b"Session#,Time,Event,Code,P1,P2,P3,P4,Note\n\
              3,09:12,CRASHED,0x000000ef,0xdeadbeef,0x1,0x2,0x3,critical_process_died\n",
        );
        let scan = scan_memory_dumps(dir.path());
        assert!(scan.has_dump);
        assert_eq!(scan.summaries.len(), 1);
        let rendered = scan.summaries[0].to_string();
        assert_eq!(
            rendered,
            "0x000000ef {deadbeef, 1, 2, 3} CRITICAL_PROCESS_DIED"
        );
    }

    #[test]
    fn short_crash_line_sets_flag_without_summary() {
        let dir = TempDir::new().unwrap();
        write(&dir, "CrashReport.csv", b"3,09:12,CRASHED,0xef\n");
        let scan = scan_memory_dumps(dir.path());
        assert!(scan.has_dump);
        assert!(scan.summaries.is_empty());
    }

    #[test]
    fn missing_report_and_dump_dir() {
        let dir = TempDir::new().unwrap();
        let scan = scan_memory_dumps(dir.path());
        assert_eq!(scan, DumpScan::default());
    }

    #[test]
    fn mem_dump_dir_listed_without_report() {
        let dir = TempDir::new().unwrap();
        write(&dir, "MemDump/MEMORY.DMP", b"xxxx");
        let scan = scan_memory_dumps(dir.path());
        assert!(!scan.has_dump);
        assert_eq!(scan.artifacts.len(), 1);
    }

    #[test]
    fn live_kernel_lines_skip_header_and_keep_annotation_case() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "LiveKernelReport.csv",
            b"Serial#,Time,Code,P1,P2,P3,P4,Note\n\
              7,10:03,0x193,0x1a,0x0,X2,0x3,usb hang\n",
        );
        let scan = scan_live_kernel_dumps(dir.path());
        assert!(scan.has_dump);
        assert_eq!(scan.summaries.len(), 1);
        let summary = &scan.summaries[0];
        assert_eq!(summary.code, "0x193");
        // 0x0 strips to nothing and is dropped; X2 parses as 2.
        assert_eq!(summary.params, vec![0x1a, 2, 3]);
        assert_eq!(summary.annotation.as_deref(), Some("usb hang"));
    }

    #[test]
    fn larger_subdirectory_duplicate_wins() {
        let dir = TempDir::new().unwrap();
        write(&dir, "LiveKernelReports/a.dmp", &[0u8; 100]);
        write(&dir, "LiveKernelReports/attempt-2/a.dmp", &[0u8; 200]);
        let scan = scan_live_kernel_dumps(dir.path());
        assert_eq!(scan.artifacts.len(), 1);
        assert_eq!(
            scan.artifacts[0],
            dir.path().join("LiveKernelReports/attempt-2/a.dmp")
        );
    }

    #[test]
    fn smaller_subdirectory_duplicate_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(&dir, "LiveKernelReports/a.dmp", &[0u8; 300]);
        write(&dir, "LiveKernelReports/attempt-2/a.dmp", &[0u8; 200]);
        let scan = scan_live_kernel_dumps(dir.path());
        assert_eq!(scan.artifacts, vec![dir.path().join("LiveKernelReports/a.dmp")]);
    }

    #[test]
    fn new_subdirectory_files_are_added() {
        let dir = TempDir::new().unwrap();
        write(&dir, "LiveKernelReports/a.dmp", &[0u8; 10]);
        write(&dir, "LiveKernelReports/attempt-2/b.dmp", &[0u8; 20]);
        let scan = scan_live_kernel_dumps(dir.path());
        assert_eq!(scan.artifacts.len(), 2);
    }
}
