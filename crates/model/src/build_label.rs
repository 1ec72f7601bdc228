/// Ordered `(min_build, max_build) -> label` table for Windows release
/// names, evaluated linearly, first match wins.
///
/// The boundary values are carried over verbatim from the harness they
/// were calibrated against. Note the SunValley_Next row: its upper bound
/// (2200) sits below its lower bound, so it can never match, and builds
/// between 19345 and 22000 fall through to "None". Kept as-is until the
/// intended boundaries are confirmed.
const BUILD_LABELS: &[(u32, u32, &str)] = &[
    (10586, 10586, "TH2"),
    (14393, 14393, "RS1"),
    (15009, 16231, "RS2"),
    (16232, 17000, "RS3"),
    (17001, 17711, "RS4"),
    (17712, 18361, "RS5"),
    (18362, 18362, "19H1"),
    (18363, 18363, "19H2"),
    (18364, 19041, "20H1"),
    (19042, 19042, "20H2"),
    (19043, 19200, "21H1"),
    (19201, 19344, "21H2"),
    (19345, 2200, "SunValley_Next"),
    (22001, u32::MAX, "FE"),
];

/// Maps a `CurrentBuild` number to its release label, or "None" when the
/// build falls in no range.
pub fn os_build_label(build: u32) -> &'static str {
    for (min, max, label) in BUILD_LABELS {
        if build >= *min && build <= *max {
            return label;
        }
    }
    "None"
}
