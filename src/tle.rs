//! Two-Line Element (TLE) text parsing.
//!
//! Turns free-form pasted or bundled text into ordered element records.
//! Accepts standard three-line blocks (name, line 1, line 2) as well as bare
//! two-line blocks, which receive a synthesized `SAT-<n>` name.

/// Bundled demo data: the ISS plus a small three-plane shell.
pub const SAMPLE_TLE: &str = include_str!("../data/sample.tle");

const LINE1_MARKER: &str = "1 ";
const LINE2_MARKER: &str = "2 ";
/// A line 1 candidate must be strictly longer than this.
const LINE1_MIN_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRecord {
    pub id: usize,
    pub name: String,
    pub line1: String,
    pub line2: String,
}

fn looks_like_line1(line: &str) -> bool {
    line.starts_with(LINE1_MARKER)
}

fn looks_like_line2(line: &str) -> bool {
    line.starts_with(LINE2_MARKER)
}

/// Parses every well-formed element pair found in `data`.
///
/// Blank lines are ignored and surrounding whitespace is trimmed. A line 1
/// whose successor is not a line 2 is dropped and scanning resumes on the
/// next line, so one broken block never hides the ones after it. Ids are
/// assigned `0..n` in discovery order.
///
/// An empty result means nothing usable was found; callers report that to
/// the user rather than treating it as a fault.
pub fn parse_elements(data: &str) -> Vec<ElementRecord> {
    let lines: Vec<&str> = data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let mut records: Vec<ElementRecord> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line1 = lines[i];
        if !looks_like_line1(line1) || line1.len() <= LINE1_MIN_LEN {
            i += 1;
            continue;
        }
        let Some(&line2) = lines.get(i + 1).filter(|l| looks_like_line2(l)) else {
            i += 1;
            continue;
        };

        let name = i
            .checked_sub(1)
            .map(|prev| lines[prev])
            .filter(|prev| !looks_like_line1(prev) && !looks_like_line2(prev))
            .map(str::to_string)
            .unwrap_or_else(|| format!("SAT-{}", records.len() + 1));

        records.push(ElementRecord {
            id: records.len(),
            name,
            line1: line1.to_string(),
            line2: line2.to_string(),
        });
        i += 2;
    }

    records
}
