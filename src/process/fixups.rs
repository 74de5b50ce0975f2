// src/process/fixups.rs
//! Curated lookup data: categorical fixups and known-bad date/time tokens.
//!
//! Keys are stored already normalised (trimmed; upper case for injury and
//! state, lower case for color) because lookups happen after normalisation.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};
use tracing::info;

const INJURY: &[(&str, &str)] = &[
    ("N", "NO"),
    ("NONE", "NO"),
    ("NO INJURY", "NO"),
    ("NO INJURIES", "NO"),
    ("NO INJURY REPORTED", "NO"),
    ("NEGATIVE", "NO"),
    ("NO-", "NO"),
    ("Y", "YES"),
    ("INJURY", "YES"),
    ("INJURY REPORTED", "YES"),
    ("YES - SEE REMARKS", "YES"),
    ("UNK", "UNKNOWN"),
    ("UNKN", "UNKNOWN"),
    ("N/A", "UNKNOWN"),
    ("NOT REPORTED", "UNKNOWN"),
    ("?", "UNKNOWN"),
];

const STATE_NAMES: &[(&str, &str)] = &[
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
    ("DISTRICT OF COLUMBIA", "DC"),
    ("PUERTO RICO", "PR"),
    ("GUAM", "GU"),
    ("VIRGIN ISLANDS", "VI"),
    ("AMERICAN SAMOA", "AS"),
    ("NORTHERN MARIANA ISLANDS", "MP"),
];

/// Abbreviations and misspellings seen in the raw state column.
const STATE_VARIANTS: &[(&str, &str)] = &[
    ("D.C.", "DC"),
    ("WASHINGTON DC", "DC"),
    ("WASHINGTON D.C.", "DC"),
    ("N.Y.", "NY"),
    ("CALIFORNINA", "CA"),
    ("CALIF", "CA"),
    ("FLORDIA", "FL"),
    ("FLA", "FL"),
    ("TEXA", "TX"),
    ("PENNSYLVANNIA", "PA"),
    ("MASSACHUSSETTS", "MA"),
    ("ILLNOIS", "IL"),
    ("TENNESSE", "TN"),
    ("US VIRGIN ISLANDS", "VI"),
    ("U.S. VIRGIN ISLANDS", "VI"),
    ("ST THOMAS", "VI"),
    ("MARIANA ISLANDS", "MP"),
    ("SAIPAN", "MP"),
];

const COLOR: &[(&str, &str)] = &[
    ("grn", "green"),
    ("gren", "green"),
    ("greem", "green"),
    ("green laser", "green"),
    ("blu", "blue"),
    ("bue", "blue"),
    ("violet", "purple"),
    ("unk", "unknown"),
    ("unkn", "unknown"),
    ("green/white", "green, white"),
    ("white/green", "green, white"),
    ("green and white", "green, white"),
    ("green & white", "green, white"),
    ("green/blue", "blue, green"),
    ("blue/green", "blue, green"),
    ("green and blue", "blue, green"),
    ("blue and green", "blue, green"),
    ("green/red", "green, red"),
    ("red/green", "green, red"),
    ("red and green", "green, red"),
    ("multi", "multiple"),
    ("multi-colored", "multiple"),
    ("multicolored", "multiple"),
];

const PROBLEM_DATES: [&str; 9] = [
    "UNKN", "UNK", "Unknown", "UNKNOWN", "N/A", "?", "0", "00/00/0000", "2/29/2015",
];

const PROBLEM_TIMES: [&str; 9] = [
    "UNKN", "UNK", "Unknown", "UNKNOWN", "N/A", "?", "--", "TBD", "Not Reported",
];

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Fixups {
    pub injury: HashMap<String, String>,
    pub state: HashMap<String, String>,
    pub color: HashMap<String, String>,
    pub problem_dates: Vec<String>,
    pub problem_times: Vec<String>,
}

static BUILTIN: Lazy<Fixups> = Lazy::new(|| {
    let mut state = table(STATE_NAMES);
    state.extend(table(STATE_VARIANTS));
    Fixups {
        injury: table(INJURY),
        state,
        color: table(COLOR),
        problem_dates: PROBLEM_DATES.iter().map(|s| s.to_string()).collect(),
        problem_times: PROBLEM_TIMES.iter().map(|s| s.to_string()).collect(),
    }
});

impl Default for Fixups {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl Fixups {
    /// Load from YAML. Sections the file leaves out keep their built-in values.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading fixups {}", path.display()))?;
        let fixups: Fixups = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing fixups {}", path.display()))?;
        info!(
            path = %path.display(),
            injury = fixups.injury.len(),
            state = fixups.state.len(),
            color = fixups.color.len(),
            "loaded fixups"
        );
        Ok(fixups)
    }

    /// Matched against the trimmed text, case-sensitively.
    pub fn is_problem_date(&self, raw: &str) -> bool {
        let raw = raw.trim();
        self.problem_dates.iter().any(|p| p == raw)
    }

    pub fn is_problem_time(&self, raw: &str) -> bool {
        let raw = raw.trim();
        self.problem_times.iter().any(|p| p == raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_keys_are_normalised() {
        let f = Fixups::default();
        assert!(f.injury.keys().all(|k| k.trim() == k && k.to_uppercase() == *k));
        assert!(f.state.keys().all(|k| k.trim() == k && k.to_uppercase() == *k));
        assert!(f.color.keys().all(|k| k.trim() == k && k.to_lowercase() == *k));
        assert_eq!(f.state.get("NEW YORK").map(String::as_str), Some("NY"));
        assert_eq!(f.state.get("D.C.").map(String::as_str), Some("DC"));
    }

    #[test]
    fn problem_tokens_match_trimmed_exact_text() {
        let f = Fixups::default();
        assert!(f.is_problem_date(" UNKN "));
        assert!(!f.is_problem_date("unkn"));
        assert!(f.is_problem_time("?"));
        assert!(!f.is_problem_time("0530"));
    }

    #[test]
    fn yaml_overrides_only_named_sections() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fixups.yaml");
        fs::write(
            &path,
            "injury:\n  GREEN: NONE\nproblem_times: [\"9999\"]\n",
        )?;

        let f = Fixups::from_yaml_file(&path)?;
        assert_eq!(f.injury.len(), 1);
        assert_eq!(f.injury.get("GREEN").map(String::as_str), Some("NONE"));
        assert_eq!(f.problem_times, vec!["9999".to_string()]);
        assert_eq!(f.state, Fixups::default().state);
        Ok(())
    }
}
