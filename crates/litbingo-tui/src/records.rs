//! Persisted scalars: the best-score high-water mark and the hardcore
//! preference. A single JSON file in the platform data directory,
//! last-write-wins, loaded with silent fallback to defaults.

use litbingo_core::score;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Records {
    pub best_score: Option<i64>,
    pub hardcore_preferred: bool,
}

impl Records {
    fn save_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("litbingo_records.json")
    }

    /// Load records from file, defaulting on any read or parse error.
    pub fn load() -> Self {
        match fs::read_to_string(Self::save_path()) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save records to file. Failures are ignored — records are a nicety.
    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(Self::save_path(), json);
        }
    }

    /// Record a finished game's final score. Returns true when it set a
    /// new best (and was persisted).
    pub fn record_final_score(&mut self, final_score: i64) -> bool {
        if score::improves(final_score, self.best_score) {
            self.best_score = Some(final_score);
            self.save();
            true
        } else {
            false
        }
    }

    pub fn set_hardcore_preference(&mut self, on: bool) {
        self.hardcore_preferred = on;
        self.save();
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_round_trip() {
        let records = Records {
            best_score: Some(18),
            hardcore_preferred: true,
        };
        let json = serde_json::to_string(&records).unwrap();
        let back: Records = serde_json::from_str(&json).unwrap();
        assert_eq!(back.best_score, Some(18));
        assert!(back.hardcore_preferred);
    }

    #[test]
    fn new_best_only_when_higher() {
        let mut records = Records {
            best_score: Some(10),
            hardcore_preferred: false,
        };
        assert!(!records.record_final_score(9));
        assert_eq!(records.best_score, Some(10));
        assert!(records.record_final_score(12));
        assert_eq!(records.best_score, Some(12));
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(754), "12:34");
        assert_eq!(format_time(3661), "1:01:01");
    }
}
