//! CSV v1 (§6 "Flag-file schemas"): rows of `name,rate`, no header. Later
//! rows sharing a name override earlier ones. Each row produces a
//! Variant-A flag with a single `Rate` rule and `active: true`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::FlagError;
use crate::flag::rule_list::{Rule, RuleAction, RuleInfo, RuleListFlag};
use crate::flag::Flag;

use super::{Backend, RefreshResult};

pub struct CsvBackend {
    path: PathBuf,
}

impl CsvBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Backend for CsvBackend {
    fn refresh(&self) -> Result<RefreshResult, FlagError> {
        let file = std::fs::File::open(&self.path).map_err(|_| FlagError::FileMissing { path: self.path.clone() })?;
        let mtime = file.metadata().ok().and_then(|m| m.modified().ok()).map(chrono::DateTime::<chrono::Utc>::from);

        let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file);
        let mut rates: HashMap<String, f64> = HashMap::new();

        for record in reader.records() {
            let record = record.map_err(|e| FlagError::FileFormat { path: self.path.clone(), cause: e.to_string() })?;
            let name = record
                .get(0)
                .ok_or_else(|| FlagError::FileFormat { path: self.path.clone(), cause: "missing name column".into() })?
                .trim();
            if name.is_empty() {
                continue;
            }
            let rate_str = record
                .get(1)
                .ok_or_else(|| FlagError::FileFormat { path: self.path.clone(), cause: format!("row for {name} missing rate column") })?;
            let rate: f64 = rate_str
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| FlagError::FileFormat { path: self.path.clone(), cause: e.to_string() })?;
            rates.insert(name.to_string(), rate);
        }

        let flags = rates
            .into_iter()
            .map(|(name, rate)| {
                Flag::RuleList(RuleListFlag {
                    name,
                    active: true,
                    rules: vec![RuleInfo {
                        rule: Rule::Rate { rate, properties: vec![] },
                        on_match: RuleAction::On,
                        on_miss: RuleAction::Off,
                    }],
                })
            })
            .collect();

        Ok(RefreshResult { flags, source_updated_at: mtime })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "{contents}").expect("write");
        file
    }

    /// Fixture scenario 1's flag set (the statistical 50% check lives in
    /// the integration tests, where 100,000 calls are affordable).
    #[test]
    fn parses_rows_into_rate_flags() {
        let file = write_csv("go.sun.money,0\ngo.moon.mercury,1\ngo.stars.money,.5\n");
        let backend = CsvBackend::new(file.path());
        let result = backend.refresh().expect("refresh");
        assert_eq!(result.flags.len(), 3);

        let find = |name: &str| result.flags.iter().find(|f| f.name() == name).expect("flag present");
        assert_eq!(find("go.sun.money").clamp(), crate::flag::Clamp::AlwaysOff);
        assert_eq!(find("go.moon.mercury").clamp(), crate::flag::Clamp::AlwaysOn);
        assert_eq!(find("go.stars.money").clamp(), crate::flag::Clamp::MayVary);
    }

    #[test]
    fn later_row_overrides_earlier_row_for_same_name() {
        let file = write_csv("f,0\nf,1\n");
        let backend = CsvBackend::new(file.path());
        let result = backend.refresh().expect("refresh");
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].clamp(), crate::flag::Clamp::AlwaysOn);
    }

    #[test]
    fn missing_file_is_file_missing_error() {
        let backend = CsvBackend::new("/nonexistent/flags.csv");
        let err = backend.refresh().unwrap_err();
        assert!(matches!(err, FlagError::FileMissing { .. }));
    }

    #[test]
    fn unparseable_rate_is_file_format_error() {
        let file = write_csv("f,not-a-number\n");
        let backend = CsvBackend::new(file.path());
        let err = backend.refresh().unwrap_err();
        assert!(matches!(err, FlagError::FileFormat { .. }));
    }
}
