//! Challenger pool loaded once at startup

use rand::seq::IndexedRandom;
use std::path::Path;

use crate::error::{ApiError, Result};

/// Immutable list of bot identifiers eligible to be challenged.
///
/// Loaded from a plain-text file, one identifier per line, and used only as
/// a uniform random-selection source when issuing new challenges.
#[derive(Debug, Clone)]
pub struct OpponentPool {
    bots: Vec<String>,
}

impl OpponentPool {
    /// Load the pool from a file.
    ///
    /// Trailing whitespace is trimmed per line and blank lines are ignored.
    /// Fails with [`ApiError::Config`] if the file is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ApiError::config(path, source))?;

        let bots = raw
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Ok(Self { bots })
    }

    /// Build a pool from identifiers already in memory.
    pub fn from_names(bots: Vec<String>) -> Self {
        Self { bots }
    }

    /// Pick a challenge target uniformly at random.
    pub fn choose(&self) -> Result<&str> {
        self.bots
            .choose(&mut rand::rng())
            .map(String::as_str)
            .ok_or(ApiError::EmptyPool)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pool_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file creation failed");
        file.write_all(contents.as_bytes())
            .expect("temp file write failed");
        file
    }

    #[test]
    fn load_trims_trailing_whitespace_and_skips_blanks() {
        let file = pool_file("TurtleBot  \nsimpleEval\n\nmaia5\r\n");
        let pool = OpponentPool::load(file.path()).expect("load should succeed");

        assert_eq!(pool.len(), 3);
        for _ in 0..20 {
            let name = pool.choose().expect("choose should succeed");
            assert!(["TurtleBot", "simpleEval", "maia5"].contains(&name));
        }
    }

    #[test]
    fn load_missing_file_is_a_config_error() {
        let err = OpponentPool::load("/nonexistent/challengers.txt")
            .expect_err("load should fail");
        assert!(matches!(err, ApiError::Config { .. }));
    }

    #[test]
    fn choose_on_empty_pool_fails() {
        let pool = OpponentPool::from_names(Vec::new());
        assert!(pool.is_empty());
        assert!(matches!(
            pool.choose().expect_err("choose should fail"),
            ApiError::EmptyPool
        ));
    }

    #[test]
    fn choose_is_roughly_uniform() {
        let pool = OpponentPool::from_names(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ]);

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for _ in 0..600 {
            *counts
                .entry(pool.choose().expect("choose should succeed"))
                .or_default() += 1;
        }

        // Expected 200 per entry; generous bounds keep this stable.
        for name in ["A", "B", "C"] {
            let count = counts.get(name).copied().unwrap_or(0);
            assert!(
                (120..=280).contains(&count),
                "{name} selected {count} times out of 600"
            );
        }
    }
}
