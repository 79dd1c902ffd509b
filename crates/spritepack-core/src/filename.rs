//! Filename sequences for multi-sheet textures.
//!
//! A pattern may contain one brace-delimited digit run, e.g.
//! `atlas{0-9}.png` names the files `atlas0.png` .. `atlas9.png`. Omitting
//! the upper bound (`atlas{0-}.png`) makes the sequence unbounded. Patterns
//! without a run name exactly one file. Zero-padding follows the first
//! bound: `sheet{00-}.png` yields `sheet00.png`, `sheet01.png`, ...

/// A filename pattern that can yield the k-th sheet filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameSequence {
    prefix: String,
    suffix: String,
    first: u64,
    last: Option<u64>,
    digits: usize,
    sequence: bool,
}

impl FilenameSequence {
    /// Parses a pattern. Patterns without a well-formed `{first-last}` run
    /// are treated as a single filename.
    pub fn new(pattern: &str) -> Self {
        Self::parse_run(pattern).unwrap_or_else(|| Self {
            prefix: pattern.to_string(),
            suffix: String::new(),
            first: 0,
            last: None,
            digits: 0,
            sequence: false,
        })
    }

    fn parse_run(pattern: &str) -> Option<Self> {
        let (prefix, rest) = pattern.split_once('{')?;
        let (run, suffix) = rest.split_once('}')?;
        let (first, last) = run.split_once('-')?;
        if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let first_value = first.parse::<u64>().ok()?;
        let last_value = if last.is_empty() {
            None
        } else {
            let value = last.parse::<u64>().ok()?;
            if value < first_value {
                return None;
            }
            Some(value)
        };
        Some(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            first: first_value,
            last: last_value,
            digits: first.len(),
            sequence: true,
        })
    }

    /// Maximum number of sheets this sequence can name.
    pub fn count(&self) -> usize {
        if !self.sequence {
            return 1;
        }
        match self.last {
            Some(last) => (last - self.first + 1) as usize,
            None => usize::MAX,
        }
    }

    /// The filename of the n-th sheet. `n` must be below `count()`.
    pub fn get_nth_filename(&self, n: usize) -> String {
        if !self.sequence {
            return self.prefix.clone();
        }
        let index = self.first + n as u64;
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.digits
        )
    }

    /// The first filename; used for identity and diagnostics.
    pub fn filename(&self) -> String {
        self.get_nth_filename(0)
    }

    /// The pattern in its original spelling.
    pub fn pattern(&self) -> String {
        if !self.sequence {
            return self.prefix.clone();
        }
        match self.last {
            Some(last) => format!(
                "{}{{{:0width$}-{}}}{}",
                self.prefix,
                self.first,
                last,
                self.suffix,
                width = self.digits
            ),
            None => format!(
                "{}{{{:0width$}-}}{}",
                self.prefix,
                self.first,
                self.suffix,
                width = self.digits
            ),
        }
    }
}

impl Default for FilenameSequence {
    fn default() -> Self {
        Self::new("atlas{0-}.png")
    }
}
