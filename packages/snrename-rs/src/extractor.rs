//! Pulls serial numbers out of recognized text lines by looking for a label
//! such as `S/N:` and validating what follows it.

/// Labels searched for, in order. Matching is case-insensitive.
pub const DEFAULT_LABELS: &[&str] = &["serial number:", "s/n:"];

/// Serial numbers are exactly this many characters long.
pub const SERIAL_LENGTH: usize = 8;

/// Serials become file names, so anything that would add a path component is refused.
fn usable_in_file_name(candidate: &str) -> bool {
    !candidate.contains(['/', '\\', '\0']) && candidate != "." && candidate != ".."
}

#[derive(Debug, Clone)]
pub struct SerialExtractor {
    labels: Vec<String>,
    serial_length: usize,
}

impl Default for SerialExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().copied(), SERIAL_LENGTH)
    }
}

impl SerialExtractor {
    pub fn new<I, S>(labels: I, serial_length: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = labels
            .into_iter()
            .map(|label| label.as_ref().to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();
        Self {
            labels,
            serial_length,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Candidate serials found in a single line, at most one per label.
    ///
    /// For each label present in the lowercased line, the text after its first
    /// occurrence is trimmed and kept only if it has exactly `serial_length`
    /// characters. Kept values are uppercased.
    pub fn extract(&self, line: &str) -> Vec<String> {
        let lowered = line.to_lowercase();

        self.labels
            .iter()
            .filter_map(|label| {
                let (_, rest) = lowered.split_once(label.as_str())?;
                let candidate = rest.trim();
                (candidate.chars().count() == self.serial_length && usable_in_file_name(candidate))
                    .then(|| candidate.to_uppercase())
            })
            .collect()
    }

    /// Serials across all lines of an image, deduplicated in first-seen order.
    pub fn extract_all<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut serials: Vec<String> = Vec::new();
        for serial in lines.into_iter().flat_map(|line| self.extract(line)) {
            if !serials.contains(&serial) {
                serials.push(serial);
            }
        }
        serials
    }
}
