//! Ordered list of driver numbers shown in the gallery.
//!
//! Uniqueness is checked with a linear scan on insert; the list is small
//! enough that an index would only add bookkeeping.

/// Driver numbers the gallery starts with
pub const DEFAULT_SEED: [&str; 3] = ["1", "81", "4"];

/// Insertion-ordered, duplicate-free list of driver identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    drivers: Vec<String>,
}

impl Roster {
    /// Build a roster from a seed list, dropping blanks and repeats
    pub fn seeded<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::default();
        for id in seed {
            roster.submit(id.as_ref());
        }
        roster
    }

    /// Add a trimmed identifier to the end of the list.
    ///
    /// Returns the stored identifier when something was appended, `None` when
    /// the input was blank or already present.
    pub fn submit(&mut self, raw: &str) -> Option<String> {
        let id = raw.trim();
        if id.is_empty() || self.contains(id) {
            return None;
        }
        self.drivers.push(id.to_string());
        Some(id.to_string())
    }

    /// Remove an identifier. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.drivers.iter().position(|d| d == id) {
            Some(idx) => {
                self.drivers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.drivers.iter().any(|d| d == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.drivers.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.drivers.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
