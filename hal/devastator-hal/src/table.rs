//! Compile-time resource tables
//!
//! A [`ResourceTable`] maps logical identifiers (pins, ADC channels) to
//! the physical descriptor that implements them. Tables are built once as
//! `static` data and never mutated, so any driver may read them without
//! synchronization.
//!
//! Lookup is a linear scan. Tables hold at most a few dozen entries.

/// Identifier was not found in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotFound;

/// Fixed, ordered mapping from identifier to descriptor
#[derive(Debug)]
pub struct ResourceTable<I: 'static, D: 'static> {
    entries: &'static [(I, D)],
}

impl<I, D> ResourceTable<I, D> {
    /// Create a table over a static entry list
    pub const fn new(entries: &'static [(I, D)]) -> Self {
        Self { entries }
    }

    /// Number of entries
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &'static (I, D)> {
        self.entries.iter()
    }
}

impl<I: PartialEq, D> ResourceTable<I, D> {
    /// Resolve an identifier to its descriptor
    pub fn resolve(&self, id: I) -> Result<&'static D, NotFound> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, descriptor)| descriptor)
            .ok_or(NotFound)
    }

    /// Check if an identifier is present
    pub fn contains(&self, id: I) -> bool {
        self.resolve(id).is_ok()
    }

    /// Find the first identifier that appears more than once
    pub fn find_duplicate(&self) -> Option<&'static I> {
        let entries = self.entries;
        entries.iter().enumerate().find_map(|(i, (id, _))| {
            entries[i + 1..]
                .iter()
                .any(|(other, _)| other == id)
                .then_some(id)
        })
    }
}
