//! Sound bank events

use crate::error::ModelError;
use std::collections::BTreeSet;

/// A named trigger id and the banks that include it.
///
/// Identity is the id: two events with the same id describe the same
/// trigger, and [`Event::merge`] unions their owning bank names.
#[derive(Debug, Clone)]
pub struct Event {
    id: String,
    name: String,
    bank_names: BTreeSet<String>,
}

impl Event {
    /// Create an event owned by `bank_name` (ignored when blank)
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        bank_name: &str,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(ModelError::MissingField { entity: "Event", field: "id" });
        }
        if name.trim().is_empty() {
            return Err(ModelError::MissingField { entity: "Event", field: "name" });
        }

        let mut bank_names = BTreeSet::new();
        if !bank_name.trim().is_empty() {
            bank_names.insert(bank_name.to_string());
        }

        Ok(Self { id, name, bank_names })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning bank names in lexicographic order
    pub fn bank_names(&self) -> &BTreeSet<String> {
        &self.bank_names
    }

    /// Union `other`'s owning banks into this event.
    ///
    /// Returns `false` without changes if the ids differ. Merging an event
    /// with itself (or with any subset of itself) changes nothing.
    pub fn merge(&mut self, other: &Event) -> bool {
        if self.id != other.id {
            return false;
        }
        self.bank_names.extend(other.bank_names.iter().cloned());
        true
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}
