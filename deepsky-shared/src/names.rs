use std::collections::{btree_map::Entry, BTreeMap};

use log::debug;

/// Maps catalog numbers to display names and back.
///
/// An object can have any number of names, kept in insertion order. Name lookup ignores case, but
/// names are returned as they were added.
#[derive(Clone, Debug, Default)]
pub struct NameDatabase {
    /// Keyed by the lowercase name.
    numbers_by_name: BTreeMap<String, NameEntry>,
    names_by_number: BTreeMap<u32, Vec<String>>,
}

#[derive(Clone, Debug)]
struct NameEntry {
    name: String,
    catalog_number: u32,
}

impl NameDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// The total number of names.
    pub fn name_count(&self) -> usize {
        self.numbers_by_name.len()
    }

    /// Adds a `name` for `catalog_number`.
    ///
    /// Empty names are ignored. A name that already belongs to a different object is moved over.
    pub fn add(&mut self, catalog_number: u32, name: &str) {
        if name.is_empty() {
            return;
        }

        let key = name.to_lowercase();
        let entry = NameEntry {
            name: name.to_owned(),
            catalog_number,
        };
        match self.numbers_by_name.entry(key.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(entry);
                debug!(
                    "name {name:?} moved from {} to {catalog_number}",
                    previous.catalog_number
                );
                if let Some(names) = self.names_by_number.get_mut(&previous.catalog_number) {
                    names.retain(|existing| existing.to_lowercase() != key);
                    if names.is_empty() {
                        self.names_by_number.remove(&previous.catalog_number);
                    }
                }
            }
        }

        self.names_by_number
            .entry(catalog_number)
            .or_default()
            .push(name.to_owned());
    }

    /// Removes all names of `catalog_number`.
    pub fn erase(&mut self, catalog_number: u32) {
        for name in self.names_by_number.remove(&catalog_number).unwrap_or_default() {
            self.numbers_by_name.remove(&name.to_lowercase());
        }
    }

    /// Looks up the catalog number of a name, ignoring case.
    pub fn find_catalog_number_by_name(&self, name: &str) -> Option<u32> {
        if name.is_empty() {
            return None;
        }
        self.numbers_by_name
            .get(&name.to_lowercase())
            .map(|entry| entry.catalog_number)
    }

    /// All names of `catalog_number` in the order they were added.
    pub fn names(&self, catalog_number: u32) -> impl Iterator<Item = &str> {
        self.names_by_number
            .get(&catalog_number)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// The first name of `catalog_number`.
    pub fn first_name(&self, catalog_number: u32) -> Option<&str> {
        self.names(catalog_number).next()
    }

    /// All names that start with `prefix`, ignoring case, in alphabetical order.
    pub fn completion(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        self.numbers_by_name
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, entry)| entry.name.as_str())
            .collect()
    }
}
