use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exported form of one symbol: `index` is the instruction number, `addr`
/// the byte address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub index: u32,
    pub addr: u32,
}

/// Label name to instruction-word index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    map: BTreeMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Binds `name` unless it is already bound; the first binding wins.
    pub fn insert(&mut self, name: &str, index: u32) -> bool {
        if self.contains(name) {
            return false;
        }
        self.map.insert(name.to_string(), index);
        true
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn entries(&self) -> Vec<Symbol> {
        self.map
            .iter()
            .map(|(name, &index)| Symbol {
                name: name.clone(),
                index,
                addr: index * 4,
            })
            .collect()
    }
}
