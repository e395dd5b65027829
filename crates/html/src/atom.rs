//! Atom table for canonicalized tag/attribute names.

use std::collections::HashMap;
use std::sync::Arc;

/// Opaque atom identifier, only meaningful for the table that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub u32);

/// Per-parse atom table.
///
/// Invariant: ASCII letters are stored in canonical lowercase form.
#[derive(Debug, Default)]
pub struct AtomTable {
    atoms: Vec<Arc<str>>,
    map: HashMap<Arc<str>, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, applying ASCII-lowercase folding.
    pub fn intern_ascii_lowercase(&mut self, name: &str) -> AtomId {
        if !name.bytes().any(|b| b.is_ascii_uppercase()) {
            if let Some(id) = self.map.get(name) {
                return *id;
            }
            return self.insert(Arc::from(name));
        }
        let folded = name.to_ascii_lowercase();
        if let Some(id) = self.map.get(folded.as_str()) {
            return *id;
        }
        self.insert(Arc::from(folded))
    }

    fn insert(&mut self, atom: Arc<str>) -> AtomId {
        // A fragment cannot hold more than u32::MAX distinct names before the
        // input itself exceeds addressable memory on supported targets.
        let id = AtomId(self.atoms.len() as u32);
        self.atoms.push(Arc::clone(&atom));
        self.map.insert(atom, id);
        id
    }

    pub fn resolve(&self, id: AtomId) -> &str {
        self.atoms.get(id.0 as usize).map_or("", |s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
