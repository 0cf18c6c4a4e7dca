//! Tree entity store: the canonical, insertion-ordered set of trees.
//!
//! Trees are never removed during a session. Names are unique across the
//! store; every mutation path that touches a name goes through here.

use std::collections::HashMap;

use crate::core::{Error, Result, Timestamp};
use super::species::Species;
use super::tree::{Tree, TreeId};

#[derive(Clone, Debug, Default)]
pub struct TreeStore {
    trees: Vec<Tree>,
    index: HashMap<TreeId, usize>,
    /// Planting counter used for default names.
    planted: u32,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly planted tree with a unique default name.
    pub fn plant(&mut self, species: Species, now: Timestamp) -> TreeId {
        self.planted += 1;
        let mut sequence = self.planted;
        // a user may already have claimed the next default name
        while self.name_taken(&Tree::default_name(species, sequence), None) {
            sequence += 1;
        }
        self.planted = sequence;

        let tree = Tree::new(species, sequence, Tree::default_name(species, sequence), now);
        let id = tree.id();
        self.index.insert(id, self.trees.len());
        self.trees.push(tree);
        id
    }

    pub fn get(&self, id: TreeId) -> Option<&Tree> {
        self.index.get(&id).map(|&i| &self.trees[i])
    }

    pub fn get_mut(&mut self, id: TreeId) -> Option<&mut Tree> {
        self.index.get(&id).map(|&i| &mut self.trees[i])
    }

    pub fn contains(&self, id: TreeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tree> {
        self.trees.iter_mut()
    }

    /// Ids in planting order.
    pub fn ids(&self) -> Vec<TreeId> {
        self.trees.iter().map(Tree::id).collect()
    }

    pub fn first(&self) -> Option<&Tree> {
        self.trees.first()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Whether any tree other than `except` carries `name`.
    pub fn name_taken(&self, name: &str, except: Option<TreeId>) -> bool {
        self.trees
            .iter()
            .any(|t| Some(t.id()) != except && t.name == name)
    }

    /// Rename a tree. The new name is trimmed and must be non-empty and
    /// unique; on error nothing changes.
    pub fn rename(&mut self, id: TreeId, new_name: &str) -> Result<String> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyName);
        }
        if !self.contains(id) {
            return Err(Error::TreeNotFound(id));
        }
        if self.name_taken(trimmed, Some(id)) {
            return Err(Error::DuplicateName(trimmed.to_string()));
        }
        let tree = self.get_mut(id).ok_or(Error::TreeNotFound(id))?;
        Ok(std::mem::replace(&mut tree.name, trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_assigns_sequential_names() {
        let mut store = TreeStore::new();
        let a = store.plant(Species::Maple, Timestamp(0.0));
        let b = store.plant(Species::Oak, Timestamp(1.0));
        assert_eq!(store.get(a).unwrap().name, "Maple 1");
        assert_eq!(store.get(b).unwrap().name, "Oak 2");
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec![a, b]);
    }

    #[test]
    fn test_plant_skips_claimed_default_name() {
        let mut store = TreeStore::new();
        let a = store.plant(Species::Maple, Timestamp(0.0));
        store.rename(a, "Maple 2").unwrap();
        let b = store.plant(Species::Maple, Timestamp(1.0));
        assert_eq!(store.get(b).unwrap().name, "Maple 3");
    }

    #[test]
    fn test_rename_trims_and_checks_uniqueness() {
        let mut store = TreeStore::new();
        let a = store.plant(Species::Maple, Timestamp(0.0));
        let b = store.plant(Species::Palm, Timestamp(0.0));

        let old = store.rename(a, "  Willow  ").unwrap();
        assert_eq!(old, "Maple 1");
        assert_eq!(store.get(a).unwrap().name, "Willow");

        let err = store.rename(b, "Willow");
        assert!(matches!(err, Err(Error::DuplicateName(ref n)) if n == "Willow"));
        assert_eq!(store.get(b).unwrap().name, "Palm 2");
    }

    #[test]
    fn test_rename_to_own_name_is_allowed() {
        let mut store = TreeStore::new();
        let a = store.plant(Species::Maple, Timestamp(0.0));
        assert!(store.rename(a, "Maple 1").is_ok());
    }

    #[test]
    fn test_rename_rejects_empty_and_unknown() {
        let mut store = TreeStore::new();
        let a = store.plant(Species::Maple, Timestamp(0.0));
        assert!(matches!(store.rename(a, "   "), Err(Error::EmptyName)));
        assert!(matches!(store.rename(TreeId::new(), "x"), Err(Error::TreeNotFound(_))));
    }
}
