//! Ordered, unique entity names with an optional name to id index
use indexmap::{IndexMap, IndexSet};

use crate::network::{EntityKind, EntityRef, NetworkError};

/// Ordered sequence of unique names, the position of a name is its integer id
///
/// When indexed, a name to id map is kept alongside the names, giving O(1) lookup.
/// Otherwise lookups fall back to a linear scan of the names.
#[derive(Clone, Debug, PartialEq)]
pub struct Names {
    kind: EntityKind,
    order: Vec<String>,
    index: Option<IndexMap<String, usize>>,
}

impl Names {
    /// Create a new name table
    ///
    /// # Errors
    /// [`NetworkError::DuplicateEntity`] if a name appears more than once
    pub fn new(kind: EntityKind, names: Vec<String>, indexed: bool) -> Result<Self, NetworkError> {
        let mut seen: IndexSet<&str> = IndexSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(NetworkError::duplicate(kind, name));
            }
        }
        Ok(Self::new_unchecked(kind, names, indexed))
    }

    /// Create an empty name table
    pub fn empty(kind: EntityKind, indexed: bool) -> Self {
        Self::new_unchecked(kind, Vec::new(), indexed)
    }

    fn new_unchecked(kind: EntityKind, order: Vec<String>, indexed: bool) -> Self {
        let index = indexed.then(|| {
            order
                .iter()
                .enumerate()
                .map(|(i, n)| (n.clone(), i))
                .collect()
        });
        Names { kind, order, index }
    }

    /// Kind of entity these names refer to
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether lookups use the name to id map
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Name associated with an id, None if the id is out of range
    pub fn name(&self, id: usize) -> Option<&str> {
        self.order.get(id).map(String::as_str)
    }

    /// Name associated with an id
    ///
    /// # Errors
    /// [`NetworkError::InvalidArgument`] if the id is out of range
    pub fn name_of(&self, id: usize) -> Result<&str, NetworkError> {
        self.check_id(id)?;
        Ok(&self.order[id])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(name).copied(),
            None => self.order.iter().position(|n| n == name),
        }
    }

    /// Id of a name
    ///
    /// # Errors
    /// [`NetworkError::NotFound`] if the name is absent
    pub fn get_id(&self, name: &str) -> Result<usize, NetworkError> {
        self.position(name)
            .ok_or_else(|| NetworkError::not_found(self.kind, name))
    }

    /// Check that an id is within range
    pub fn check_id(&self, id: usize) -> Result<usize, NetworkError> {
        if id < self.order.len() {
            Ok(id)
        } else {
            Err(NetworkError::InvalidArgument(format!(
                "{} id {} is out of range (there are {})",
                self.kind,
                id,
                self.order.len()
            )))
        }
    }

    /// Check that every id is within range
    pub fn check_ids<'a, I: IntoIterator<Item = &'a usize>>(
        &self,
        ids: I,
    ) -> Result<(), NetworkError> {
        ids.into_iter()
            .try_for_each(|id| self.check_id(*id).map(|_| ()))
    }

    /// Check that `ids` can be selected: every id in range and none repeated
    ///
    /// # Errors
    /// [`NetworkError::InvalidArgument`] for an id out of range or listed twice
    pub fn check_selection(&self, ids: &[usize]) -> Result<(), NetworkError> {
        let mut seen: IndexSet<usize> = IndexSet::with_capacity(ids.len());
        for &id in ids {
            self.check_id(id)?;
            if !seen.insert(id) {
                return Err(NetworkError::InvalidArgument(format!(
                    "{} id {} is selected more than once",
                    self.kind, id
                )));
            }
        }
        Ok(())
    }

    /// Resolve a reference (id or name) into an id
    pub fn resolve(&self, entity: &EntityRef) -> Result<usize, NetworkError> {
        match entity {
            EntityRef::Id(id) => self.check_id(*id),
            EntityRef::Name(name) => self.get_id(name),
        }
    }

    /// Append a name, returning its id
    ///
    /// Uniqueness is checked by the callers, which validate a whole batch before mutating.
    pub(crate) fn push(&mut self, name: String) -> usize {
        let id = self.order.len();
        if let Some(index) = self.index.as_mut() {
            index.insert(name.clone(), id);
        }
        self.order.push(name);
        id
    }

    /// New table holding the names of `ids`, renumbered in the given order
    ///
    /// # Errors
    /// See [`Names::check_selection`]
    pub(crate) fn select(&self, ids: &[usize]) -> Result<Names, NetworkError> {
        self.check_selection(ids)?;
        let order = ids.iter().map(|&i| self.order[i].clone()).collect();
        Ok(Self::new_unchecked(self.kind, order, self.is_indexed()))
    }
}
