//! External vehicle id → actor index registry.

use fcdgym_core::ActorIndex;
use indexmap::IndexSet;

use crate::error::TraceError;

/// Assigns stable actor indices to external vehicle identifiers.
///
/// Indices are handed out in first-seen order starting at 0 and are never
/// reused or reassigned, so the mapping is a bijection between the ids
/// seen so far and `0..len()`. Backed by an [`IndexSet`], whose insertion
/// position *is* the actor index.
///
/// # Examples
///
/// ```
/// use fcdgym_core::ActorIndex;
/// use fcdgym_trace::VehicleIdRegistry;
///
/// let mut registry = VehicleIdRegistry::new();
/// assert_eq!(registry.resolve("veh7").unwrap(), ActorIndex(0));
/// assert_eq!(registry.resolve("bus2").unwrap(), ActorIndex(1));
/// assert_eq!(registry.resolve("veh7").unwrap(), ActorIndex(0));
/// assert_eq!(registry.external_id(ActorIndex(1)), Some("bus2"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct VehicleIdRegistry {
    ids: IndexSet<String>,
}

impl VehicleIdRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id`, allocating the next free index on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::RegistryFull`] if a new id would not fit in
    /// an [`ActorIndex`].
    pub fn resolve(&mut self, id: &str) -> Result<ActorIndex, TraceError> {
        if let Some(index) = self.lookup(id) {
            return Ok(index);
        }
        let next = self.ids.len();
        let index = u32::try_from(next)
            .map_err(|_| TraceError::RegistryFull { registered: next })?;
        self.ids.insert(id.to_owned());
        Ok(ActorIndex(index))
    }

    /// Index of `id` if it has been registered. Never allocates.
    pub fn lookup(&self, id: &str) -> Option<ActorIndex> {
        self.ids
            .get_index_of(id)
            .map(|i| ActorIndex(i as u32))
    }

    /// The external id registered under `index`.
    pub fn external_id(&self, index: ActorIndex) -> Option<&str> {
        self.ids.get_index(index.as_usize()).map(String::as_str)
    }

    /// Number of distinct ids registered (the trace's vehicle count).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no id has been registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(index, id)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorIndex, &str)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, id)| (ActorIndex(i as u32), id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order() {
        let mut reg = VehicleIdRegistry::new();
        for id in ["c", "a", "b", "a", "c"] {
            reg.resolve(id).unwrap();
        }
        let pairs: Vec<_> = reg.iter().map(|(i, id)| (i.0, id.to_string())).collect();
        assert_eq!(
            pairs,
            vec![(0, "c".into()), (1, "a".into()), (2, "b".into())]
        );
    }

    #[test]
    fn lookup_does_not_allocate() {
        let reg = VehicleIdRegistry::new();
        assert_eq!(reg.lookup("ghost"), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn external_id_out_of_range_is_none() {
        let mut reg = VehicleIdRegistry::new();
        reg.resolve("only").unwrap();
        assert_eq!(reg.external_id(ActorIndex(1)), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        proptest! {
            #[test]
            fn registry_is_stable_bijection(ids in prop::collection::vec("[a-e]{1,2}", 0..64)) {
                let mut reg = VehicleIdRegistry::new();
                let mut first: HashMap<String, ActorIndex> = HashMap::new();
                for id in &ids {
                    let idx = reg.resolve(id).unwrap();
                    let expected = *first.entry(id.clone()).or_insert(idx);
                    prop_assert_eq!(idx, expected);
                }
                prop_assert_eq!(reg.len(), first.len());
                for (idx, id) in reg.iter() {
                    prop_assert!(idx.as_usize() < reg.len());
                    prop_assert_eq!(reg.lookup(id), Some(idx));
                    prop_assert_eq!(reg.external_id(idx), Some(id));
                }
            }
        }
    }
}
