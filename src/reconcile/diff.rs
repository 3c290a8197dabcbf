//! Set difference between persisted and desired association sets.

use std::collections::BTreeSet;

use crate::core::EntityId;

/// The minimal operations turning one association set into another.
///
/// Both input sets hold [`EntityId`]s, which are normalized at construction,
/// so the difference is computed strictly post-normalization: the same
/// conceptual id (`5` vs `"5"`) can never land in both `to_add` and
/// `to_remove`. Ids present in both sets are left untouched.
///
/// The vectors iterate in id order, keeping application order and failure
/// reports deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssociationDiff {
    /// Ids in the desired set but not yet persisted
    pub to_add: Vec<EntityId>,
    /// Ids persisted but no longer desired
    pub to_remove: Vec<EntityId>,
    /// Ids present on both sides, requiring no operation
    pub unchanged: Vec<EntityId>,
}

impl AssociationDiff {
    /// Diff `current` (persisted) against `desired` (as edited on screen).
    pub fn between(current: &BTreeSet<EntityId>, desired: &BTreeSet<EntityId>) -> Self {
        Self {
            to_add: desired.difference(current).cloned().collect(),
            to_remove: current.difference(desired).cloned().collect(),
            unchanged: current.intersection(desired).cloned().collect(),
        }
    }

    /// Whether applying this diff requires no store operation at all.
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Total number of store operations this diff will issue.
    pub fn op_count(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[i64]) -> BTreeSet<EntityId> {
        values.iter().map(|&v| EntityId::from(v)).collect()
    }

    #[test]
    fn overlapping_sets_produce_minimal_operations() {
        let diff = AssociationDiff::between(&ids(&[1, 2, 3]), &ids(&[2, 3, 4]));
        assert_eq!(diff.to_add, vec![EntityId::from(4)]);
        assert_eq!(diff.to_remove, vec![EntityId::from(1)]);
        assert_eq!(diff.unchanged, vec![EntityId::from(2), EntityId::from(3)]);
    }

    #[test]
    fn equal_sets_are_a_noop() {
        let diff = AssociationDiff::between(&ids(&[1, 2]), &ids(&[1, 2]));
        assert!(diff.is_noop());
        assert_eq!(diff.op_count(), 0);
    }

    #[test]
    fn empty_desired_set_removes_everything() {
        let diff = AssociationDiff::between(&ids(&[1, 2]), &BTreeSet::new());
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove.len(), 2);
    }

    #[test]
    fn mixed_string_and_numeric_forms_cancel_out() {
        // "5" arrives from the widget, 5 from the database: same entity.
        let current = ids(&[5]);
        let desired: BTreeSet<EntityId> = [EntityId::from("5")].into();
        let diff = AssociationDiff::between(&current, &desired);
        assert!(diff.is_noop());
        assert_eq!(diff.unchanged, vec![EntityId::from(5)]);
    }
}
