//! Cross-batch uniqueness checking.
//!
//! After a commit every entity in the batch holds exactly one name: its
//! candidate when it will change, its original name otherwise. A changing
//! item is a duplicate when any *other* item will hold the same name. The
//! check is exact and case-sensitive.
//!
//! Counting each item's occupied name once makes the check linear: a changing
//! item's own candidate contributes one to the count, so it collides with
//! another item exactly when the count reaches two.

use std::collections::HashMap;

use crate::item::RenameItem;
use crate::validation::{InvalidReason, Validity};

/// Returns one flag per item, true where the item's candidate collides.
///
/// Only items that will change can be flagged.
#[must_use]
pub fn find_duplicates(items: &[RenameItem]) -> Vec<bool> {
    let mut occupancy: HashMap<&str, usize> = HashMap::with_capacity(items.len());
    for item in items {
        *occupancy.entry(item.occupied_name()).or_default() += 1;
    }

    items
        .iter()
        .map(|item| {
            item.will_change()
                && occupancy
                    .get(item.candidate_name())
                    .is_some_and(|count| *count > 1)
        })
        .collect()
}

/// Marks colliding items as [`InvalidReason::Duplicate`].
///
/// Structural failures already recorded on an item take precedence. Items
/// that no longer collide, or no longer change, lose a stale duplicate mark.
/// Returns the number of items marked as duplicates.
pub fn resolve(items: &mut [RenameItem]) -> usize {
    let duplicates = find_duplicates(items);
    let mut marked = 0;
    for (item, is_duplicate) in items.iter_mut().zip(duplicates) {
        match (item.validity(), is_duplicate) {
            (Validity::Valid, true) => {
                item.set_validity(Validity::Invalid(InvalidReason::Duplicate));
                marked += 1;
            }
            (Validity::Invalid(InvalidReason::Duplicate), true) => marked += 1,
            (Validity::Invalid(InvalidReason::Duplicate), false) => {
                item.set_validity(Validity::Valid);
            }
            _ => {}
        }
    }
    if marked > 0 {
        tracing::debug!(duplicates = marked, "duplicate candidate names detected");
    }
    marked
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::store::EntityId;

    /// Pairwise reference check: each changing item against the name every
    /// other item will hold.
    fn reference_duplicates(items: &[RenameItem]) -> Vec<bool> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.will_change() {
                    return false;
                }
                items
                    .iter()
                    .enumerate()
                    .filter(|(other_index, _)| *other_index != index)
                    .any(|(_, other)| {
                        let other_name = if other.will_change() {
                            other.candidate_name()
                        } else {
                            other.original_name()
                        };
                        other_name == item.candidate_name()
                    })
            })
            .collect()
    }

    /// Builds items from `(original, candidate, selected)` triples.
    fn batch(spec: &[(&str, &str, bool)]) -> Vec<RenameItem> {
        spec.iter()
            .zip(1_u64..)
            .map(|((original, candidate, selected), id)| {
                let mut item = RenameItem::new(EntityId::new(id), *original);
                item.set_candidate((*candidate).to_owned());
                item.set_selected(*selected);
                item
            })
            .collect()
    }

    #[test]
    fn two_changing_items_with_same_candidate_collide() {
        let items = batch(&[("A", "TypeA", true), ("B", "TypeA", true), ("C", "C", true)]);
        assert_eq!(find_duplicates(&items), vec![true, true, false]);
    }

    #[test]
    fn deselecting_one_side_clears_the_other() {
        let items = batch(&[("A", "TypeA", true), ("B", "TypeA", false)]);
        assert_eq!(find_duplicates(&items), vec![false, false]);
    }

    #[test]
    fn candidate_matching_unchanged_original_collides() {
        let items = batch(&[("A", "B", true), ("B", "B", true)]);
        assert_eq!(find_duplicates(&items), vec![true, false]);
    }

    #[test]
    fn candidate_matching_deselected_original_collides() {
        let items = batch(&[("A", "B", true), ("B", "X", false)]);
        assert_eq!(find_duplicates(&items), vec![true, false]);
    }

    #[test]
    fn swapping_names_is_not_a_duplicate() {
        let items = batch(&[("A", "B", true), ("B", "A", true)]);
        assert_eq!(find_duplicates(&items), vec![false, false]);
    }

    #[test]
    fn unchanged_item_is_not_its_own_duplicate() {
        let items = batch(&[("A", "A", true)]);
        assert_eq!(find_duplicates(&items), vec![false]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let items = batch(&[("A", "type", true), ("B", "TYPE", true)]);
        assert_eq!(find_duplicates(&items), vec![false, false]);
    }

    #[rstest]
    #[case(&[("A", "X", true), ("B", "X", true), ("C", "X", true)])]
    #[case(&[("A", "X", true), ("X", "X", false), ("C", "Y", true), ("Y", "Z", true)])]
    #[case(&[("A", "", true), ("B", "A", true), ("C", "D", false), ("D", "C", true)])]
    #[case(&[("A", "B", true), ("B", "C", true), ("C", "A", true), ("D", "A", false)])]
    #[case(&[("Same", "Same", true), ("Other", "Same", true), ("Third", "Same", false)])]
    #[case(&[])]
    fn counting_matches_pairwise_reference(#[case] spec: &[(&str, &str, bool)]) {
        let items = batch(spec);
        assert_eq!(find_duplicates(&items), reference_duplicates(&items));
    }

    #[test]
    fn resolve_keeps_structural_reason_and_clears_stale_duplicates() {
        let mut items = batch(&[("A", "X:", true), ("B", "X:", true), ("C", "D", true)]);
        items[0].set_validity(Validity::Invalid(InvalidReason::IllegalCharacters));
        items[2].set_validity(Validity::Invalid(InvalidReason::Duplicate));

        let marked = resolve(&mut items);

        assert_eq!(marked, 1);
        assert_eq!(
            items[0].invalid_reason(),
            Some(InvalidReason::IllegalCharacters)
        );
        assert_eq!(items[1].invalid_reason(), Some(InvalidReason::Duplicate));
        assert_eq!(items[2].validity(), Validity::Valid);
    }
}
