//! Placement correctness.

use crate::domain::Item;

/// True iff `zone_uid` is one of the item's correct zones. Decoys are
/// correct nowhere.
pub fn is_correct(item: &Item, zone_uid: &str) -> bool {
    item.correct_zones.iter().any(|uid| uid == zone_uid)
}
