use crate::domain::model::{Entitlements, Listing};
use std::cmp::Ordering;

/// A listing paired with the entitlements resolved for this request.
#[derive(Debug, Clone, Copy)]
pub struct RankedListing<'a> {
    pub listing: &'a Listing,
    pub entitlements: Entitlements,
}

/// Total order used for every result list:
/// 1. property intelligence first
/// 2. higher search weight
/// 3. higher trust score
/// 4. earlier `created_at`, then lower `id`
pub fn compare(a: &RankedListing<'_>, b: &RankedListing<'_>) -> Ordering {
    b.entitlements
        .has_property_intelligence
        .cmp(&a.entitlements.has_property_intelligence)
        .then_with(|| b.entitlements.search_weight.cmp(&a.entitlements.search_weight))
        .then_with(|| b.listing.trust_score.cmp(&a.listing.trust_score))
        .then_with(|| a.listing.created_at.cmp(&b.listing.created_at))
        .then_with(|| a.listing.id.cmp(&b.listing.id))
}

/// 穩定排序，剩餘的平手保持輸入順序
pub fn rank(items: &mut [RankedListing<'_>]) {
    items.sort_by(compare);
}
