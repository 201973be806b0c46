use crate::config::toml_config::TierPolicyTable;
use crate::domain::model::{Entitlements, Tier};

/// Maps (tier, is_claimed) to entitlements using the injected policy table.
#[derive(Debug, Clone, Copy)]
pub struct EntitlementResolver<'a> {
    policies: &'a TierPolicyTable,
}

impl<'a> EntitlementResolver<'a> {
    pub fn new(policies: &'a TierPolicyTable) -> Self {
        Self { policies }
    }

    /// 未認領的商家一律降為 free，避免沿用過期的等級資料
    pub fn effective_tier(tier: Tier, is_claimed: bool) -> Tier {
        if is_claimed {
            tier
        } else {
            Tier::Free
        }
    }

    pub fn resolve(&self, tier: Tier, is_claimed: bool) -> Entitlements {
        let effective = Self::effective_tier(tier, is_claimed);
        let policy = self.policies.policy(effective);

        Entitlements {
            tier: effective,
            photo_limit: policy.photo_limit,
            has_property_intelligence: policy.has_property_intelligence,
            search_weight: policy.search_weight.max(1),
            has_verified_badge: policy.has_verified_badge,
            has_cta_buttons: policy.has_cta_buttons,
            has_featured_placement: policy.has_featured_placement,
        }
    }
}
