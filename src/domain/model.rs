use crate::utils::error::DirectoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub const DESTINATION_TAG_PREFIX: &str = "destination:";
pub const TOURISM_TAG_PREFIX: &str = "tourism:";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Pro, Tier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "premium" => Ok(Tier::Premium),
            other => Err(DirectoryError::invalid_argument(
                "tier",
                other,
                "expected one of: free, pro, premium",
            )),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A business entry as stored. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub business_name: String,
    pub slug: String,
    pub industry: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub is_claimed: bool,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub trust_score: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    pub created_at: DateTime<Utc>,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            id: String::new(),
            business_name: String::new(),
            slug: String::new(),
            industry: String::new(),
            city: None,
            state: None,
            zip_code: None,
            description: None,
            phone: None,
            website: None,
            tier: Tier::Free,
            is_claimed: false,
            is_published: true,
            trust_score: 0,
            tags: BTreeSet::new(),
            gallery_images: Vec::new(),
            badges: Vec::new(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

impl Listing {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter_map(|t| t.strip_prefix(DESTINATION_TAG_PREFIX))
    }

    pub fn active_badges(&self) -> Vec<Badge> {
        self.badges.iter().filter(|b| b.is_active).cloned().collect()
    }
}

/// Earned directory badge. Only active badges are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub badge_type: String,
    pub badge_label: String,
    #[serde(default)]
    pub badge_color: Option<String>,
    #[serde(default)]
    pub badge_icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
}

/// Tier-derived flags, computed fresh for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    /// 實際生效的等級 (未認領一律視為 free)
    pub tier: Tier,
    pub photo_limit: u32,
    pub has_property_intelligence: bool,
    pub search_weight: u32,
    pub has_verified_badge: bool,
    pub has_cta_buttons: bool,
    pub has_featured_placement: bool,
}

/// Visible representation of one listing in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingView {
    pub id: String,
    pub business_name: String,
    pub slug: String,
    pub industry: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub tier: Tier,
    pub is_claimed: bool,
    pub trust_score: u32,
    pub tags: BTreeSet<String>,
    pub badges: Vec<Badge>,
    pub has_property_intelligence: bool,
    pub search_weight: u32,
    pub gallery_images: Vec<String>,
    pub total_photos_available: usize,
    pub cover_image_url: Option<String>,
    pub is_placeholder_image: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedListing {
    pub id: String,
    pub business_name: String,
    pub slug: String,
    pub industry: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub tier: Tier,
    pub cover_image_url: Option<String>,
}

impl From<&ListingView> for RelatedListing {
    fn from(view: &ListingView) -> Self {
        Self {
            id: view.id.clone(),
            business_name: view.business_name.clone(),
            slug: view.slug.clone(),
            industry: view.industry.clone(),
            city: view.city.clone(),
            state: view.state.clone(),
            tier: view.tier,
            cover_image_url: view.cover_image_url.clone(),
        }
    }
}

/// Single-listing view returned by a slug lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: ListingView,
    pub is_claimable: bool,
    pub related: Vec<RelatedListing>,
}

/// 查詢結果：slug 查詢回傳單一物件，其餘回傳陣列
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Single(Box<ListingDetail>),
    Page(Vec<ListingView>),
}

impl QueryResponse {
    pub fn into_page(self) -> Option<Vec<ListingView>> {
        match self {
            QueryResponse::Page(items) => Some(items),
            QueryResponse::Single(_) => None,
        }
    }

    pub fn into_single(self) -> Option<ListingDetail> {
        match self {
            QueryResponse::Single(detail) => Some(*detail),
            QueryResponse::Page(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationGuide {
    pub destination: String,
    pub total_count: usize,
    pub sections: BTreeMap<String, Vec<ListingView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationEntry {
    pub id: String,
    pub label: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub id: String,
    pub label: String,
    pub industry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverCatalog {
    pub destinations: Vec<DestinationEntry>,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    pub total_businesses: usize,
    pub total_destinations: usize,
    pub total_categories: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntitlements {
    pub listing_id: String,
    pub business_name: String,
    pub tier: Tier,
    pub is_claimed: bool,
    pub entitlements: Entitlements,
}
