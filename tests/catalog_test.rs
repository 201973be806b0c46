use chrono::{TimeZone, Utc};
use directory_engine::{
    DirectoryEngine, DirectoryError, EngineConfig, Listing, MemoryListingStore, Tier,
};
use std::sync::Arc;

fn tagged(id: &str, industry: &str, tier: Tier, trust: u32, tags: &[&str]) -> Listing {
    Listing {
        id: id.to_string(),
        business_name: id.to_string(),
        slug: id.to_lowercase().replace(' ', "-"),
        industry: industry.to_string(),
        city: Some("Key West".to_string()),
        tier,
        is_claimed: tier != Tier::Free,
        trust_score: trust,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at: Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap(),
        ..Default::default()
    }
}

fn key_west_engine() -> DirectoryEngine<MemoryListingStore> {
    let listings = vec![
        tagged(
            "Blue Heaven",
            "dining",
            Tier::Pro,
            81,
            &["destination:key-west", "tourism:eat-drink"],
        ),
        tagged(
            "Cuban Coffee Queen",
            "dining",
            Tier::Free,
            93,
            &["destination:key-west", "tourism:eat-drink", "tourism:quick-eats"],
        ),
        tagged(
            "Southernmost Beach Cafe",
            "dining",
            Tier::Premium,
            70,
            &["destination:key-west", "tourism:eat-drink"],
        ),
        tagged(
            "Sunset Sail",
            "destinations",
            Tier::Free,
            60,
            &["destination:key-west", "tourism:things-to-do"],
        ),
        tagged(
            "Clearwater Dive Shop",
            "destinations",
            Tier::Pro,
            75,
            &["destination:clearwater", "tourism:things-to-do"],
        ),
    ];
    let store = MemoryListingStore::try_new(listings).unwrap();
    DirectoryEngine::new(store, Arc::new(EngineConfig::default()))
}

#[tokio::test]
async fn test_guide_groups_ranked_listings_by_category() {
    let engine = key_west_engine();

    let guide = engine.guide("key-west").await.unwrap();

    assert_eq!(guide.destination, "key-west");
    // one section per configured category, empty ones included
    assert_eq!(guide.sections.len(), 10);
    assert!(guide.sections["stay"].is_empty());

    let eat_drink: Vec<&str> = guide.sections["eat-drink"]
        .iter()
        .map(|v| v.business_name.as_str())
        .collect();
    assert_eq!(
        eat_drink,
        vec!["Southernmost Beach Cafe", "Blue Heaven", "Cuban Coffee Queen"]
    );
    assert_eq!(guide.sections["quick-eats"].len(), 1);
    assert_eq!(guide.sections["things-to-do"].len(), 1);

    // a listing counts once per section it appears in
    assert_eq!(guide.total_count, 5);

    let json = serde_json::to_value(&guide).unwrap();
    assert_eq!(json["totalCount"], 5);
}

#[tokio::test]
async fn test_guide_for_unknown_destination_is_empty() {
    let engine = key_west_engine();

    let guide = engine.guide("atlantis").await.unwrap();

    assert_eq!(guide.total_count, 0);
    assert!(guide.sections.values().all(Vec::is_empty));
}

#[tokio::test]
async fn test_guide_requires_destination() {
    let engine = key_west_engine();

    let err = engine.guide("  ").await.unwrap_err();

    assert!(matches!(err, DirectoryError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_discover_lists_configured_catalog() {
    let engine = key_west_engine();

    let catalog = engine.discover();

    assert_eq!(catalog.destinations.len(), 6);
    assert!(catalog
        .destinations
        .iter()
        .any(|d| d.id == "key-west" && d.label == "Key West" && d.state == "FL"));
    assert_eq!(catalog.categories.len(), 10);
    assert_eq!(catalog.categories[0].id, "stay");
    assert_eq!(catalog.categories[0].industry, "hotels-lodging");
}

#[tokio::test]
async fn test_stats_count_published_listings() {
    let engine = key_west_engine();

    let stats = engine.stats().await.unwrap();

    assert_eq!(stats.total_businesses, 5);
    assert_eq!(stats.total_destinations, 2);
    assert_eq!(stats.total_categories, 2);

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["totalBusinesses"], 5);
}

#[tokio::test]
async fn test_stats_fall_back_to_cities_without_destination_tags() {
    let mut a = tagged("Alpha Electric", "services", Tier::Free, 10, &[]);
    a.city = Some("Tampa".to_string());
    let mut b = tagged("Beta Dental", "health-wellness", Tier::Free, 10, &[]);
    b.city = Some("Sarasota".to_string());
    let mut c = tagged("Gamma Hidden", "services", Tier::Free, 10, &[]);
    c.city = Some("Miami".to_string());
    c.is_published = false;

    let store = MemoryListingStore::try_new(vec![a, b, c]).unwrap();
    let engine = DirectoryEngine::new(store, Arc::new(EngineConfig::default()));

    let stats = engine.stats().await.unwrap();

    assert_eq!(stats.total_businesses, 2);
    assert_eq!(stats.total_destinations, 2);
    assert_eq!(stats.total_categories, 2);
}

#[tokio::test]
async fn test_entitlements_lookup_by_id() {
    let engine = key_west_engine();

    let pro = engine.entitlements("Blue Heaven").await.unwrap();
    assert_eq!(pro.tier, Tier::Pro);
    assert_eq!(pro.entitlements.photo_limit, 2);
    assert!(pro.entitlements.has_verified_badge);
    assert!(!pro.entitlements.has_featured_placement);

    let premium = engine.entitlements("Southernmost Beach Cafe").await.unwrap();
    assert_eq!(premium.entitlements.photo_limit, 999);
    assert!(premium.entitlements.has_featured_placement);

    let err = engine.entitlements("no-such-id").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_unclaimed_listing_resolves_to_free_entitlements() {
    let mut listing = tagged("Mallory Square", "destinations", Tier::Premium, 50, &[]);
    listing.is_claimed = false;
    let store = MemoryListingStore::try_new(vec![listing]).unwrap();
    let engine = DirectoryEngine::new(store, Arc::new(EngineConfig::default()));

    let result = engine.entitlements("Mallory Square").await.unwrap();

    // stored tier is reported, effective entitlements are free
    assert_eq!(result.tier, Tier::Premium);
    assert_eq!(result.entitlements.tier, Tier::Free);
    assert_eq!(result.entitlements.photo_limit, 1);
    assert_eq!(result.entitlements.search_weight, 1);
    assert!(!result.entitlements.has_property_intelligence);
}
