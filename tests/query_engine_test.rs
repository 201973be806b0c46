use chrono::{TimeZone, Utc};
use directory_engine::config::toml_config::TierPolicyTable;
use directory_engine::domain::model::Badge;
use directory_engine::utils::validation::Validate;
use directory_engine::{
    DirectoryEngine, DirectoryError, EngineConfig, Listing, ListingQuery, ListingView,
    MemoryListingStore, Tier,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn listing(id: &str, industry: &str, tier: Tier, claimed: bool, trust: u32) -> Listing {
    Listing {
        id: id.to_string(),
        business_name: format!("{} Co", id.to_uppercase()),
        slug: format!("{}-co", id),
        industry: industry.to_string(),
        city: Some("Tampa".to_string()),
        state: Some("FL".to_string()),
        tier,
        is_claimed: claimed,
        trust_score: trust,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ..Default::default()
    }
}

/// Policy table with wider weight gaps between tiers.
fn weighted_config() -> EngineConfig {
    let mut tiers = TierPolicyTable::default();
    tiers.pro.search_weight = 5;
    tiers.premium.search_weight = 10;

    let config = EngineConfig {
        tiers,
        ..Default::default()
    };
    config.validate().unwrap();
    config
}

fn sample_snapshot() -> Vec<Listing> {
    let mut electrician = listing("bright", "services", Tier::Pro, true, 70);
    electrician.description = Some("Licensed electrical contractor".to_string());
    electrician.tags = ["destination:ybor-city".to_string()].into();

    let mut plumber = listing("ace", "services", Tier::Free, false, 92);
    plumber.description = Some("Plumbing and electrical repairs".to_string());

    let mut bakery = listing("segunda", "dining", Tier::Premium, true, 88);
    bakery.description = Some("Cuban bread since 1915".to_string());
    bakery.tags = [
        "destination:ybor-city".to_string(),
        "tourism:eat-drink".to_string(),
    ]
    .into();
    bakery.gallery_images = (1..=3)
        .map(|i| format!("https://img.example.com/segunda/{}.jpg", i))
        .collect();

    let unclaimed_premium = listing("ghost", "services", Tier::Premium, false, 99);

    let mut hidden = listing("hidden", "services", Tier::Premium, true, 100);
    hidden.is_published = false;

    vec![electrician, plumber, bakery, unclaimed_premium, hidden]
}

fn engine_with(listings: Vec<Listing>, config: EngineConfig) -> DirectoryEngine<MemoryListingStore> {
    let store = MemoryListingStore::try_new(listings).unwrap();
    DirectoryEngine::new(store, Arc::new(config))
}

fn ids(page: &[ListingView]) -> Vec<&str> {
    page.iter().map(|v| v.id.as_str()).collect()
}

#[tokio::test]
async fn test_intelligence_tier_dominates_trust_score() {
    let listings = vec![
        listing("c", "services", Tier::Free, false, 99),
        listing("b", "services", Tier::Pro, true, 95),
        listing("a", "services", Tier::Premium, true, 90),
    ];
    let engine = engine_with(listings, weighted_config());

    let page = engine
        .query(&ListingQuery::new())
        .await
        .unwrap()
        .into_page()
        .unwrap();

    assert_eq!(ids(&page), vec!["a", "b", "c"]);
    assert_eq!(page[0].search_weight, 10);
    assert_eq!(page[1].search_weight, 5);
    assert_eq!(page[2].search_weight, 1);
    assert!(!page[2].has_property_intelligence);
}

#[tokio::test]
async fn test_result_ordering_properties() {
    let engine = engine_with(sample_snapshot(), weighted_config());

    let page = engine
        .query(&ListingQuery::new())
        .await
        .unwrap()
        .into_page()
        .unwrap();

    // unpublished listing never appears
    assert!(!ids(&page).contains(&"hidden"));
    assert_eq!(page.len(), 4);

    let first_without = page
        .iter()
        .position(|v| !v.has_property_intelligence)
        .unwrap_or(page.len());
    assert!(page[first_without..]
        .iter()
        .all(|v| !v.has_property_intelligence));

    for pair in page.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.has_property_intelligence == b.has_property_intelligence {
            assert!(a.search_weight >= b.search_weight);
            if a.search_weight == b.search_weight {
                assert!(a.trust_score >= b.trust_score);
            }
        }
    }

    for view in &page {
        assert!(view.total_photos_available >= view.gallery_images.len());
        if !view.is_claimed {
            assert!(!view.has_property_intelligence);
            assert_eq!(view.search_weight, 1);
        }
    }
}

#[tokio::test]
async fn test_repeated_queries_are_identical() {
    let engine = engine_with(sample_snapshot(), weighted_config());
    let query = ListingQuery::new().industry("services");

    let first = serde_json::to_string(&engine.query(&query).await.unwrap()).unwrap();
    let second = serde_json::to_string(&engine.query(&query).await.unwrap()).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_filter_order_does_not_change_result_set() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let industry_then_search = engine
        .query_params([("industry", "services"), ("search", "ELECTRICAL")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    let search_then_industry = engine
        .query_params([("search", "ELECTRICAL"), ("industry", "services")])
        .await
        .unwrap()
        .into_page()
        .unwrap();

    let mut a = ids(&industry_then_search);
    let mut b = ids(&search_then_industry);
    a.sort();
    b.sort();
    assert_eq!(a, vec!["ace", "bright"]);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_tag_filters_and_empty_matches() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let ybor = engine
        .query_params([("destination", "ybor-city")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert_eq!(ids(&ybor), vec!["segunda", "bright"]);

    let eat_drink = engine
        .query_params([("destination", "ybor-city"), ("tourism_category", "eat-drink")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert_eq!(ids(&eat_drink), vec!["segunda"]);

    // zero matches is an empty page, not an error
    let nothing = engine
        .query_params([("destination", "key-west")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_stored_tier_filter_and_all_values() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let premium = engine
        .query_params([("tier", "premium")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert_eq!(ids(&premium), vec!["segunda", "ghost"]);

    let everything = engine
        .query_params([("tier", "all"), ("industry", "all"), ("search", "")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test]
async fn test_limit_truncates_after_ranking() {
    let engine = engine_with(sample_snapshot(), weighted_config());

    let top = engine
        .query_params([("limit", "2")])
        .await
        .unwrap()
        .into_page()
        .unwrap();

    assert_eq!(ids(&top), vec!["segunda", "bright"]);
}

#[tokio::test]
async fn test_oversized_limit_is_clamped() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let page = engine
        .query_params([("limit", "100000000000000000000")])
        .await
        .unwrap()
        .into_page()
        .unwrap();

    assert_eq!(page.len(), 4);
}

#[tokio::test]
async fn test_malformed_limit_is_invalid_argument() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    for bad in ["0", "-3", "ten", "2.5"] {
        let err = engine.query_params([("limit", bad)]).await.unwrap_err();
        assert!(
            matches!(err, DirectoryError::InvalidArgument { ref field, .. } if field == "limit"),
            "limit={} gave {:?}",
            bad,
            err
        );
        assert_eq!(err.status_code(), 400);
    }

    let err = engine
        .query(&ListingQuery::new().limit(0))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_unknown_industry_and_tier_are_rejected() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let err = engine
        .query_params([("industry", "aerospace")])
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidArgument { ref field, .. } if field == "industry"));

    let err = engine.query_params([("tier", "gold")]).await.unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidArgument { ref field, .. } if field == "tier"));
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let err = engine
        .query_params([("slug", "unknown-slug-123")])
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::NotFound { ref key } if key == "unknown-slug-123"));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_slug_lookup_ignores_other_filters() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let detail = engine
        .query_params([
            ("slug", "segunda-co"),
            ("destination", "key-west"),
            ("industry", "aerospace"),
        ])
        .await
        .unwrap()
        .into_single()
        .unwrap();

    assert_eq!(detail.listing.id, "segunda");
    assert_eq!(detail.listing.gallery_images.len(), 3);
    assert!(detail.is_claimable);

    // a malformed limit is still rejected on the slug path
    let err = engine
        .query_params([("slug", "segunda-co"), ("limit", "0")])
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidArgument { ref field, .. } if field == "limit"));

    // unpublished listings are not reachable by slug either
    let err = engine
        .query_params([("slug", "hidden-co")])
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_slug_detail_includes_related_listings() {
    let mut listings = sample_snapshot();
    let mut orlando = listing("far", "services", Tier::Premium, true, 80);
    orlando.city = Some("Orlando".to_string());
    listings.push(orlando);
    let engine = engine_with(listings, EngineConfig::default());

    let detail = engine
        .query(&ListingQuery::new().slug("bright-co"))
        .await
        .unwrap()
        .into_single()
        .unwrap();

    let related: Vec<&str> = detail.related.iter().map(|r| r.id.as_str()).collect();
    // both rank as free, so trust score decides
    assert_eq!(related, vec!["ghost", "ace"]);
}

#[tokio::test]
async fn test_views_carry_only_active_badges() {
    let badge = |id: &str, active: bool| Badge {
        id: id.to_string(),
        badge_type: "verified".to_string(),
        badge_label: "Verified Business".to_string(),
        badge_color: Some("#1d4ed8".to_string()),
        badge_icon: None,
        is_active: active,
        earned_at: None,
    };
    let mut listings = sample_snapshot();
    listings[0].badges = vec![badge("b-1", true), badge("b-2", false)];
    let engine = engine_with(listings, EngineConfig::default());

    let detail = engine
        .query(&ListingQuery::new().slug("bright-co"))
        .await
        .unwrap()
        .into_single()
        .unwrap();
    let badge_ids: Vec<&str> = detail.listing.badges.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(badge_ids, vec!["b-1"]);

    let page = engine
        .query(&ListingQuery::new().industry("services"))
        .await
        .unwrap()
        .into_page()
        .unwrap();
    let bright = page.iter().find(|v| v.id == "bright").unwrap();
    assert_eq!(bright.badges.len(), 1);
    assert!(page.iter().filter(|v| v.id != "bright").all(|v| v.badges.is_empty()));
}

#[tokio::test]
async fn test_free_listing_with_five_photos() {
    let mut free = listing("free", "services", Tier::Free, true, 50);
    free.gallery_images = (1..=5)
        .map(|i| format!("https://img.example.com/free/{}.jpg", i))
        .collect();
    let engine = engine_with(vec![free], EngineConfig::default());

    let detail = engine
        .query(&ListingQuery::new().slug("free-co"))
        .await
        .unwrap()
        .into_single()
        .unwrap();

    let view = detail.listing;
    assert_eq!(view.gallery_images.len(), 1);
    assert_eq!(view.total_photos_available, 5);
    assert_eq!(
        view.cover_image_url.as_deref(),
        Some("https://img.example.com/free/1.jpg")
    );
    assert!(!view.is_placeholder_image);
}

#[tokio::test]
async fn test_response_json_shape() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());

    let page = engine.query_params([("limit", "1")]).await.unwrap();
    let json = serde_json::to_value(&page).unwrap();
    let first = &json.as_array().unwrap()[0];
    for field in [
        "id",
        "business_name",
        "slug",
        "industry",
        "tier",
        "is_claimed",
        "trust_score",
        "has_property_intelligence",
        "search_weight",
        "gallery_images",
        "total_photos_available",
        "cover_image_url",
    ] {
        assert!(first.get(field).is_some(), "missing field {}", field);
    }

    let single = engine.query_params([("slug", "ace-co")]).await.unwrap();
    let json = serde_json::to_value(&single).unwrap();
    assert!(json.is_object());
    assert_eq!(json["slug"], "ace-co");
    assert!(json["cover_image_url"].is_null());
}

#[tokio::test]
async fn test_cancelled_query_returns_nothing() {
    let engine = engine_with(sample_snapshot(), EngineConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine
        .query_with_cancel(&ListingQuery::new(), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::Cancelled));
    assert_eq!(err.status_code(), 499);
}

#[tokio::test]
async fn test_readers_keep_their_snapshot_across_replace() {
    let store = MemoryListingStore::try_new(sample_snapshot()).unwrap();
    let engine = DirectoryEngine::new(store.clone(), Arc::new(EngineConfig::default()));

    let before = engine.query(&ListingQuery::new()).await.unwrap();

    let mut upgraded = sample_snapshot();
    upgraded[1].tier = Tier::Premium;
    upgraded[1].is_claimed = true;
    store.replace(upgraded).await.unwrap();

    let before = before.into_page().unwrap();
    let after = engine
        .query(&ListingQuery::new())
        .await
        .unwrap()
        .into_page()
        .unwrap();

    let ace_before = before.iter().find(|v| v.id == "ace").unwrap();
    let ace_after = after.iter().find(|v| v.id == "ace").unwrap();
    assert_eq!(ace_before.search_weight, 1);
    assert_eq!(ace_after.search_weight, 5);
    assert!(ace_after.has_property_intelligence);
}
