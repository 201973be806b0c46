//! Pure read paths over a listing snapshot.
//!
//! Every function here takes the snapshot and configuration by reference and
//! returns freshly built views; nothing is cached or mutated between calls.

use crate::config::toml_config::{CatalogConfig, EngineConfig, QueryConfig};
use crate::core::entitlements::EntitlementResolver;
use crate::core::filter::{Criterion, FilterPredicate, ListingQuery};
use crate::core::photo_gate;
use crate::core::ranking::{rank, RankedListing};
use crate::domain::model::{
    CategoryEntry, DestinationEntry, DestinationGuide, DirectoryStats, DiscoverCatalog, Listing,
    ListingDetail, ListingEntitlements, ListingView, QueryResponse, RelatedListing,
    TOURISM_TAG_PREFIX,
};
use crate::utils::error::{DirectoryError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tokio_util::sync::CancellationToken;

/// 每處理這麼多筆就檢查一次取消訊號
const CANCEL_CHECK_INTERVAL: usize = 256;

struct Enricher<'a> {
    resolver: EntitlementResolver<'a>,
    catalog: &'a CatalogConfig,
}

impl<'a> Enricher<'a> {
    fn new(config: &'a EngineConfig) -> Self {
        Self {
            resolver: EntitlementResolver::new(&config.tiers),
            catalog: &config.catalog,
        }
    }

    fn resolve<'l>(&self, listing: &'l Listing) -> RankedListing<'l> {
        RankedListing {
            listing,
            entitlements: self.resolver.resolve(listing.tier, listing.is_claimed),
        }
    }

    fn view(&self, ranked: &RankedListing<'_>) -> ListingView {
        let listing = ranked.listing;
        let entitlements = ranked.entitlements;
        let gated = photo_gate::gate(
            &listing.gallery_images,
            entitlements.photo_limit,
            self.catalog.placeholder_for(&listing.industry),
        );

        ListingView {
            id: listing.id.clone(),
            business_name: listing.business_name.clone(),
            slug: listing.slug.clone(),
            industry: listing.industry.clone(),
            city: listing.city.clone(),
            state: listing.state.clone(),
            description: listing.description.clone(),
            phone: listing.phone.clone(),
            website: listing.website.clone(),
            tier: listing.tier,
            is_claimed: listing.is_claimed,
            trust_score: listing.trust_score,
            tags: listing.tags.clone(),
            badges: listing.active_badges(),
            has_property_intelligence: entitlements.has_property_intelligence,
            search_weight: entitlements.search_weight,
            gallery_images: gated.visible,
            total_photos_available: gated.total,
            cover_image_url: gated.cover,
            is_placeholder_image: gated.cover_is_placeholder,
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(DirectoryError::Cancelled);
    }
    Ok(())
}

/// Filters and enriches the snapshot, then ranks the survivors.
fn select_ranked<'l>(
    snapshot: &'l [Listing],
    predicate: &FilterPredicate,
    enricher: &Enricher<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<RankedListing<'l>>> {
    let mut selected = Vec::new();
    for (i, listing) in snapshot.iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 {
            ensure_active(cancel)?;
        }
        if predicate.matches(listing) {
            selected.push(enricher.resolve(listing));
        }
    }

    ensure_active(cancel)?;
    rank(&mut selected);
    ensure_active(cancel)?;
    Ok(selected)
}

fn resolve_limit(requested: Option<usize>, config: &QueryConfig) -> usize {
    let limit = requested.unwrap_or_else(|| config.effective_default_limit());
    if limit > config.max_limit {
        tracing::warn!(
            "⚠️ Requested limit {} exceeds maximum {}, clamping",
            limit,
            config.max_limit
        );
        return config.max_limit;
    }
    limit
}

/// Runs one listing query against a snapshot.
///
/// A `slug` short-circuits every other filter and yields a single detail
/// view; otherwise the result is the ranked, truncated page.
pub fn execute(
    snapshot: &[Listing],
    query: &ListingQuery,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<QueryResponse> {
    // slug 查詢忽略其他篩選條件，只檢查 limit 格式
    if let Some(slug) = &query.slug {
        query.validate_limit()?;
        ensure_active(cancel)?;
        let detail = lookup_slug(snapshot, slug, config, cancel)?;
        return Ok(QueryResponse::Single(Box::new(detail)));
    }

    query.validate(&config.catalog)?;
    ensure_active(cancel)?;

    let enricher = Enricher::new(config);
    let predicate = FilterPredicate::from_query(query);
    let limit = resolve_limit(query.limit, &config.query);

    let ranked = select_ranked(snapshot, &predicate, &enricher, cancel)?;
    let matched = ranked.len();
    let page: Vec<ListingView> = ranked
        .iter()
        .take(limit)
        .map(|r| enricher.view(r))
        .collect();

    tracing::debug!(
        "Query matched {} of {} listings, returning {}",
        matched,
        snapshot.len(),
        page.len()
    );
    Ok(QueryResponse::Page(page))
}

/// Exact slug lookup over published listings.
pub fn lookup_slug(
    snapshot: &[Listing],
    slug: &str,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<ListingDetail> {
    let enricher = Enricher::new(config);

    let listing = snapshot
        .iter()
        .find(|l| l.is_published && l.slug == slug)
        .ok_or_else(|| DirectoryError::not_found(slug))?;

    let view = enricher.view(&enricher.resolve(listing));
    let related = related_listings(snapshot, listing, config, &enricher, cancel)?;

    Ok(ListingDetail {
        is_claimable: config.catalog.is_claimable(&listing.business_name),
        listing: view,
        related,
    })
}

/// 同城市、同產業的其他商家
fn related_listings(
    snapshot: &[Listing],
    listing: &Listing,
    config: &EngineConfig,
    enricher: &Enricher<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<RelatedListing>> {
    let Some(city) = listing.city.as_deref() else {
        return Ok(Vec::new());
    };
    if config.query.related_limit == 0 {
        return Ok(Vec::new());
    }

    let predicate = FilterPredicate::new()
        .and(Criterion::Published)
        .and(Criterion::Industry(listing.industry.clone()));

    let related = select_ranked(snapshot, &predicate, enricher, cancel)?
        .into_iter()
        .filter(|r| r.listing.id != listing.id && r.listing.city.as_deref() == Some(city))
        .take(config.query.related_limit)
        .map(|r| RelatedListing::from(&enricher.view(&r)))
        .collect();

    Ok(related)
}

/// Listings of one destination grouped into tourism-category sections.
pub fn build_guide(
    snapshot: &[Listing],
    destination: &str,
    config: &EngineConfig,
    cancel: &CancellationToken,
) -> Result<DestinationGuide> {
    let destination = destination.trim();
    if destination.is_empty() {
        return Err(DirectoryError::invalid_argument(
            "destination",
            destination,
            "destination parameter required",
        ));
    }

    let enricher = Enricher::new(config);
    let predicate = FilterPredicate::new()
        .and(Criterion::Published)
        .and(Criterion::destination(destination));

    let mut ranked = select_ranked(snapshot, &predicate, &enricher, cancel)?;
    ranked.truncate(config.query.guide_limit);

    let mut sections = BTreeMap::new();
    let mut total_count = 0;
    for category in &config.catalog.tourism_categories {
        let tag = format!("{}{}", TOURISM_TAG_PREFIX, category.id);
        let listings: Vec<ListingView> = ranked
            .iter()
            .filter(|r| r.listing.has_tag(&tag))
            .map(|r| enricher.view(r))
            .collect();
        total_count += listings.len();
        sections.insert(category.id.clone(), listings);
    }

    tracing::debug!(
        "Guide for {}: {} listings across {} sections",
        destination,
        total_count,
        sections.len()
    );

    Ok(DestinationGuide {
        destination: destination.to_string(),
        total_count,
        sections,
    })
}

pub fn discover_catalog(config: &EngineConfig) -> DiscoverCatalog {
    DiscoverCatalog {
        destinations: config
            .catalog
            .destinations
            .iter()
            .map(|d| DestinationEntry {
                id: d.id.clone(),
                label: d.label.clone(),
                state: d.state.clone(),
            })
            .collect(),
        categories: config
            .catalog
            .tourism_categories
            .iter()
            .map(|c| CategoryEntry {
                id: c.id.clone(),
                label: c.label.clone(),
                industry: c.industry.clone(),
            })
            .collect(),
    }
}

pub fn compute_stats(snapshot: &[Listing]) -> DirectoryStats {
    let mut total_businesses = 0;
    let mut destinations = BTreeSet::new();
    let mut cities = BTreeSet::new();
    let mut industries = BTreeSet::new();

    for listing in snapshot.iter().filter(|l| l.is_published) {
        total_businesses += 1;
        destinations.extend(listing.destinations());
        if let Some(city) = listing.city.as_deref().filter(|c| !c.is_empty()) {
            cities.insert(city);
        }
        if !listing.industry.is_empty() {
            industries.insert(listing.industry.as_str());
        }
    }

    // 沒有 destination 標籤時以城市數代替
    let total_destinations = if destinations.is_empty() {
        cities.len()
    } else {
        destinations.len()
    };

    DirectoryStats {
        total_businesses,
        total_destinations,
        total_categories: industries.len(),
    }
}

pub fn lookup_entitlements(
    snapshot: &[Listing],
    listing_id: &str,
    config: &EngineConfig,
) -> Result<ListingEntitlements> {
    let listing = snapshot
        .iter()
        .find(|l| l.id == listing_id)
        .ok_or_else(|| DirectoryError::not_found(listing_id))?;

    let resolver = EntitlementResolver::new(&config.tiers);
    Ok(ListingEntitlements {
        listing_id: listing.id.clone(),
        business_name: listing.business_name.clone(),
        tier: listing.tier,
        is_claimed: listing.is_claimed,
        entitlements: resolver.resolve(listing.tier, listing.is_claimed),
    })
}
