use crate::config::toml_config::CatalogConfig;
use crate::domain::model::{Listing, Tier, DESTINATION_TAG_PREFIX, TOURISM_TAG_PREFIX};
use crate::utils::error::{DirectoryError, Result};
use std::num::IntErrorKind;

/// Parsed query parameters of a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub slug: Option<String>,
    pub industry: Option<String>,
    pub destination: Option<String>,
    pub tourism_category: Option<String>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub tier: Option<Tier>,
    pub limit: Option<usize>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 HTTP query string 風格的鍵值對解析。空值視為未提供，未知的鍵忽略
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "slug" => query.slug = Some(value.to_string()),
                "industry" if value == "all" => query.industry = None,
                "industry" => query.industry = Some(value.to_string()),
                "destination" => query.destination = Some(value.to_string()),
                "tourism_category" => query.tourism_category = Some(value.to_string()),
                "search" => query.search = Some(value.to_string()),
                "city" => query.city = Some(value.to_string()),
                "zip" => query.zip = Some(value.to_string()),
                "tier" if value == "all" => query.tier = None,
                "tier" => query.tier = Some(value.parse()?),
                "limit" => query.limit = Some(parse_limit(value)?),
                other => tracing::debug!("Ignoring unknown query parameter `{}`", other),
            }
        }

        Ok(query)
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn tourism_category(mut self, category: impl Into<String>) -> Self {
        self.tourism_category = Some(category.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate_limit(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(DirectoryError::invalid_argument(
                "limit",
                "0",
                "must be a positive integer",
            ));
        }
        Ok(())
    }

    /// 檢查參數是否合法 (limit 必須為正、industry 必須在目錄內)
    pub fn validate(&self, catalog: &CatalogConfig) -> Result<()> {
        self.validate_limit()?;
        if let Some(industry) = &self.industry {
            if !catalog.is_known_industry(industry) {
                return Err(DirectoryError::invalid_argument(
                    "industry",
                    industry.as_str(),
                    "unknown industry code",
                ));
            }
        }
        Ok(())
    }
}

fn parse_limit(value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(0) => Err(DirectoryError::invalid_argument(
            "limit",
            value,
            "must be a positive integer",
        )),
        Ok(n) => Ok(n),
        // 超過 usize 的正整數交給 resolve_limit 截斷
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(_) if is_negative_integer(value) => Err(DirectoryError::invalid_argument(
            "limit",
            value,
            "must be a positive integer",
        )),
        Err(_) => Err(DirectoryError::invalid_argument(
            "limit",
            value,
            "not an integer",
        )),
    }
}

fn is_negative_integer(value: &str) -> bool {
    value
        .strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// A single filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Published,
    Industry(String),
    /// Full namespaced tag, e.g. `destination:key-west`.
    Tag(String),
    /// Lowercased search term.
    Search(String),
    /// Lowercased city fragment.
    City(String),
    Zip(String),
    StoredTier(Tier),
}

impl Criterion {
    pub fn destination(destination: &str) -> Self {
        Criterion::Tag(format!("{}{}", DESTINATION_TAG_PREFIX, destination))
    }

    pub fn tourism_category(category: &str) -> Self {
        Criterion::Tag(format!("{}{}", TOURISM_TAG_PREFIX, category))
    }

    pub fn search(term: &str) -> Self {
        Criterion::Search(term.to_lowercase())
    }

    pub fn city(city: &str) -> Self {
        Criterion::City(city.to_lowercase())
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Criterion::Published => listing.is_published,
            Criterion::Industry(industry) => listing.industry == *industry,
            Criterion::Tag(tag) => listing.has_tag(tag),
            Criterion::Search(needle) => {
                contains_ci(&listing.business_name, needle)
                    || listing
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ci(d, needle))
                    || contains_ci(&listing.industry, needle)
            }
            Criterion::City(fragment) => listing
                .city
                .as_deref()
                .is_some_and(|c| contains_ci(c, fragment)),
            Criterion::Zip(zip) => listing.zip_code.as_deref() == Some(zip.as_str()),
            Criterion::StoredTier(tier) => listing.tier == *tier,
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Conjunction of criteria. An empty predicate matches every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    criteria: Vec<Criterion>,
}

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// 列表查詢用的條件組合；slug 不在此處理
    pub fn from_query(query: &ListingQuery) -> Self {
        let mut predicate = Self::new().and(Criterion::Published);

        if let Some(industry) = &query.industry {
            predicate = predicate.and(Criterion::Industry(industry.clone()));
        }
        if let Some(destination) = &query.destination {
            predicate = predicate.and(Criterion::destination(destination));
        }
        if let Some(category) = &query.tourism_category {
            predicate = predicate.and(Criterion::tourism_category(category));
        }
        if let Some(term) = &query.search {
            predicate = predicate.and(Criterion::search(term));
        }
        if let Some(city) = &query.city {
            predicate = predicate.and(Criterion::city(city));
        }
        if let Some(zip) = &query.zip {
            predicate = predicate.and(Criterion::Zip(zip.clone()));
        }
        if let Some(tier) = query.tier {
            predicate = predicate.and(Criterion::StoredTier(tier));
        }

        predicate
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.criteria.iter().all(|c| c.matches(listing))
    }
}
