use crate::domain::model::Tier;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_slug,
    validate_unique, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 回應上限的硬性天花板，設定檔不能超過
pub const HARD_MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tiers: TierPolicyTable,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub logging: Option<LoggingConfig>,
}

/// One row of the tier policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub photo_limit: u32,
    pub search_weight: u32,
    #[serde(default)]
    pub has_property_intelligence: bool,
    #[serde(default)]
    pub has_verified_badge: bool,
    #[serde(default)]
    pub has_cta_buttons: bool,
    #[serde(default)]
    pub has_featured_placement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicyTable {
    pub free: TierPolicy,
    pub pro: TierPolicy,
    pub premium: TierPolicy,
}

impl TierPolicyTable {
    pub fn policy(&self, tier: Tier) -> &TierPolicy {
        match tier {
            Tier::Free => &self.free,
            Tier::Pro => &self.pro,
            Tier::Premium => &self.premium,
        }
    }
}

impl Default for TierPolicyTable {
    fn default() -> Self {
        Self {
            free: TierPolicy {
                photo_limit: 1,
                search_weight: 1,
                has_property_intelligence: false,
                has_verified_badge: false,
                has_cta_buttons: false,
                has_featured_placement: false,
            },
            pro: TierPolicy {
                photo_limit: 2,
                search_weight: 3,
                has_property_intelligence: true,
                has_verified_badge: true,
                has_cta_buttons: true,
                has_featured_placement: false,
            },
            premium: TierPolicy {
                photo_limit: 999,
                search_weight: 5,
                has_property_intelligence: true,
                has_verified_badge: true,
                has_cta_buttons: true,
                has_featured_placement: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// 未指定 limit 時使用；未設定則等於 max_limit
    pub default_limit: Option<usize>,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
    #[serde(default = "default_guide_limit")]
    pub guide_limit: usize,
}

fn default_max_limit() -> usize {
    HARD_MAX_LIMIT
}

fn default_related_limit() -> usize {
    4
}

fn default_guide_limit() -> usize {
    200
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: default_max_limit(),
            related_limit: default_related_limit(),
            guide_limit: default_guide_limit(),
        }
    }
}

impl QueryConfig {
    pub fn effective_default_limit(&self) -> usize {
        self.default_limit.unwrap_or(self.max_limit).min(self.max_limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub id: String,
    pub label: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourismCategoryConfig {
    pub id: String,
    pub label: String,
    pub industry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 允許的產業代碼；空清單代表不檢查
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
    #[serde(default)]
    pub tourism_categories: Vec<TourismCategoryConfig>,
    #[serde(default)]
    pub placeholder_images: BTreeMap<String, String>,
    pub fallback_placeholder_industry: Option<String>,
    #[serde(default)]
    pub non_claimable_keywords: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let industries = [
            "services",
            "dining",
            "health-wellness",
            "style-shopping",
            "nightlife",
            "family-entertainment",
            "destinations",
            "hotels-lodging",
            "professional-services",
        ];
        let destinations = [
            ("st-pete-beach", "St. Pete Beach"),
            ("key-west", "Key West"),
            ("sarasota", "Sarasota"),
            ("ybor-city", "Ybor City"),
            ("daytona", "Daytona Beach"),
            ("orlando", "Orlando"),
        ];
        let categories = [
            ("stay", "Stay", "hotels-lodging"),
            ("eat-drink", "Eat & Drink", "dining"),
            ("quick-eats", "Quick Eats & Takeout", "dining"),
            ("things-to-do", "Things To Do", "destinations"),
            ("beaches-nature", "Beaches & Nature", "destinations"),
            ("family-fun", "Family Fun", "family-entertainment"),
            ("shopping", "Shopping", "style-shopping"),
            ("everyday-essentials", "Everyday Essentials", "services"),
            ("nightlife", "Nightlife", "nightlife"),
            ("getting-around", "Getting Around", "services"),
        ];
        let non_claimable = [
            "walgreens", "cvs", "walmart", "target", "publix", "winn-dixie", "mcdonald",
            "burger king", "wendy", "taco bell", "subway", "shell", "chevron", "exxon",
            "7-eleven", "circle k", "dollar general", "dollar tree", "family dollar",
            "starbucks", "dunkin", "hospital", "police", "fire station", "fire department",
            "post office", "usps", "library", "dmv", "costco", "sam's club", "aldi",
            "trader joe", "home depot", "lowe's", "lowes",
        ];

        Self {
            industries: industries.iter().map(|s| s.to_string()).collect(),
            destinations: destinations
                .iter()
                .map(|(id, label)| DestinationConfig {
                    id: id.to_string(),
                    label: label.to_string(),
                    state: "FL".to_string(),
                })
                .collect(),
            tourism_categories: categories
                .iter()
                .map(|(id, label, industry)| TourismCategoryConfig {
                    id: id.to_string(),
                    label: label.to_string(),
                    industry: industry.to_string(),
                })
                .collect(),
            placeholder_images: BTreeMap::new(),
            fallback_placeholder_industry: None,
            non_claimable_keywords: non_claimable.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CatalogConfig {
    pub fn is_known_industry(&self, industry: &str) -> bool {
        self.industries.is_empty() || self.industries.iter().any(|i| i == industry)
    }

    /// 依產業取得預設圖，找不到時退回 fallback 產業的圖
    pub fn placeholder_for(&self, industry: &str) -> Option<&str> {
        self.placeholder_images
            .get(industry)
            .or_else(|| {
                self.fallback_placeholder_industry
                    .as_ref()
                    .and_then(|fallback| self.placeholder_images.get(fallback))
            })
            .map(String::as_str)
    }

    pub fn is_claimable(&self, business_name: &str) -> bool {
        let lower = business_name.to_lowercase();
        !self
            .non_claimable_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl EngineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DirectoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLACEHOLDER_CDN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DirectoryError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    fn validate_tiers(&self) -> Result<()> {
        let tiers = &self.tiers;

        for tier in Tier::ALL {
            validate_positive_number(
                &format!("tiers.{}.search_weight", tier),
                tiers.policy(tier).search_weight,
                1,
            )?;
        }

        // free 與未認領共用同一列，必須維持最低權重且無 property intelligence
        if tiers.free.search_weight != 1 {
            return Err(DirectoryError::InvalidConfigValueError {
                field: "tiers.free.search_weight".to_string(),
                value: tiers.free.search_weight.to_string(),
                reason: "Free tier search weight must be exactly 1".to_string(),
            });
        }
        if tiers.free.has_property_intelligence {
            return Err(DirectoryError::InvalidConfigValueError {
                field: "tiers.free.has_property_intelligence".to_string(),
                value: "true".to_string(),
                reason: "Free tier cannot carry property intelligence".to_string(),
            });
        }

        // 權重必須嚴格遞增：free < pro < premium
        let ladder = [
            ("tiers.pro.search_weight", &tiers.free, &tiers.pro),
            ("tiers.premium.search_weight", &tiers.pro, &tiers.premium),
        ];
        for (field, lower, upper) in ladder {
            if upper.search_weight <= lower.search_weight {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: upper.search_weight.to_string(),
                    reason: format!("Value must be greater than {}", lower.search_weight),
                });
            }
        }
        validate_positive_number(
            "tiers.pro.photo_limit",
            tiers.pro.photo_limit,
            tiers.free.photo_limit,
        )?;
        validate_positive_number(
            "tiers.premium.photo_limit",
            tiers.premium.photo_limit,
            tiers.pro.photo_limit,
        )?;

        Ok(())
    }

    fn validate_query(&self) -> Result<()> {
        validate_range("query.max_limit", self.query.max_limit, 1, HARD_MAX_LIMIT)?;
        if let Some(default_limit) = self.query.default_limit {
            validate_range("query.default_limit", default_limit, 1, self.query.max_limit)?;
        }
        validate_range("query.guide_limit", self.query.guide_limit, 1, HARD_MAX_LIMIT)?;
        validate_range("query.related_limit", self.query.related_limit, 0, 50)?;
        Ok(())
    }

    fn validate_catalog(&self) -> Result<()> {
        let catalog = &self.catalog;

        for industry in &catalog.industries {
            validate_slug("catalog.industries", industry)?;
        }
        validate_unique(
            "catalog.industries",
            catalog.industries.iter().map(String::as_str),
        )?;

        for dest in &catalog.destinations {
            validate_slug("catalog.destinations.id", &dest.id)?;
            validate_non_empty_string("catalog.destinations.label", &dest.label)?;
        }
        validate_unique(
            "catalog.destinations.id",
            catalog.destinations.iter().map(|d| d.id.as_str()),
        )?;

        for cat in &catalog.tourism_categories {
            validate_slug("catalog.tourism_categories.id", &cat.id)?;
            validate_non_empty_string("catalog.tourism_categories.label", &cat.label)?;
            if !catalog.is_known_industry(&cat.industry) {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: "catalog.tourism_categories.industry".to_string(),
                    value: cat.industry.clone(),
                    reason: "Industry is not listed in catalog.industries".to_string(),
                });
            }
        }
        validate_unique(
            "catalog.tourism_categories.id",
            catalog.tourism_categories.iter().map(|c| c.id.as_str()),
        )?;

        for (industry, url) in &catalog.placeholder_images {
            validate_url(&format!("catalog.placeholder_images.{}", industry), url)?;
        }
        if let Some(fallback) = &catalog.fallback_placeholder_industry {
            if !catalog.placeholder_images.contains_key(fallback) {
                return Err(DirectoryError::InvalidConfigValueError {
                    field: "catalog.fallback_placeholder_industry".to_string(),
                    value: fallback.clone(),
                    reason: "No placeholder image configured for this industry".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_tiers()?;
        self.validate_query()?;
        self.validate_catalog()
    }
}
