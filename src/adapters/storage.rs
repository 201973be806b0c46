use crate::domain::model::{Listing, Tier};
use crate::domain::ports::ListingStore;
use crate::utils::error::{DirectoryError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store. Writers swap in a whole new snapshot; readers keep
/// whatever snapshot they already hold.
#[derive(Debug, Clone)]
pub struct MemoryListingStore {
    listings: Arc<RwLock<Arc<[Listing]>>>,
}

impl MemoryListingStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: Arc::new(RwLock::new(listings.into())),
        }
    }

    pub fn try_new(listings: Vec<Listing>) -> Result<Self> {
        validate_snapshot(&listings)?;
        Ok(Self::new(listings))
    }

    pub async fn replace(&self, listings: Vec<Listing>) -> Result<()> {
        validate_snapshot(&listings)?;
        let mut guard = self.listings.write().await;
        *guard = listings.into();
        Ok(())
    }
}

impl ListingStore for MemoryListingStore {
    async fn snapshot(&self) -> Result<Arc<[Listing]>> {
        let guard = self.listings.read().await;
        Ok(Arc::clone(&guard))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Csv,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("csv") => Ok(SnapshotFormat::Csv),
            other => Err(DirectoryError::InvalidConfigValueError {
                field: "snapshot".to_string(),
                value: path.display().to_string(),
                reason: format!(
                    "Unsupported snapshot extension {:?}. Allowed extensions: json, csv",
                    other.unwrap_or("")
                ),
            }),
        }
    }
}

/// Reads the snapshot file on every call so edits to the file are picked up
/// by the next request.
#[derive(Debug, Clone)]
pub struct FileListingStore {
    path: PathBuf,
    format: SnapshotFormat,
}

impl FileListingStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ListingStore for FileListingStore {
    async fn snapshot(&self) -> Result<Arc<[Listing]>> {
        let data = tokio::fs::read(&self.path).await?;
        let listings = parse_snapshot(&data, self.format)?;
        validate_snapshot(&listings)?;
        tracing::debug!(
            "Loaded {} listings from {}",
            listings.len(),
            self.path.display()
        );
        Ok(listings.into())
    }
}

/// 匯入用的 CSV 欄位；tags 與 gallery_images 以 `|` 分隔
#[derive(Debug, Deserialize)]
struct CsvListingRow {
    id: String,
    business_name: String,
    slug: String,
    industry: String,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    description: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    tier: Option<Tier>,
    is_claimed: Option<bool>,
    is_published: Option<bool>,
    trust_score: Option<u32>,
    tags: Option<String>,
    gallery_images: Option<String>,
    created_at: DateTime<Utc>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<CsvListingRow> for Listing {
    fn from(row: CsvListingRow) -> Self {
        Listing {
            id: row.id,
            business_name: row.business_name,
            slug: row.slug,
            industry: row.industry,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            description: row.description,
            phone: row.phone,
            website: row.website,
            tier: row.tier.unwrap_or_default(),
            is_claimed: row.is_claimed.unwrap_or(false),
            is_published: row.is_published.unwrap_or(true),
            trust_score: row.trust_score.unwrap_or(0),
            tags: split_list(row.tags.as_deref()).into_iter().collect(),
            gallery_images: split_list(row.gallery_images.as_deref()),
            badges: Vec::new(),
            created_at: row.created_at,
        }
    }
}

pub fn parse_snapshot(data: &[u8], format: SnapshotFormat) -> Result<Vec<Listing>> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::from_slice(data)?),
        SnapshotFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(data);
            let mut listings = Vec::new();
            for row in reader.deserialize::<CsvListingRow>() {
                listings.push(Listing::from(row?));
            }
            Ok(listings)
        }
    }
}

/// id 與 slug 在快照中必須唯一
pub fn validate_snapshot(listings: &[Listing]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();

    for listing in listings {
        if listing.id.trim().is_empty() || listing.slug.trim().is_empty() {
            return Err(DirectoryError::SnapshotError {
                message: format!(
                    "listing {:?} has an empty id or slug",
                    listing.business_name
                ),
            });
        }
        if !ids.insert(listing.id.as_str()) {
            return Err(DirectoryError::SnapshotError {
                message: format!("duplicate listing id {}", listing.id),
            });
        }
        if !slugs.insert(listing.slug.as_str()) {
            return Err(DirectoryError::SnapshotError {
                message: format!("duplicate slug {}", listing.slug),
            });
        }
    }

    Ok(())
}
