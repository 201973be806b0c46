use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "directory-engine")]
#[command(about = "Query a business directory snapshot")]
pub struct CliConfig {
    /// Path to TOML configuration file (built-in tier tables when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing snapshot (.json or .csv)
    #[arg(short, long, default_value = "listings.json")]
    pub snapshot: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Ranked, filtered listing page
    List {
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        tourism_category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        tier: Option<String>,
        #[arg(long)]
        limit: Option<String>,
    },
    /// Single listing by slug
    Get { slug: String },
    /// Listings of a destination grouped by tourism category
    Guide { destination: String },
    /// Configured destinations and tourism categories
    Discover,
    /// Directory totals
    Stats,
    /// Entitlements of one listing
    Entitlements { listing_id: String },
}

impl Command {
    /// 轉成與 HTTP 查詢相同的鍵值對，讓驗證走同一條路徑
    pub fn list_params(&self) -> Vec<(&'static str, String)> {
        let Command::List {
            industry,
            destination,
            tourism_category,
            search,
            city,
            zip,
            tier,
            limit,
        } = self
        else {
            return Vec::new();
        };

        [
            ("industry", industry),
            ("destination", destination),
            ("tourism_category", tourism_category),
            ("search", search),
            ("city", city),
            ("zip", zip),
            ("tier", tier),
            ("limit", limit),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("snapshot", &self.snapshot)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}
