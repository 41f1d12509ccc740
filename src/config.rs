use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const SELLER_TABLE: &str = "seller";
pub const SELLER_THERAPIES_TABLE: &str = "seller_therapies";
pub const THERAPIES_TABLE: &str = "therapies";
pub const FORUM_POSTS_TABLE: &str = "forum_posts";
pub const FORUM_REPLIES_TABLE: &str = "forum_replies";
pub const FEED_POSTS_TABLE: &str = "feed_posts";

/// Embedded select used for every practitioner read; joins specialties through
/// the association table.
pub const SELLER_SELECT: &str = "*,seller_therapies(therapies(id,name,description,path))";

/// Upper bound on forum/feed reads.
pub const POST_FETCH_LIMIT: usize = 200;

pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_BIO_LENGTH: usize = 2000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
    /// Directory holding `forum.json` / `feed.json`. When set, posts are read
    /// from there instead of the remote tables.
    pub fixtures_dir: Option<PathBuf>,
    pub page_size: usize,
    pub max_page_size: usize,
    pub practitioner_limit: usize,
    pub featured_limit: usize,
    pub proxy: Option<Url>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            supabase_url: Url::parse("http://127.0.0.1:54321").expect("static url is valid"),
            supabase_anon_key: String::new(),
            storage_bucket: "profile-images".to_string(),
            fixtures_dir: None,
            page_size: 10,
            max_page_size: 100,
            practitioner_limit: 50,
            featured_limit: 6,
            proxy: None,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    /// Defaults merged with `HUB_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("HUB_"))
            .extract()
    }

    pub fn default_page_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_size).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid HUB_* configuration"));
