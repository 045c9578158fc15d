use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use transparent_types::ActionKind;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    site: SiteConfig,
    #[serde(default)]
    csrf: CsrfConfig,
    #[serde(default)]
    http: HttpConfig,
}

#[derive(Deserialize, Default)]
struct SiteConfig {
    page_url: Option<String>,
    toggle_path: Option<String>,
    upvote_path: Option<String>,
    downvote_path: Option<String>,
}

#[derive(Deserialize, Default)]
struct CsrfConfig {
    cookie_name: Option<String>,
    header_name: Option<String>,
}

#[derive(Deserialize, Default)]
struct HttpConfig {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    use_proxy: Option<bool>,
}

pub struct Config {
    site: SiteConfig,
    csrf: CsrfConfig,
    http: HttpConfig,
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        Self::load_layered(user_config_path().as_deref())
    }

    /// Embedded defaults overlaid with `user`. A missing, unreadable or
    /// malformed file leaves the defaults in place.
    fn load_layered(user: Option<&Path>) -> Self {
        let mut config = Self::embedded();

        if let Some(path) = user {
            if path.exists() {
                match read_config_file(path) {
                    Ok(user) => config.merge(user),
                    Err(e) => {
                        log::warn!(target: "config", "ignoring config {}: {}", path.display(), e)
                    }
                }
            }
        }

        config
    }

    /// Embedded defaults overlaid with an explicit file. Errors are reported, not ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::embedded();
        config.merge(read_config_file(path)?);
        log::info!(target: "config", "loaded config from {}", path.display());
        Ok(config)
    }

    /// Embedded defaults overlaid with TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::embedded();
        config.merge(toml::from_str(text)?);
        Ok(config)
    }

    fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Config {
            site: base.site,
            csrf: base.csrf,
            http: base.http,
        }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_site(&mut self.site, user.site);
        merge_csrf(&mut self.csrf, user.csrf);
        merge_http(&mut self.http, user.http);
    }

    /// Override the page the dispatcher acts for.
    pub fn set_page_url(&mut self, page_url: &str) {
        self.site.page_url = Some(page_url.to_string());
    }

    pub fn page_url(&self) -> Result<Url, ConfigError> {
        let raw = self.site.page_url.as_deref().unwrap_or("http://localhost:8000/");
        Ok(Url::parse(raw)?)
    }

    /// Path of the endpoint an action posts to.
    pub fn endpoint(&self, kind: ActionKind) -> &str {
        let configured = match kind {
            ActionKind::Toggle => self.site.toggle_path.as_deref(),
            ActionKind::Upvote => self.site.upvote_path.as_deref(),
            ActionKind::Downvote => self.site.downvote_path.as_deref(),
        };
        configured.unwrap_or(match kind {
            ActionKind::Toggle => "/toggle/",
            ActionKind::Upvote => "/upvote/",
            ActionKind::Downvote => "/downvote/",
        })
    }

    pub fn cookie_name(&self) -> &str {
        self.csrf.cookie_name.as_deref().unwrap_or("csrftoken")
    }

    pub fn header_name(&self) -> &str {
        self.csrf.header_name.as_deref().unwrap_or("X-CSRFToken")
    }

    /// Request timeout (clamped to 1..300 seconds).
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs.unwrap_or(30).clamp(1, 300))
    }

    pub fn user_agent(&self) -> &str {
        self.http
            .user_agent
            .as_deref()
            .unwrap_or("transparent-client/0.1")
    }

    /// Whether to honor the system's proxy settings.
    pub fn use_proxy(&self) -> bool {
        self.http.use_proxy.unwrap_or(true)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("transparent").join("config.toml"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn merge_site(base: &mut SiteConfig, user: SiteConfig) {
    if user.page_url.is_some() {
        base.page_url = user.page_url;
    }
    if user.toggle_path.is_some() {
        base.toggle_path = user.toggle_path;
    }
    if user.upvote_path.is_some() {
        base.upvote_path = user.upvote_path;
    }
    if user.downvote_path.is_some() {
        base.downvote_path = user.downvote_path;
    }
}

fn merge_csrf(base: &mut CsrfConfig, user: CsrfConfig) {
    if user.cookie_name.is_some() {
        base.cookie_name = user.cookie_name;
    }
    if user.header_name.is_some() {
        base.header_name = user.header_name;
    }
}

fn merge_http(base: &mut HttpConfig, user: HttpConfig) {
    if user.timeout_secs.is_some() {
        base.timeout_secs = user.timeout_secs;
    }
    if user.user_agent.is_some() {
        base.user_agent = user.user_agent;
    }
    if user.use_proxy.is_some() {
        base.use_proxy = user.use_proxy;
    }
}
