use blitz_core::BrowserConfig;
use rand::Rng;

/// Common desktop user agents
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Browser identity presented to application sites
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Build the fingerprint for a launch.
    ///
    /// The viewport always comes from the config; the user agent is picked at
    /// random when `randomize_fingerprint` is set.
    pub fn from_config(config: &BrowserConfig) -> Self {
        let user_agent = if config.randomize_fingerprint {
            let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
            USER_AGENTS[idx]
        } else {
            USER_AGENTS[0]
        };

        Self {
            user_agent: user_agent.to_string(),
            viewport_width: config.window_width,
            viewport_height: config.window_height,
        }
    }

    /// Chromium command-line arguments carrying this fingerprint.
    pub fn launch_args(&self) -> Vec<String> {
        vec![format!("--user-agent={}", self.user_agent)]
    }
}
