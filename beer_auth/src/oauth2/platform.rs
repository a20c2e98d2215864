use std::fmt;

/// Name of the request header carrying the client platform.
pub const PLATFORM_HEADER: &str = "platform";

/// Client application kind; selects which OAuth client id a token must be minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Web,
    Android,
    Ios,
}

impl Platform {
    /// Parse a `platform` header value. Total: missing or unknown values are `Web`.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("android") => Self::Android,
            Some("ios") => Self::Ios,
            Some("web") => Self::Web,
            Some(other) => {
                tracing::debug!(platform = other, "Unknown platform, using default");
                Self::Web
            }
            None => Self::Web,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-platform client ids. `web` is the default and is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformClientIds {
    pub web: String,
    pub android: Option<String>,
    pub ios: Option<String>,
}

impl PlatformClientIds {
    pub fn new(web: impl Into<String>) -> Self {
        Self {
            web: web.into(),
            android: None,
            ios: None,
        }
    }

    pub fn default_client_id(&self) -> &str {
        &self.web
    }

    /// Client id a token for `platform` must carry as audience.
    ///
    /// Platforms without a dedicated registration fall back to the default client id.
    pub fn client_id_for(&self, platform: Platform) -> &str {
        let dedicated = match platform {
            Platform::Web => None,
            Platform::Android => self.android.as_deref(),
            Platform::Ios => self.ios.as_deref(),
        };
        dedicated.unwrap_or(&self.web)
    }
}
