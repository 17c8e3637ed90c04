use serde_json::{Value, json};

pub const INNERTUBE_API: &str = "https://youtubei.googleapis.com";
pub const MUSIC_API: &str = "https://music.youtube.com";

/// InnerTube client identities usable for `player` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClient {
    AndroidVr,
    Ios,
}

impl PlayerClient {
    /// Unknown names fall back to `ANDROID_VR`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "IOS" => Self::Ios,
            _ => Self::AndroidVr,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AndroidVr => "ANDROID_VR",
            Self::Ios => "IOS",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::AndroidVr => "28",
            Self::Ios => "5",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            Self::AndroidVr => "1.61.48",
            Self::Ios => "21.02.1",
        }
    }

    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::AndroidVr => {
                "Mozilla/5.0 (Linux; Android 14; Pixel 8 Pro Build/UQ1A.240205.002; wv) \
                  AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/121.0.6167.164 \
                  Mobile Safari/537.36 YouTubeVR/1.61.48 (gzip)"
            }
            Self::Ios => {
                "com.google.ios.youtube/21.02.1 (iPhone16,2; U; CPU iOS 18_2 like Mac OS X;)"
            }
        }
    }

    pub fn context(&self, hl: &str, gl: &str) -> Value {
        let client = match self {
            Self::AndroidVr => json!({
                "clientName": self.name(),
                "clientVersion": self.version(),
                "userAgent": self.user_agent(),
                "deviceMake": "Google",
                "deviceModel": "Pixel 8 Pro",
                "osName": "Android",
                "osVersion": "14",
                "androidSdkVersion": 34,
                "hl": hl,
                "gl": gl
            }),
            Self::Ios => json!({
                "clientName": self.name(),
                "clientVersion": self.version(),
                "userAgent": self.user_agent(),
                "deviceMake": "Apple",
                "deviceModel": "iPhone16,2",
                "osName": "iPhone",
                "osVersion": "18.2.22C152",
                "hl": hl,
                "gl": gl
            }),
        };

        json!({
            "client": client,
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }
}

pub mod web_remix {
    use serde_json::{Value, json};

    pub const CLIENT_NAME: &str = "WEB_REMIX";
    pub const CLIENT_ID: &str = "67";
    pub const CLIENT_VERSION: &str = "1.20260121.03.00";
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
          AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

    pub fn context(hl: &str, gl: &str) -> Value {
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
                "userAgent": USER_AGENT,
                "hl": hl,
                "gl": gl
            },
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        })
    }
}
