use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YouTubeConfig {
    /// InnerTube client used for player requests, see `PlayerClient`.
    #[serde(default = "default_player_client")]
    pub player_client: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    #[serde(default = "default_gl")]
    pub gl: String,
}

fn default_player_client() -> String {
    "ANDROID_VR".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

fn default_gl() -> String {
    "US".to_string()
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            player_client: default_player_client(),
            hl: default_hl(),
            gl: default_gl(),
        }
    }
}
