use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How long a generated verification token stays usable.
pub const TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

/// Ring color when the Discord accent is missing or too dark.
pub const DEFAULT_ACCENT: &str = "#a855f7";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarDecoration {
    pub asset: String,
    pub sku_id: String,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Discord profile handed over by the sign-in service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub userid: u64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub accent_color: Option<u32>,
    #[serde(default)]
    pub avatar_decoration_data: Option<AvatarDecoration>,
    #[serde(default)]
    pub verified: bool,
    #[serde(rename = "authAt", default)]
    pub auth_at: String,
}

impl LoginData {
    pub fn discord_id(&self) -> String {
        self.userid.to_string()
    }

    /// Accent to draw the profile ring with.
    pub fn ring_color(&self) -> String {
        ring_color(self.accent_color)
    }
}

/// A verification token and when it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub value: String,
    /// Account the token was issued for.
    pub discord_id: String,
    /// Unix seconds.
    pub expires_at: u64,
}

impl StoredToken {
    pub fn issue(value: impl Into<String>, discord_id: impl Into<String>, now: SystemTime) -> Self {
        Self {
            value: value.into(),
            discord_id: discord_id.into(),
            expires_at: unix_secs(now) + TOKEN_TTL.as_secs(),
        }
    }

    pub fn is_live(&self, now: SystemTime) -> bool {
        unix_secs(now) < self.expires_at
    }

    pub fn remaining(&self, now: SystemTime) -> Duration {
        Duration::from_secs(self.expires_at.saturating_sub(unix_secs(now)))
    }
}

/// Everything kept between runs for the portal: who is signed in and the
/// last token issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<LoginData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<StoredToken>,
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Discord accent color as `#rrggbb`. Zero counts as unset.
pub fn accent_color_hex(accent: Option<u32>) -> Option<String> {
    match accent {
        Some(0) | None => None,
        Some(color) => Some(format!("#{:06x}", color)),
    }
}

/// Whether a `#rrggbb` color is too dark to use as an accent. Missing or
/// malformed colors count as dark.
pub fn is_color_dark(hex: Option<&str>) -> bool {
    let Some((r, g, b)) = hex.and_then(parse_hex_rgb) else {
        return true;
    };
    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    luminance < 0.15
}

/// The user's own accent unless it is too dark.
pub fn ring_color(accent: Option<u32>) -> String {
    match accent_color_hex(accent) {
        Some(color) if !is_color_dark(Some(&color)) => color,
        _ => DEFAULT_ACCENT.to_string(),
    }
}

fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() < 6 || !digits.is_char_boundary(6) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
