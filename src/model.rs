use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reputation::normalize_reputation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueCategory {
    Bar,
    Restaurant,
    Salon,
    Coffee,
    Club,
}

impl VenueCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar",
            Self::Restaurant => "Restaurant",
            Self::Salon => "Salon",
            Self::Coffee => "Coffee Shop",
            Self::Club => "Club",
        }
    }

    /// Venues where people queue for service; these show a wait time.
    pub fn is_service(self) -> bool {
        matches!(self, Self::Restaurant | Self::Salon | Self::Coffee)
    }

    /// Nightlife venues; these show vibe and crowd instead.
    pub fn is_social(self) -> bool {
        matches!(self, Self::Bar | Self::Club)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    VeryBusy,
    ModeratelyBusy,
    SomeActivity,
    Available,
}

impl ActivityLevel {
    /// Status dot colour on the map and in the popup
    pub fn color(self) -> &'static str {
        match self {
            Self::VeryBusy => "#EF4444",
            Self::ModeratelyBusy => "#F97316",
            Self::SomeActivity => "#EAB308",
            Self::Available => "#22C55E",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueImage {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Something the lightbox can show: a bare URL (comment attachments) or a
/// captioned venue photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Image(VenueImage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveComment {
    pub id: String,
    pub user_id: String,
    /// Anonymised display name
    pub user_name: String,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
    pub trustability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl LiveComment {
    /// Stored reputation, or one derived from trustability for comments
    /// that predate reputation scores.
    pub fn reputation(&self) -> f64 {
        self.reputation
            .unwrap_or_else(|| normalize_reputation(self.trustability))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub category: VenueCategory,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 0-100
    pub capacity: u8,
    /// Base estimate in minutes
    pub wait_time: u32,
    /// 85% confidence interval [min, max] in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time_interval: Option<(u32, u32)>,
    pub activity_level: ActivityLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    /// 1-10, social venues only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe: Option<u8>,
    /// 1-10, social venues only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowd: Option<u8>,
    #[serde(default)]
    pub is_special_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_event_description: Option<String>,
    #[serde(default)]
    pub live_comments: Vec<LiveComment>,
    #[serde(default)]
    pub user_images: Vec<VenueImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// 0-100, starts at 0
    pub trustability: f64,
    /// Karma shown next to comments
    pub reputation: f64,
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub venue_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar_url: Option<String>,
    pub user_trustability: f64,
    /// How often the reviewer is at this venue (0-100). Stored only.
    pub activity_quotient: f64,
    /// 1-5
    pub rating: u8,
    pub comment: String,
    pub last_visit_date: DateTime<Utc>,
    /// Minutes
    pub total_time_spent: u32,
    pub created_at: DateTime<Utc>,
    /// Location was verified when the review was written
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Festival,
    Concert,
    Market,
    Sports,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
}

impl LiveEvent {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }
}
