use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::model::{ImageRef, LiveComment, User, Venue, VenueImage};
use crate::reputation::{format_reputation, ReputationTier};
use crate::time_ago::time_ago_at;

/// Popup shows at most this many user photos
pub const MAX_PHOTOS: usize = 6;
/// Vibe at or above this gets the fire badge
pub const ON_FIRE_VIBE: u8 = 8;

const NAME_PREFIX_CHARS: usize = 6;
const NAME_SUFFIX_CHARS: usize = 3;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Everything the map popup renders for one venue, minus styling.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenuePopup {
    pub name: String,
    pub category_label: &'static str,
    pub on_fire: bool,
    pub special_event: Option<String>,
    pub ai_summary: Option<String>,
    pub activity_color: &'static str,
    pub capacity_text: String,
    /// Service venues only
    pub wait_time: Option<String>,
    /// Social venues only
    pub vibe: Option<Meter>,
    pub crowd: Option<Meter>,
    pub address: String,
    pub photos: Vec<VenueImage>,
    pub comments: Vec<CommentView>,
    pub empty_notice: Option<&'static str>,
    pub directions_url: String,
}

/// A 1-10 score drawn as a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    pub value: u8,
    pub text: String,
    pub width_percent: u32,
}

impl Meter {
    fn new(value: u8) -> Self {
        Self {
            value,
            text: format!("{}/10", value),
            width_percent: value as u32 * 10,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user_name: String,
    pub comment: String,
    pub reputation_text: String,
    pub badge_color: &'static str,
    pub background_color: &'static str,
    pub posted: String,
    pub images: Vec<String>,
}

impl CommentView {
    pub fn from_comment(comment: &LiveComment, now: DateTime<Utc>) -> Self {
        let reputation = comment.reputation();
        let tier = ReputationTier::from_score(reputation);
        Self {
            id: comment.id.clone(),
            user_name: comment.user_name.clone(),
            comment: comment.comment.clone(),
            reputation_text: format_reputation(reputation),
            badge_color: tier.color(),
            background_color: tier.background_color(),
            posted: time_ago_at(comment.timestamp, now),
            images: comment.images.clone(),
        }
    }
}

pub fn build_popup(venue: &Venue, now: DateTime<Utc>) -> VenuePopup {
    let category = venue.category;

    let wait_time = category.is_service().then(|| match venue.wait_time_interval {
        Some(interval) => format_wait_time_interval(interval),
        None => format_wait_time(venue.wait_time),
    });

    let (vibe, crowd) = if category.is_social() {
        (venue.vibe.map(Meter::new), venue.crowd.map(Meter::new))
    } else {
        (None, None)
    };

    let comments: Vec<CommentView> = venue
        .live_comments
        .iter()
        .map(|c| CommentView::from_comment(c, now))
        .collect();
    let empty_notice = comments.is_empty().then_some("No comments yet");

    VenuePopup {
        name: venue.name.clone(),
        category_label: category.label(),
        on_fire: venue.vibe.is_some_and(|v| v >= ON_FIRE_VIBE),
        special_event: venue
            .is_special_event
            .then(|| venue.special_event_description.clone().unwrap_or_default()),
        ai_summary: venue.ai_summary.clone().filter(|s| !s.is_empty()),
        activity_color: venue.activity_level.color(),
        capacity_text: format!("{}% capacity", venue.capacity),
        wait_time,
        vibe,
        crowd,
        address: venue.address.clone(),
        photos: venue.user_images.iter().take(MAX_PHOTOS).cloned().collect(),
        comments,
        empty_notice,
        directions_url: directions_url(venue.latitude, venue.longitude),
    }
}

pub fn format_wait_time(minutes: u32) -> String {
    format!("{} min", minutes)
}

pub fn format_wait_time_interval((min, max): (u32, u32)) -> String {
    format!("{}-{} min", min, max)
}

pub fn directions_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        latitude, longitude
    )
}

/// Full-screen image viewer state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lightbox {
    pub url: String,
    pub caption: Option<String>,
    pub alt: String,
}

impl Lightbox {
    pub fn open(image: &ImageRef) -> Self {
        let (url, caption) = match image {
            ImageRef::Url(url) => (url.clone(), None),
            ImageRef::Image(img) => (img.url.clone(), img.caption.clone()),
        };
        let alt = caption
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Venue".to_string());
        Self { url, caption, alt }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("comment text is empty")]
    EmptyComment,
    #[error("sign in to post a comment")]
    NotSignedIn,
}

/// Post a live comment: newest first, under an anonymised name.
pub fn add_comment<'a, R: Rng + ?Sized>(
    comments: &'a mut Vec<LiveComment>,
    user: Option<&User>,
    text: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<&'a LiveComment, CommentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentError::EmptyComment);
    }
    let user = user.ok_or(CommentError::NotSignedIn)?;

    let comment = LiveComment {
        id: format!("comment_{}", now.timestamp_millis()),
        user_id: user.id.clone(),
        user_name: anonymize_name(&user.name, rng),
        comment: text.to_string(),
        timestamp: now,
        trustability: user.trustability,
        reputation: Some(user.reputation),
        images: Vec::new(),
    };
    comments.insert(0, comment);
    Ok(&comments[0])
}

/// First six characters of the real name plus three random base-36 chars.
pub fn anonymize_name<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let mut anon: String = name.chars().take(NAME_PREFIX_CHARS).collect();
    for _ in 0..NAME_SUFFIX_CHARS {
        anon.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    anon
}
