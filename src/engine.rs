use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::Config;
use crate::model::{LiveComment, User, Venue};
use crate::popup::{self, CommentError, VenuePopup};
use crate::variate::{VariateError, VariateSampler};

/// Request counters for the stats endpoint
#[derive(Default)]
pub struct PulseCounters {
    pub normal_samples: AtomicU64,
    pub gamma_samples: AtomicU64,
    pub experience_samples: AtomicU64,
    pub popups_rendered: AtomicU64,
    pub comments_added: AtomicU64,
    pub rejected_requests: AtomicU64,
}

/// Core engine shared by every request handler
pub struct PulseEngine {
    pub config: Arc<Config>,
    pub counters: PulseCounters,
    sampler: Mutex<VariateSampler<StdRng>>,
}

impl PulseEngine {
    pub fn new(config: Arc<Config>) -> Self {
        let sampling = &config.sampling;
        let sampler = match sampling.seed {
            Some(seed) => {
                info!("🎲 Sampler seeded with {}", seed);
                VariateSampler::from_seed(seed)
            }
            None => VariateSampler::from_entropy(),
        }
        .with_gamma_limit(sampling.gamma_max_iterations);

        if let Some(limit) = sampling.gamma_max_iterations {
            info!("Gamma rejection loop capped at {} rounds", limit);
        }

        Self {
            config,
            counters: PulseCounters::default(),
            sampler: Mutex::new(sampler),
        }
    }

    pub fn sample_normal(&self, mean: f64, std_dev: f64) -> f64 {
        self.counters.normal_samples.fetch_add(1, Ordering::Relaxed);
        self.sampler.lock().normal(mean, std_dev)
    }

    pub fn sample_gamma(&self, alpha: f64, theta: f64) -> Result<f64, VariateError> {
        let value = self.sampler.lock().gamma(alpha, theta)?;
        self.counters.gamma_samples.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    /// Draw `count` starting EXP values with the configured distribution.
    pub fn sample_experience(&self, count: usize) -> Vec<i64> {
        let cfg = &self.config.sampling;
        let mut sampler = self.sampler.lock();
        let values: Vec<i64> = (0..count)
            .map(|_| {
                sampler.experience_value_with(
                    cfg.experience_mean,
                    cfg.experience_std_dev,
                    cfg.experience_floor,
                )
            })
            .collect();
        self.counters
            .experience_samples
            .fetch_add(count as u64, Ordering::Relaxed);
        values
    }

    pub fn render_popup(&self, venue: &Venue, now: DateTime<Utc>) -> VenuePopup {
        debug!("Rendering popup for venue {}", venue.id);
        self.counters.popups_rendered.fetch_add(1, Ordering::Relaxed);
        popup::build_popup(venue, now)
    }

    /// Prepend a comment to the caller's list and hand the list back.
    pub fn add_comment(
        &self,
        mut comments: Vec<LiveComment>,
        user: Option<&User>,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<LiveComment>, CommentError> {
        let added = popup::add_comment(&mut comments, user, text, now, &mut rand::thread_rng())?;
        debug!("Comment {} added as {}", added.id, added.user_name);
        self.counters.comments_added.fetch_add(1, Ordering::Relaxed);
        Ok(comments)
    }

    pub fn record_rejection(&self) {
        self.counters.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> serde_json::Value {
        let c = &self.counters;
        serde_json::json!({
            "samples": {
                "normal": c.normal_samples.load(Ordering::Relaxed),
                "gamma": c.gamma_samples.load(Ordering::Relaxed),
                "experience": c.experience_samples.load(Ordering::Relaxed),
            },
            "popups_rendered": c.popups_rendered.load(Ordering::Relaxed),
            "comments_added": c.comments_added.load(Ordering::Relaxed),
            "rejected_requests": c.rejected_requests.load(Ordering::Relaxed),
            "seeded": self.config.sampling.seed.is_some(),
            "gamma_max_iterations": self.config.sampling.gamma_max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfig;

    fn seeded_engine(seed: u64) -> PulseEngine {
        let config = Config {
            sampling: SamplingConfig {
                seed: Some(seed),
                ..SamplingConfig::default()
            },
            ..Config::default()
        };
        PulseEngine::new(Arc::new(config))
    }

    #[test]
    fn test_seeded_engines_agree() {
        let a = seeded_engine(11);
        let b = seeded_engine(11);
        assert_eq!(a.sample_normal(0.0, 1.0), b.sample_normal(0.0, 1.0));
        assert_eq!(a.sample_experience(5), b.sample_experience(5));
    }

    #[test]
    fn test_experience_respects_config_floor() {
        let config = Config {
            sampling: SamplingConfig {
                seed: Some(3),
                experience_mean: 0.0,
                experience_std_dev: 10.0,
                experience_floor: 1000,
                ..SamplingConfig::default()
            },
            ..Config::default()
        };
        let engine = PulseEngine::new(Arc::new(config));
        assert!(engine.sample_experience(200).iter().all(|v| *v == 1000));
    }

    #[test]
    fn test_counters() {
        let engine = seeded_engine(1);
        engine.sample_normal(1.0, 1.0);
        engine.sample_gamma(2.0, 1.0).unwrap();
        assert!(engine.sample_gamma(-2.0, 1.0).is_err());
        engine.sample_experience(3);
        engine.record_rejection();

        let stats = engine.get_stats();
        assert_eq!(stats["samples"]["normal"], 1);
        assert_eq!(stats["samples"]["gamma"], 1);
        assert_eq!(stats["samples"]["experience"], 3);
        assert_eq!(stats["rejected_requests"], 1);
        assert_eq!(stats["seeded"], true);
    }

    #[test]
    fn test_add_comment_returns_updated_list() {
        let engine = seeded_engine(1);
        let user = User {
            id: "u1".into(),
            email: "sam@example.com".into(),
            name: "Samantha".into(),
            avatar_url: None,
            trustability: 40.0,
            reputation: 2.0,
            total_reviews: 1,
            created_at: Utc::now(),
        };
        let comments = engine
            .add_comment(Vec::new(), Some(&user), "quiet tonight", Utc::now())
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(engine.get_stats()["comments_added"], 1);
        assert!(engine.add_comment(comments, None, "hi", Utc::now()).is_err());
    }
}
