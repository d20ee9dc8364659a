use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::store::Observation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("empty sequence marker")]
    EmptyMarker,
}

/// Produces one observation per triggering block.
///
/// A trait seam so the ingest loop can run against a scripted
/// generator in tests; the production implementation is
/// [`UniformSampler`].
pub trait Sampler: Send {
    fn sample(&mut self, block: &str) -> Result<Observation, SampleError>;
}

/// Stand-in for a real price feed: draws uniformly from a fixed
/// closed interval. No I/O, no validation beyond a non-empty marker.
pub struct UniformSampler {
    min: f64,
    max: f64,
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Sampler for UniformSampler {
    fn sample(&mut self, block: &str) -> Result<Observation, SampleError> {
        if block.is_empty() {
            return Err(SampleError::EmptyMarker);
        }

        Ok(Observation {
            block: block.to_string(),
            timestamp: Utc::now(),
            price: self.rng.gen_range(self.min..=self.max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_inside_the_configured_bounds() {
        let mut sampler = UniformSampler::new(3.0, 5.0);

        for i in 0..200 {
            let obs = sampler.sample(&i.to_string()).unwrap();
            assert!(
                (3.0..=5.0).contains(&obs.price),
                "price {} outside bounds",
                obs.price
            );
        }
    }

    #[test]
    fn marker_is_carried_onto_the_observation() {
        let mut sampler = UniformSampler::new(3.0, 5.0);
        let obs = sampler.sample("12345").unwrap();
        assert_eq!(obs.block, "12345");
    }

    #[test]
    fn empty_marker_is_rejected() {
        let mut sampler = UniformSampler::new(3.0, 5.0);
        assert_eq!(sampler.sample(""), Err(SampleError::EmptyMarker));
    }
}
