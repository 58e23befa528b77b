use glam::Vec3;
use rand::Rng;

use crate::config::ParticleConfig;

/// Randomly scattered, randomly colored sprites.
pub struct ParticleField {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub size: f32,
    pub alpha_test: f32,
}

impl ParticleField {
    /// Scatters `config.count` particles uniformly in a cube of edge
    /// `config.spread` centred on the origin.
    pub fn generate(rng: &mut impl Rng, config: &ParticleConfig) -> Self {
        let half = config.spread * 0.5;
        let mut spread = || rng.gen_range(-half..=half);

        let positions = (0..config.count)
            .map(|_| Vec3::new(spread(), spread(), spread()))
            .collect();

        let colors = (0..config.count)
            .map(|_| Vec3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect();

        Self {
            positions,
            colors,
            size: config.size,
            alpha_test: config.alpha_test,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
