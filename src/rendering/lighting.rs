use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::config::LightingConfig;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// Unit vector pointing from the lit surface towards the light
    pub direction: Vec4,
    /// Color premultiplied by intensity
    pub color: Vec4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightingUniform {
    pub ambient: Vec4,
    pub directional: [DirectionalLightUniform; 3],
}

impl LightingUniform {
    /// Directional lights shine from their position towards the origin.
    pub fn from_config(config: &LightingConfig) -> Self {
        let directional = config.directional.map(|light| DirectionalLightUniform {
            direction: light.position.normalize_or_zero().extend(0.0),
            color: (light.color * light.intensity).extend(1.0),
        });

        Self {
            ambient: (config.ambient_color * config.ambient_intensity).extend(1.0),
            directional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn lights_point_back_at_their_position() {
        let uniform = LightingUniform::from_config(&LightingConfig::default());

        assert_eq!(uniform.ambient, Vec4::new(2.5, 2.5, 2.5, 1.0));
        for light in &uniform.directional {
            assert!((light.direction.length() - 1.0).abs() < 1e-6);
            assert_eq!(light.color, Vec4::new(0.2, 0.2, 0.2, 1.0));
        }

        let first = uniform.directional[0].direction.truncate();
        assert!(first.dot(Vec3::new(2.0, 4.0, 15.0)) > 0.0);
    }

    #[test]
    fn matches_wgsl_layout() {
        // vec4 ambient + array<DirectionalLight, 3> with a 32 byte stride
        assert_eq!(std::mem::size_of::<LightingUniform>(), 16 + 3 * 32);
    }
}
