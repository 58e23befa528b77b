use std::{
    f32::consts::PI,
    path::{Path, PathBuf},
    time::Duration,
};

use glam::Vec3;

use crate::interaction::tween::OverlapPolicy;

#[derive(Debug, Clone, Default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub particles: ParticleConfig,
    pub hover: HoverConfig,
    pub appearance: AppearanceConfig,
    pub idle: IdleConfig,
    pub lighting: LightingConfig,
    pub gold: GoldMaterialConfig,
    pub assets: AssetPaths,
    pub overlap_policy: OverlapPolicy,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            eye: Vec3::new(0.25, 0.0, 1.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 3.5,
            min_polar_angle: PI / 4.0,
            max_polar_angle: PI / 1.5,
            min_azimuth_angle: PI / -5.0,
            max_azimuth_angle: PI / 5.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticleConfig {
    pub count: usize,
    // Edge length of the cube the particles are scattered in
    pub spread: f32,
    pub size: f32,
    pub alpha_test: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        let distance = 2.0;

        Self {
            count: 500,
            spread: distance * 3.0,
            size: 0.08,
            alpha_test: 0.01,
        }
    }
}

/// Where the interaction target animates to when the pointer enters or leaves it.
#[derive(Debug, Clone)]
pub struct HoverConfig {
    pub enter_scale: Vec3,
    pub enter_rotation: Vec3,
    pub exit_scale: Vec3,
    pub exit_rotation: Vec3,
    pub duration: Duration,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enter_scale: Vec3::splat(1.5),
            enter_rotation: Vec3::new(0.15, 0.3, 0.05),
            exit_scale: Vec3::ONE,
            exit_rotation: Vec3::ZERO,
            duration: Duration::from_millis(400),
        }
    }
}

/// Grow-in animations played when objects first appear.
#[derive(Debug, Clone)]
pub struct AppearanceConfig {
    pub target_scale: f32,
    pub target_scale_duration: Duration,
    pub particle_scale: f32,
    pub particle_scale_duration: Duration,
    pub particle_group_rotation: f32,
    pub particle_group_rotation_duration: Duration,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            target_scale: 1.0,
            target_scale_duration: Duration::from_millis(1500),
            particle_scale: 1.0,
            particle_scale_duration: Duration::from_millis(2000),
            particle_group_rotation: 1.0,
            particle_group_rotation_duration: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdleConfig {
    /// Radians per second around the Y axis
    pub angular_speed: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            angular_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLightConfig {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct LightingConfig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub directional: [DirectionalLightConfig; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        let light = |x, y, z| DirectionalLightConfig {
            position: Vec3::new(x, y, z),
            color: Vec3::ONE,
            intensity: 0.2,
        };

        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 2.5,
            directional: [
                light(2.0, 4.0, 15.0),
                light(-8.0, -2.0, 15.0),
                light(15.0, -10.0, 15.0),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoldMaterialConfig {
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for GoldMaterialConfig {
    fn default() -> Self {
        Self {
            roughness: 0.8,
            metalness: 0.9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub model: PathBuf,
    pub particle_sprite: PathBuf,
    pub particle_alpha: PathBuf,
    pub gold_color: PathBuf,
    pub gold_normal: PathBuf,
    pub gold_roughness: PathBuf,
    pub gold_metalness: PathBuf,
}

impl AssetPaths {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        let gold = |suffix: &str| {
            PathBuf::from(format!("textures/gold/MetalGoldPaint002_{suffix}_2K_METALNESS.png"))
        };

        Self {
            root: PathBuf::from("assets"),
            model: PathBuf::from("Lightning3D.gltf"),
            particle_sprite: PathBuf::from("lightning.png"),
            particle_alpha: PathBuf::from("lightning_alphaMap.png"),
            gold_color: gold("COL"),
            gold_normal: gold("NRM"),
            gold_roughness: gold("ROUGHNESS"),
            gold_metalness: gold("METALNESS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_resolve_under_asset_root() {
        let assets = AssetPaths::default();

        assert_eq!(
            assets.resolve(&assets.gold_color),
            PathBuf::from("assets/textures/gold/MetalGoldPaint002_COL_2K_METALNESS.png")
        );
        assert_eq!(assets.resolve(&assets.model), PathBuf::from("assets/Lightning3D.gltf"));
    }

    #[test]
    fn default_orbit_limits_contain_initial_camera() {
        let camera = CameraConfig::default();
        let orbit = OrbitConfig::default();
        let offset = camera.eye - camera.target;
        let distance = offset.length();
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / distance).acos();

        assert!((orbit.min_distance..=orbit.max_distance).contains(&distance));
        assert!((orbit.min_azimuth_angle..=orbit.max_azimuth_angle).contains(&azimuth));
        assert!((orbit.min_polar_angle..=orbit.max_polar_angle).contains(&polar));
    }
}
