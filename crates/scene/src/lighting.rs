//! Day/night sun, garage spotlight and fog parameters.

use glam::{Vec3, Vec4};

pub const SKY_DAY: [f32; 4] = [0.6, 0.8, 1.0, 1.0];
pub const SKY_NIGHT: [f32; 4] = [0.05, 0.05, 0.1, 1.0];

pub const FOG_DENSITY: f32 = 0.004;
pub const MATERIAL_SPECULAR: f32 = 0.5;
pub const MATERIAL_SHININESS: f32 = 32.0;

/// Direction toward the sun (or moon); also where its indicator is drawn.
pub const SUN_DIRECTION: Vec3 = Vec3::new(0.3, 1.0, 0.4);

pub const LAMP_POSITION: Vec3 = Vec3::new(0.0, 12.0, -36.0);
const SPOT_COLOR: Vec3 = Vec3::new(1.0, 0.7, 0.3);
const SPOT_DIRECTION: Vec3 = Vec3::new(0.0, -1.0, 0.2);
const SPOT_CUTOFF_DEG: f32 = 45.0;
const SPOT_EXPONENT: f32 = 10.0;
/// Constant, linear, quadratic.
const SPOT_ATTENUATION: [f32; 3] = [0.2, 0.01, 0.001];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunLight {
    pub direction: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub ambient: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Black when switched off.
    pub color: Vec3,
    pub cutoff_deg: f32,
    pub exponent: f32,
    pub attenuation: [f32; 3],
}

/// Everything the shader needs to light and fog one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub sun: SunLight,
    pub spot: SpotLight,
    pub fog_color: Vec4,
    pub fog_density: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lighting {
    pub day: bool,
    pub garage_light: bool,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            day: true,
            garage_light: true,
        }
    }
}

impl Lighting {
    pub fn toggle_day_night(&mut self) {
        self.day = !self.day;
        log::info!("Switched to {}", if self.day { "day" } else { "night" });
    }

    pub fn toggle_garage_light(&mut self) {
        self.garage_light = !self.garage_light;
        log::info!(
            "Garage light {}",
            if self.garage_light { "on" } else { "off" }
        );
    }

    pub fn sky_color(&self) -> [f32; 4] {
        if self.day { SKY_DAY } else { SKY_NIGHT }
    }

    pub fn sun(&self) -> SunLight {
        let direction = SUN_DIRECTION.normalize();
        if self.day {
            SunLight {
                direction,
                diffuse: Vec3::new(1.0, 0.95, 0.8),
                specular: Vec3::new(1.0, 0.9, 0.8),
                ambient: Vec3::splat(0.4),
            }
        } else {
            SunLight {
                direction,
                diffuse: Vec3::new(0.15, 0.15, 0.25),
                specular: Vec3::new(0.1, 0.1, 0.15),
                ambient: Vec3::new(0.02, 0.02, 0.05),
            }
        }
    }

    pub fn spot(&self) -> SpotLight {
        SpotLight {
            position: LAMP_POSITION,
            direction: SPOT_DIRECTION.normalize(),
            color: if self.garage_light {
                SPOT_COLOR
            } else {
                Vec3::ZERO
            },
            cutoff_deg: SPOT_CUTOFF_DEG,
            exponent: SPOT_EXPONENT,
            attenuation: SPOT_ATTENUATION,
        }
    }

    pub fn params(&self) -> LightParams {
        LightParams {
            sun: self.sun(),
            spot: self.spot(),
            fog_color: Vec4::from_array(self.sky_color()),
            fog_density: FOG_DENSITY,
            specular_strength: MATERIAL_SPECULAR,
            shininess: MATERIAL_SHININESS,
        }
    }
}
