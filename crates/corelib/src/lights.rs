//! Light toggles and the fixed Phong light parameters.

use crate::{Vec3, vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [
        LightKind::Ambient,
        LightKind::Directional,
        LightKind::Point,
        LightKind::Spot,
    ];

    /// Keys 1..=4 select the light categories in order.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(LightKind::Ambient),
            2 => Some(LightKind::Directional),
            3 => Some(LightKind::Point),
            4 => Some(LightKind::Spot),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LightKind::Ambient => "Ambient",
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
            LightKind::Spot => "Spot",
        }
    }
}

/// Enable flags for the four light categories. All start off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lights {
    ambient: bool,
    directional: bool,
    point: bool,
    spot: bool,
}

impl Lights {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag_mut(&mut self, kind: LightKind) -> &mut bool {
        match kind {
            LightKind::Ambient => &mut self.ambient,
            LightKind::Directional => &mut self.directional,
            LightKind::Point => &mut self.point,
            LightKind::Spot => &mut self.spot,
        }
    }

    pub fn is_enabled(&self, kind: LightKind) -> bool {
        match kind {
            LightKind::Ambient => self.ambient,
            LightKind::Directional => self.directional,
            LightKind::Point => self.point,
            LightKind::Spot => self.spot,
        }
    }

    /// Flip one light and return its new state.
    pub fn toggle(&mut self, kind: LightKind) -> bool {
        let flag = self.flag_mut(kind);
        *flag = !*flag;
        let enabled = *flag;
        log::info!(
            "{} light toggled. Now {}",
            kind.label(),
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in.
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    pub cutoff_deg: f32,
    pub exponent: f32,
}

impl SpotLight {
    pub fn cutoff_cos(&self) -> f32 {
        self.cutoff_deg.to_radians().cos()
    }
}

const ATTENUATION: Attenuation = Attenuation {
    constant: 1.0,
    linear: 0.06,
    quadratic: 0.02,
};

pub const AMBIENT: AmbientLight = AmbientLight {
    color: vec3(0.5, 0.5, 0.5),
};

pub const DIRECTIONAL: DirectionalLight = DirectionalLight {
    direction: vec3(1.0, -1.0, 0.0),
    ambient: vec3(0.2, 0.2, 0.2),
    diffuse: vec3(1.0, 1.0, 1.0),
    specular: vec3(1.0, 1.0, 1.0),
};

pub const POINT_LIGHTS: [PointLight; 2] = [
    PointLight {
        position: vec3(-0.6, 0.5, 0.0),
        ambient: vec3(0.1, 0.1, 0.1),
        diffuse: vec3(1.0, 1.0, 1.0),
        specular: vec3(1.0, 1.0, 1.0),
        attenuation: ATTENUATION,
    },
    PointLight {
        position: vec3(0.6, 0.5, 0.0),
        ambient: vec3(0.1, 0.1, 0.1),
        diffuse: vec3(1.0, 1.0, 1.0),
        specular: vec3(1.0, 1.0, 1.0),
        attenuation: ATTENUATION,
    },
];

pub const SPOT: SpotLight = SpotLight {
    position: vec3(0.0, 1.5, 0.0),
    direction: vec3(0.0, -1.0, 0.0),
    ambient: vec3(0.1, 0.1, 0.1),
    diffuse: vec3(1.0, 1.0, 1.0),
    specular: vec3(1.0, 1.0, 1.0),
    attenuation: ATTENUATION,
    cutoff_deg: 12.5,
    exponent: 2.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lights_start_off() {
        let lights = Lights::new();
        assert!(LightKind::ALL.iter().all(|&k| !lights.is_enabled(k)));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut lights = Lights::new();
        lights.toggle(LightKind::Point);
        let before = lights;
        for kind in LightKind::ALL {
            assert_eq!(lights.toggle(kind), !before.is_enabled(kind));
            lights.toggle(kind);
        }
        assert_eq!(lights, before);
    }

    #[test]
    fn toggles_are_independent() {
        let mut lights = Lights::new();
        lights.toggle(LightKind::Spot);
        assert!(lights.is_enabled(LightKind::Spot));
        assert!(!lights.is_enabled(LightKind::Ambient));
        assert!(!lights.is_enabled(LightKind::Directional));
        assert!(!lights.is_enabled(LightKind::Point));
    }

    #[test]
    fn digits_map_to_kinds() {
        assert_eq!(LightKind::from_digit(1), Some(LightKind::Ambient));
        assert_eq!(LightKind::from_digit(4), Some(LightKind::Spot));
        assert_eq!(LightKind::from_digit(0), None);
        assert_eq!(LightKind::from_digit(5), None);
    }

    #[test]
    fn spot_cutoff() {
        assert!((SPOT.cutoff_cos() - 12.5f32.to_radians().cos()).abs() < 1e-7);
    }
}
