//! Graphic effects applied to drawables.
//!
//! Each effect has a raw, user-facing value (what callers set) and a converted
//! "uniform" value (what the shaders and their CPU emulation consume). The set
//! of effects whose raw value is non-zero is tracked as a bitmask so hot paths
//! can skip effect work entirely.

mod transform;

pub use transform::{transform_color, transform_point};

use core::fmt;
use core::str::FromStr;

/// A named graphic effect.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Effect {
    Color,
    Fisheye,
    Whirl,
    Pixelate,
    Mosaic,
    Brightness,
    Ghost,
}

impl Effect {
    pub const ALL: [Effect; 7] = [
        Effect::Color,
        Effect::Fisheye,
        Effect::Whirl,
        Effect::Pixelate,
        Effect::Mosaic,
        Effect::Brightness,
        Effect::Ghost,
    ];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Effect::Color => 0,
            Effect::Fisheye => 1,
            Effect::Whirl => 2,
            Effect::Pixelate => 3,
            Effect::Mosaic => 4,
            Effect::Brightness => 5,
            Effect::Ghost => 6,
        }
    }

    /// Bit of this effect in [`EffectValues::enabled`].
    #[inline]
    pub const fn mask(self) -> u32 {
        1 << self.index()
    }

    /// Whether the effect distorts the shape (and therefore the convex hull).
    #[inline]
    pub const fn changes_shape(self) -> bool {
        matches!(self, Effect::Fisheye | Effect::Whirl | Effect::Pixelate | Effect::Mosaic)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Effect::Color => "color",
            Effect::Fisheye => "fisheye",
            Effect::Whirl => "whirl",
            Effect::Pixelate => "pixelate",
            Effect::Mosaic => "mosaic",
            Effect::Brightness => "brightness",
            Effect::Ghost => "ghost",
        }
    }

    /// Raw value → uniform value.
    fn convert(self, raw: f32) -> f32 {
        match self {
            Effect::Color => (raw / 200.0) % 1.0,
            Effect::Fisheye => ((raw + 100.0) / 100.0).max(0.0),
            Effect::Whirl => -raw * core::f32::consts::PI / 180.0,
            Effect::Pixelate => raw.abs() / 10.0,
            Effect::Mosaic => ((raw.abs() + 10.0) / 10.0).round().clamp(1.0, 512.0),
            Effect::Brightness => raw.clamp(-100.0, 100.0) / 100.0,
            Effect::Ghost => 1.0 - raw.clamp(0.0, 100.0) / 100.0,
        }
    }
}

/// Mask of every shape-changing effect.
pub const SHAPE_EFFECTS: u32 = Effect::Fisheye.mask()
    | Effect::Whirl.mask()
    | Effect::Pixelate.mask()
    | Effect::Mosaic.mask();

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown effect name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl fmt::Display for UnknownEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown effect: {}", self.0)
    }
}

impl std::error::Error for UnknownEffect {}

impl FromStr for Effect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

/// Effect state of a drawable: raw values, converted uniforms and the enabled mask.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectValues {
    raw: [f32; 7],
    uniforms: [f32; 7],
    enabled: u32,
}

impl Default for EffectValues {
    fn default() -> Self {
        let mut uniforms = [0.0; 7];
        for e in Effect::ALL {
            uniforms[e.index()] = e.convert(0.0);
        }
        Self { raw: [0.0; 7], uniforms, enabled: 0 }
    }
}

impl EffectValues {
    /// Sets an effect's raw value. Returns `false` (and changes nothing) if the
    /// value is unchanged.
    pub fn set(&mut self, effect: Effect, raw: f32) -> bool {
        let i = effect.index();
        if self.raw[i] == raw {
            return false;
        }
        self.raw[i] = raw;
        self.uniforms[i] = effect.convert(raw);
        if raw != 0.0 {
            self.enabled |= effect.mask();
        } else {
            self.enabled &= !effect.mask();
        }
        true
    }

    #[inline]
    pub fn raw(&self, effect: Effect) -> f32 {
        self.raw[effect.index()]
    }

    /// Converted (shader-facing) value of an effect.
    #[inline]
    pub fn uniform(&self, effect: Effect) -> f32 {
        self.uniforms[effect.index()]
    }

    /// Bitmask of effects whose raw value is non-zero.
    #[inline]
    pub fn enabled(&self) -> u32 {
        self.enabled
    }

    #[inline]
    pub fn is_enabled(&self, effect: Effect) -> bool {
        self.enabled & effect.mask() != 0
    }

    /// Remaining opacity after the ghost effect (`1.0` = fully opaque).
    #[inline]
    pub fn ghost_alpha(&self) -> f32 {
        self.uniform(Effect::Ghost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_are_distinct_bits() {
        let mut seen = 0u32;
        for e in Effect::ALL {
            assert_eq!(seen & e.mask(), 0);
            seen |= e.mask();
        }
        assert_eq!(seen, 0b111_1111);
    }

    #[test]
    fn parse_names() {
        assert_eq!("ghost".parse::<Effect>(), Ok(Effect::Ghost));
        assert_eq!("FishEye".parse::<Effect>(), Ok(Effect::Fisheye));
        assert!("sparkle".parse::<Effect>().is_err());
    }

    #[test]
    fn defaults_are_identity_uniforms() {
        let v = EffectValues::default();
        assert_eq!(v.enabled(), 0);
        assert_eq!(v.uniform(Effect::Ghost), 1.0);
        assert_eq!(v.uniform(Effect::Fisheye), 1.0);
        assert_eq!(v.uniform(Effect::Mosaic), 1.0);
    }

    #[test]
    fn set_tracks_enabled_mask() {
        let mut v = EffectValues::default();
        assert!(v.set(Effect::Ghost, 50.0));
        assert!(v.is_enabled(Effect::Ghost));
        assert_eq!(v.ghost_alpha(), 0.5);
        assert!(!v.set(Effect::Ghost, 50.0));
        assert!(v.set(Effect::Ghost, 0.0));
        assert!(!v.is_enabled(Effect::Ghost));
    }

    #[test]
    fn converters_clamp() {
        let mut v = EffectValues::default();
        v.set(Effect::Brightness, 250.0);
        assert_eq!(v.uniform(Effect::Brightness), 1.0);
        v.set(Effect::Ghost, 150.0);
        assert_eq!(v.uniform(Effect::Ghost), 0.0);
        v.set(Effect::Mosaic, 10_000.0);
        assert_eq!(v.uniform(Effect::Mosaic), 512.0);
    }
}
