use crate::coords::Vec2;
use crate::paint::{hsv_to_rgb, rgb_to_hsv, Rgba8};

use super::{Effect, EffectValues};

const CENTER: f32 = 0.5;
const WHIRL_RADIUS: f32 = 0.5;

// Grayscale pixels get nudged so a hue shift stays visible.
const MIN_LIGHTNESS: f32 = 0.11 / 2.0;
const MIN_SATURATION: f32 = 0.09;

/// Maps a texture coordinate to the coordinate the effect shaders would sample.
///
/// Applies mosaic, pixelate, whirl and fisheye, in that order. `skin_size` is the
/// skin's declared size, which pixelate uses to size its blocks.
pub fn transform_point(effects: &EffectValues, skin_size: Vec2, p: Vec2) -> Vec2 {
    let mut dst = p;

    if effects.is_enabled(Effect::Mosaic) {
        let m = effects.uniform(Effect::Mosaic);
        dst.x = (m * dst.x) % 1.0;
        dst.y = (m * dst.y) % 1.0;
    }

    if effects.is_enabled(Effect::Pixelate) {
        let amount = effects.uniform(Effect::Pixelate);
        let texel_x = skin_size.x / amount;
        let texel_y = skin_size.y / amount;
        dst.x = ((dst.x * texel_x).floor() + CENTER) / texel_x;
        dst.y = ((dst.y * texel_y).floor() + CENTER) / texel_y;
    }

    if effects.is_enabled(Effect::Whirl) {
        let offset = Vec2::new(dst.x - CENTER, dst.y - CENTER);
        let factor = (1.0 - offset.length() / WHIRL_RADIUS).max(0.0);
        let actual = effects.uniform(Effect::Whirl) * factor * factor;
        let (sin, cos) = actual.sin_cos();
        dst.x = cos * offset.x + sin * offset.y + CENTER;
        dst.y = -sin * offset.x + cos * offset.y + CENTER;
    }

    if effects.is_enabled(Effect::Fisheye) {
        let v = Vec2::new((dst.x - CENTER) / CENTER, (dst.y - CENTER) / CENTER);
        let len = v.length();
        // The exact center is a fixed point of the distortion.
        if len > 0.0 {
            let r = len.min(1.0).powf(effects.uniform(Effect::Fisheye)) * len.max(1.0);
            dst.x = CENTER + r * (v.x / len) * CENTER;
            dst.y = CENTER + r * (v.y / len) * CENTER;
        }
    }

    dst
}

/// Applies the color effects (hue shift, brightness, ghost) to a straight-alpha sample.
///
/// `effect_mask` restricts which enabled effects apply; pass `u32::MAX` for all.
/// Fully transparent samples are returned unchanged.
pub fn transform_color(effects: &EffectValues, color: Rgba8, effect_mask: u32) -> Rgba8 {
    if color.a == 0 {
        return color;
    }

    let enabled = effects.enabled() & effect_mask;
    let use_color = enabled & Effect::Color.mask() != 0;
    let use_brightness = enabled & Effect::Brightness.mask() != 0;
    let use_ghost = enabled & Effect::Ghost.mask() != 0;

    let mut out = color;

    if use_color || use_brightness {
        let mut rgb = [color.r as f32, color.g as f32, color.b as f32];

        if use_color {
            let mut hsv = rgb_to_hsv(rgb);
            if hsv[2] < MIN_LIGHTNESS {
                hsv = [0.0, 1.0, MIN_LIGHTNESS];
            } else if hsv[1] < MIN_SATURATION {
                hsv[0] = 0.0;
                hsv[1] = MIN_SATURATION;
            }
            hsv[0] = (effects.uniform(Effect::Color) + hsv[0] + 1.0) % 1.0;
            rgb = hsv_to_rgb(hsv).map(to_byte_f32);
        }

        if use_brightness {
            let shift = effects.uniform(Effect::Brightness) * 255.0;
            rgb = rgb.map(|c| c + shift);
        }

        out.r = to_byte(rgb[0]);
        out.g = to_byte(rgb[1]);
        out.b = to_byte(rgb[2]);
    }

    if use_ghost {
        out.a = to_byte(out.a as f32 * effects.ghost_alpha());
    }

    out
}

#[inline]
fn to_byte_f32(v: f32) -> f32 {
    v.round().clamp(0.0, 255.0)
}

#[inline]
fn to_byte(v: f32) -> u8 {
    to_byte_f32(v) as u8
}
