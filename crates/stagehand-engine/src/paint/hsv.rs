//! RGB <-> HSV conversions in the unit cube.
//!
//! Hue is expressed as a fraction of a full turn (`0.0..1.0`), not degrees.

/// Converts byte-scale RGB (`0.0..=255.0`) to `[h, s, v]`, each in `[0, 1]`.
///
/// Grays report a hue of zero.
pub fn rgb_to_hsv(rgb: [f32; 3]) -> [f32; 3] {
    let r = rgb[0] / 255.0;
    let g = rgb[1] / 255.0;
    let b = rgb[2] / 255.0;

    let x = r.min(g).min(b);
    let v = r.max(g).max(b);

    let mut h = 0.0;
    let mut s = 0.0;
    if x != v {
        let f = if r == x {
            g - b
        } else if g == x {
            b - r
        } else {
            r - g
        };
        let i = if r == x {
            3.0
        } else if g == x {
            5.0
        } else {
            1.0
        };
        h = ((i - (f / (v - x))) / 6.0) % 1.0;
        s = (v - x) / v;
    }

    [h, s, v]
}

/// Converts `[h, s, v]` back to byte-scale RGB (`0.0..=255.0`, unrounded).
pub fn hsv_to_rgb(hsv: [f32; 3]) -> [f32; 3] {
    let [h, s, v] = hsv;

    if s == 0.0 {
        return [v * 255.0; 3];
    }

    // Keep hue in [0, 1) so the sector index stays in 0..=5.
    let h = h % 1.0;
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [r * 255.0, g * 255.0, b * 255.0]
}
