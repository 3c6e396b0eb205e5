/// Straight (non-premultiplied) 8-bit RGBA sample.
///
/// Invariant:
/// - `rgb` is independent of `a`; a fully transparent sample may carry any rgb but
///   silhouettes always store it as zero.
///
/// Rationale:
/// - colors sampled before and after opacity changes stay comparable
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn from_array(v: [u8; 4]) -> Self {
        Self { r: v[0], g: v[1], b: v[2], a: v[3] }
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn rgb(self) -> Rgb8 {
        Rgb8 { r: self.r, g: self.g, b: self.b }
    }

    /// Converts a premultiplied sample to straight alpha.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn from_premultiplied(r: u8, g: u8, b: u8, a: u8) -> Self {
        if a == 0 {
            return Self::TRANSPARENT;
        }
        let unpremul = |c: u8| -> u8 {
            let v = (c as f32 * 255.0 / a as f32).round();
            v.clamp(0.0, 255.0) as u8
        };
        Self { r: unpremul(r), g: unpremul(g), b: unpremul(b), a }
    }

    /// Premultiplied RGB as floats in byte scale (`0.0..=255.0`).
    #[inline]
    pub fn premultiplied_rgb(self) -> [f32; 3] {
        let alpha = self.a as f32 / 255.0;
        [self.r as f32 * alpha, self.g as f32 * alpha, self.b as f32 * alpha]
    }

    /// Packs as little-endian `0xAABBGGRR`, the layout of an RGBA8 texel in memory.
    #[inline]
    pub const fn pack(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    #[inline]
    pub const fn unpack(v: u32) -> Self {
        let [r, g, b, a] = v.to_le_bytes();
        Self { r, g, b, a }
    }
}

/// 8-bit RGB color used by color queries.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb8 = Rgb8 { r: 255, g: 255, b: 255 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb8 {
    #[inline]
    fn from(v: [u8; 3]) -> Self {
        Rgb8::new(v[0], v[1], v[2])
    }
}
