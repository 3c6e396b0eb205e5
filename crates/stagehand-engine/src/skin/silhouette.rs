use crate::coords::Vec2;
use crate::paint::Rgba8;

/// Borrowed RGBA8 pixel source used to (re)build a [`Silhouette`].
///
/// Rows are top-to-bottom, `data.len() == width * height * 4`.
#[derive(Debug, Copy, Clone)]
pub struct PixelSource<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

impl<'a> PixelSource<'a> {
    #[inline]
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self { width, height, data }
    }
}

/// Pixel-accurate alpha mask (plus straight color) of a skin.
///
/// Rebuilt wholesale by [`update`](Self::update), immutable in between. Texture
/// coordinates are `[0, 1]²` with `(0, 0)` at the top-left pixel.
#[derive(Debug, Clone, Default)]
pub struct Silhouette {
    width: u32,
    height: u32,
    color_data: Vec<u8>,
}

impl Silhouette {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat straight-alpha RGBA samples, row-major from the top row.
    #[inline]
    pub fn color_data(&self) -> &[u8] {
        &self.color_data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Replaces the mask with `source`.
    ///
    /// Premultiplied sources are converted to straight alpha so sampled colors
    /// compare equal before and after effect compositing. A source whose buffer
    /// is shorter than its declared size leaves the silhouette empty.
    pub fn update(&mut self, source: PixelSource<'_>, is_premultiplied: bool) {
        let expected = source.width as usize * source.height as usize * 4;
        if source.data.len() < expected {
            log::warn!(
                "silhouette source {}x{} has {} bytes, expected {}; clearing",
                source.width,
                source.height,
                source.data.len(),
                expected
            );
            self.width = 0;
            self.height = 0;
            self.color_data.clear();
            return;
        }

        self.width = source.width;
        self.height = source.height;
        self.color_data.clear();
        self.color_data.extend_from_slice(&source.data[..expected]);

        if is_premultiplied {
            for px in self.color_data.chunks_exact_mut(4) {
                let c = Rgba8::from_premultiplied(px[0], px[1], px[2], px[3]);
                px.copy_from_slice(&c.to_array());
            }
        } else {
            for px in self.color_data.chunks_exact_mut(4) {
                if px[3] == 0 {
                    px[..3].fill(0);
                }
            }
        }
    }

    /// Raw pixel read. Out-of-range pixels are fully transparent.
    #[inline]
    pub fn pixel(&self, x: i64, y: i64) -> Rgba8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Rgba8::TRANSPARENT;
        }
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        Rgba8::new(
            self.color_data[i],
            self.color_data[i + 1],
            self.color_data[i + 2],
            self.color_data[i + 3],
        )
    }

    #[inline]
    fn alpha(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.color_data[((y as usize * self.width as usize) + x as usize) * 4 + 3]
    }

    /// Maps a texture coordinate to the pixel whose sample covers it.
    ///
    /// Non-finite coordinates map to `None` (never touching).
    #[inline]
    fn texel(&self, tex: Vec2) -> Option<(i64, i64)> {
        if !tex.is_finite() || self.is_empty() {
            return None;
        }
        let x = (tex.x * (self.width - 1) as f32).floor() as i64;
        let y = (tex.y * (self.height - 1) as f32).floor() as i64;
        Some((x, y))
    }

    /// Nearest-neighbor sample at a texture coordinate.
    pub fn color_at_nearest(&self, tex: Vec2) -> Rgba8 {
        match self.texel(tex) {
            Some((x, y)) => self.pixel(x, y),
            None => Rgba8::TRANSPARENT,
        }
    }

    /// Bilinear sample of the four pixels around a texture coordinate.
    ///
    /// Out-of-range neighbors contribute transparent black.
    pub fn color_at_linear(&self, tex: Vec2) -> Rgba8 {
        if !tex.is_finite() || self.is_empty() {
            return Rgba8::TRANSPARENT;
        }
        let x = tex.x * (self.width - 1) as f32;
        let y = tex.y * (self.height - 1) as f32;

        let x_floor = x.floor();
        let y_floor = y.floor();
        let x1 = x - x_floor;
        let y1 = y - y_floor;
        let x0 = 1.0 - x1;
        let y0 = 1.0 - y1;

        let xi = x_floor as i64;
        let yi = y_floor as i64;
        let c00 = self.pixel(xi, yi).to_array();
        let c10 = self.pixel(xi + 1, yi).to_array();
        let c01 = self.pixel(xi, yi + 1).to_array();
        let c11 = self.pixel(xi + 1, yi + 1).to_array();

        let mut out = [0u8; 4];
        for ch in 0..4 {
            let v = c00[ch] as f32 * x0 * y0
                + c01[ch] as f32 * x0 * y1
                + c10[ch] as f32 * x1 * y0
                + c11[ch] as f32 * x1 * y1;
            out[ch] = v.round().clamp(0.0, 255.0) as u8;
        }
        Rgba8::from_array(out)
    }

    /// `true` if the nearest pixel has any alpha.
    pub fn is_touching_nearest(&self, tex: Vec2) -> bool {
        match self.texel(tex) {
            Some((x, y)) => self.alpha(x, y) > 0,
            None => false,
        }
    }

    /// `true` if any of the four pixels a bilinear sample would blend has alpha.
    ///
    /// Deliberately conservative at edges.
    pub fn is_touching_linear(&self, tex: Vec2) -> bool {
        match self.texel(tex) {
            Some((x, y)) => {
                self.alpha(x, y) > 0
                    || self.alpha(x + 1, y) > 0
                    || self.alpha(x, y + 1) > 0
                    || self.alpha(x + 1, y + 1) > 0
            }
            None => false,
        }
    }
}
