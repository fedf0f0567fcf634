use crate::render::{Color, TextureId};

const BPP: usize = 4;

/// Decoded RGBA texture, rows tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * BPP;
        if width == 0 || height == 0 {
            anyhow::bail!("image has no pixels: {width}x{height}");
        }
        if pixels.len() != expected {
            anyhow::bail!(
                "image data is {} bytes, {width}x{height} RGBA needs {expected}",
                pixels.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Repack rows that carry padding (`pitch > width * 4`).
    pub fn from_rgba_pitched(
        width: u32,
        height: u32,
        pitch: usize,
        data: &[u8],
    ) -> anyhow::Result<Self> {
        let row = width as usize * BPP;
        if pitch < row {
            anyhow::bail!("pitch {pitch} shorter than a {width} pixel row");
        }
        let pixels = data
            .chunks(pitch)
            .take(height as usize)
            .flat_map(|line| line.get(..row).unwrap_or(line))
            .copied()
            .collect();
        Self::from_rgba(width, height, pixels)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA at a texel, clamped to the image edge.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * BPP;
        match self.pixels.get(i..i + BPP) {
            Some(&[r, g, b, a]) => [r, g, b, a],
            _ => [0; 4],
        }
    }
}

/// CPU-side RGBA frame the platform uploads once per frame.
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    images: Vec<Image>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BPP],
            images: vec![],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pitch(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn add_image(&mut self, image: Image) -> TextureId {
        self.images.push(image);
        TextureId(self.images.len() - 1)
    }

    pub fn image_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.images.get(texture.0).map(Image::size)
    }

    fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * BPP;
        if let Some(px) = self.pixels.get_mut(i..i + BPP) {
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 0xff]);
        }
    }

    pub fn at(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BPP;
        match self.pixels.get(i..i + 3) {
            Some(&[r, g, b]) => Some(Color::rgb(r, g, b)),
            _ => None,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(BPP) {
            px.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&mut self, x: u32, y: u32, color: Color) {
        self.put(x, y, [color.r, color.g, color.b]);
    }

    pub fn vertical_line(&mut self, column: u32, y_start: i32, y_end: i32, color: Color) {
        let y_start = y_start.max(0);
        let y_end = y_end.min(self.height as i32 - 1);
        for y in y_start..=y_end {
            self.pixel(column, y as u32, color);
        }
    }

    /// Fully transparent texels (alpha below half) are skipped so sprites can have holes.
    #[allow(clippy::too_many_arguments)]
    pub fn textured_column(
        &mut self,
        column: u32,
        y_start: i32,
        y_end: i32,
        texture: TextureId,
        tex_x: u32,
        v: (f32, f32),
        shade: f32,
    ) -> anyhow::Result<()> {
        let Some(image) = self.images.get(texture.0) else {
            anyhow::bail!("unknown texture {}", texture.0);
        };
        if y_end < y_start {
            return Ok(());
        }

        let rows = (y_end - y_start + 1) as f32;
        let shade = shade.clamp(0., 1.);
        let mut strip = Vec::with_capacity(rows as usize);
        for y in y_start..=y_end {
            let t = (y - y_start) as f32 + 0.5;
            let v = v.0 + (v.1 - v.0) * t / rows;
            let tex_y = (v * image.height as f32).max(0.) as u32;
            let [r, g, b, a] = image.texel(tex_x, tex_y);
            if a < 0x80 {
                continue;
            }
            let s = |c: u8| (c as f32 * shade) as u8;
            strip.push((y, [s(r), s(g), s(b)]));
        }

        for (y, rgb) in strip {
            if y >= 0 {
                self.put(column, y as u32, rgb);
            }
        }
        Ok(())
    }

    pub fn textured_pixel(
        &mut self,
        x: u32,
        y: u32,
        texture: TextureId,
        tex_x: u32,
        tex_y: u32,
    ) -> anyhow::Result<()> {
        let Some(image) = self.images.get(texture.0) else {
            anyhow::bail!("unknown texture {}", texture.0);
        };
        let [r, g, b, _] = image.texel(tex_x, tex_y);
        self.put(x, y, [r, g, b]);
        Ok(())
    }
}
