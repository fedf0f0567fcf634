use crate::StringToAnyhow;
use sdl2::image::LoadSurface;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::surface::Surface;
use sdl2::video::{Window, WindowContext};
use std::path::Path;
use wolfcast::framebuffer::{Framebuffer, Image};
use wolfcast::render::{Color, Renderer, TextureId};

/// Draws into a CPU framebuffer and streams it to the window on `present`.
pub(crate) struct SdlRenderer<'t> {
    canvas: Canvas<Window>,
    frame: Texture<'t>,
    fb: Framebuffer,
}

impl<'t> SdlRenderer<'t> {
    pub fn new(
        canvas: Canvas<Window>,
        texture_creator: &'t TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        log::info!("creating {width}x{height} streaming frame");
        let frame =
            texture_creator.create_texture_streaming(PixelFormatEnum::RGBA32, width, height)?;

        Ok(Self {
            canvas,
            frame,
            fb: Framebuffer::new(width, height),
        })
    }
}

impl Renderer for SdlRenderer<'_> {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureId> {
        log::info!("loading texture at {}", path.display());
        let surface = Surface::from_file(path)
            .ah()?
            .convert_format(PixelFormatEnum::RGBA32)
            .ah()?;
        let (width, height) = surface.size();
        let pitch = surface.pitch() as usize;
        let image = surface.with_lock(|data| Image::from_rgba_pitched(width, height, pitch, data))?;
        Ok(self.fb.add_image(image))
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.fb.image_size(texture)
    }

    fn clear(&mut self, color: Color) -> anyhow::Result<()> {
        self.fb.clear(color);
        Ok(())
    }

    fn draw_vertical_line(
        &mut self,
        column: u32,
        y_start: i32,
        y_end: i32,
        color: Color,
    ) -> anyhow::Result<()> {
        self.fb.vertical_line(column, y_start, y_end, color);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_textured_column(
        &mut self,
        column: u32,
        y_start: i32,
        y_end: i32,
        texture: TextureId,
        tex_x: u32,
        v: (f32, f32),
        shade: f32,
    ) -> anyhow::Result<()> {
        self.fb.textured_column(column, y_start, y_end, texture, tex_x, v, shade)
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Color) -> anyhow::Result<()> {
        self.fb.pixel(x, y, color);
        Ok(())
    }

    fn draw_textured_pixel(
        &mut self,
        x: u32,
        y: u32,
        texture: TextureId,
        tex_x: u32,
        tex_y: u32,
    ) -> anyhow::Result<()> {
        self.fb.textured_pixel(x, y, texture, tex_x, tex_y)
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.frame.update(None, self.fb.pixels(), self.fb.pitch())?;
        self.canvas.copy(&self.frame, None, None).ah()?;
        self.canvas.present();
        Ok(())
    }
}
