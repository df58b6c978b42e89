use anyhow::Result;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
    Pixel,
};
use log::debug;

use crate::layout::Palette;

/// Number of panel rows sent per transfer and the unit of change detection.
pub const BAND_ROWS: u32 = 20;

/// Physical display: receives Rgb565 rows starting at panel row `y`.
pub trait Panel {
    fn write_rows(&mut self, y: u32, rows: u32, pixels: &[Rgb565]) -> Result<()>;
}

/// 2-bit paletted, double-buffered framebuffer.
///
/// Drawing goes to the back buffer. `commit` is the only path to the panel:
/// it pushes the row bands that differ from the front buffer, then makes
/// back the new front.
pub struct Framebuffer {
    width: u32,
    height: u32,
    stride: usize,
    back: Vec<u8>,
    front: Vec<u8>,
    primed: bool,
    line: Vec<Rgb565>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(4);
        let bytes = stride * height as usize;
        Self {
            width,
            height,
            stride,
            back: vec![0; bytes],
            front: vec![0; bytes],
            primed: false,
            line: Vec::with_capacity((width * BAND_ROWS) as usize),
        }
    }

    pub fn clear_color(&mut self, color: Palette) {
        let index = color.index();
        let packed = index | (index << 2) | (index << 4) | (index << 6);
        self.back.fill(packed);
    }

    /// Pixel in the back (drawing) buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Palette {
        Self::read(&self.back, self.stride, x, y)
    }

    /// Pixel as last committed to the panel.
    pub fn committed_pixel(&self, x: u32, y: u32) -> Palette {
        Self::read(&self.front, self.stride, x, y)
    }

    fn read(buf: &[u8], stride: usize, x: u32, y: u32) -> Palette {
        let byte = buf[y as usize * stride + x as usize / 4];
        Palette::from_index(byte >> ((x % 4) * 2))
    }

    fn write(&mut self, x: u32, y: u32, color: Palette) {
        let idx = y as usize * self.stride + x as usize / 4;
        let shift = (x % 4) * 2;
        self.back[idx] = (self.back[idx] & !(0b11 << shift)) | (color.index() << shift);
    }

    /// Push changed row bands to the panel and swap buffers.
    ///
    /// Returns the number of bands transferred. On a panel error the front
    /// buffer is left untouched so the next commit retries the same bands.
    pub fn commit(&mut self, panel: &mut dyn Panel) -> Result<usize> {
        let mut flushed = 0;
        let mut y = 0;
        while y < self.height {
            let rows = BAND_ROWS.min(self.height - y);
            let start = y as usize * self.stride;
            let end = (y + rows) as usize * self.stride;
            if !self.primed || self.back[start..end] != self.front[start..end] {
                self.line.clear();
                for row in y..y + rows {
                    for x in 0..self.width {
                        self.line.push(Self::read(&self.back, self.stride, x, row).to_rgb565());
                    }
                }
                panel.write_rows(y, rows, &self.line)?;
                flushed += 1;
            }
            y += rows;
        }
        self.front.copy_from_slice(&self.back);
        self.primed = true;
        debug!("commit: {} band(s) flushed", flushed);
        Ok(flushed)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Palette;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.width;
        let h = self.height;
        for Pixel(point, color) in pixels {
            let x = point.x;
            let y = point.y;
            if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
                self.write(x as u32, y as u32, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let display = self.bounding_box();
        let area = area.intersection(&display);
        for y in area.rows() {
            for x in area.columns() {
                self.write(x as u32, y as u32, color);
            }
        }
        Ok(())
    }
}
