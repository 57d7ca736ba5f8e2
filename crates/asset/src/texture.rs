//! Decoded RGBA8 images ready for GPU upload.
//! Images are flipped vertically on decode (OBJ texcoords have their origin
//! at the bottom-left).

use std::path::Path;

use anyhow::Context;

/// Tightly packed RGBA8 texels, row 0 at the bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// Decode an image file (PNG or JPEG).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;
        let tex = Self::from_image(img);
        log::info!("Loaded texture {:?} ({}x{})", path, tex.width, tex.height);
        Ok(tex)
    }

    fn from_image(img: image::DynamicImage) -> Self {
        let rgba = img.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }

    /// `size`×`size` texture of one color.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.repeat((size * size) as usize),
            width: size,
            height: size,
        }
    }

    /// Full mip chain down to 1x1, level 0 first, packed level after level.
    pub fn mip_chain(&self) -> (Vec<u8>, u32) {
        let mut packed = self.data.clone();
        let mut levels = 1;
        let Some(mut level) = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
        else {
            return (packed, levels);
        };
        while level.width() > 1 || level.height() > 1 {
            let w = (level.width() / 2).max(1);
            let h = (level.height() / 2).max(1);
            level = image::imageops::resize(&level, w, h, image::imageops::FilterType::Triangle);
            packed.extend_from_slice(level.as_raw());
            levels += 1;
        }
        (packed, levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_images_are_flipped_vertically() {
        // 1x2 image: top row red, bottom row blue.
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sign.png");
        img.save(&path).expect("encode png");

        let tex = TextureData::load(&path).expect("decode");
        assert_eq!((tex.width, tex.height), (1, 2));
        assert_eq!(tex.data.len(), 8);
        assert_eq!(&tex.data[0..4], &[0, 0, 255, 255]);
        assert_eq!(&tex.data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grass.jpg");
        std::fs::write(&path, b"not a jpeg").expect("write");
        assert!(TextureData::load(&path).is_err());
        assert!(TextureData::load(dir.path().join("absent.png")).is_err());
    }

    #[test]
    fn mip_chain_reaches_one_texel() {
        let tex = TextureData::solid(4, [10, 20, 30, 255]);
        let (packed, levels) = tex.mip_chain();
        assert_eq!(levels, 3);
        assert_eq!(packed.len(), (16 + 4 + 1) * 4);
        assert_eq!(&packed[packed.len() - 4..], &[10, 20, 30, 255]);
    }

    #[test]
    fn solid_texture_fills_every_texel() {
        let tex = TextureData::solid(2, [255, 255, 255, 255]);
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.data.len(), 16);
        assert!(tex.data.iter().all(|&b| b == 255));
    }
}
