//! Synthetic asset generators.
//!
//! Real board artwork is not checked into the repository, so tests that
//! exercise asset loading write small, predictable PNGs into a scratch
//! directory laid out like the production asset directory:
//!
//! ```text
//! <root>/background/<n>.png
//! <root>/objects/<name>.png
//! ```

use std::path::Path;

use image::{Rgba, RgbaImage};

/// Solid color used for every synthetic background.
pub const BACKGROUND_RGBA: [u8; 4] = [40, 40, 40, 255];

/// Solid color used for every synthetic icon.
pub const ICON_RGBA: [u8; 4] = [0, 200, 255, 255];

/// Creates an image filled with a single color.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Writes a minimal asset tree: every background, the disc AOE texture and
/// the named icons, each as a solid-color PNG.
pub fn write_synthetic_assets(root: &Path, icons: &[&str]) -> std::io::Result<()> {
    let background_dir = root.join("background");
    let objects_dir = root.join("objects");
    std::fs::create_dir_all(&background_dir)?;
    std::fs::create_dir_all(&objects_dir)?;

    for n in 1..=7 {
        save_png(
            &solid_image(64, 48, BACKGROUND_RGBA),
            &background_dir.join(format!("{}.png", n)),
        )?;
    }

    save_png(
        &solid_image(64, 64, [255, 120, 0, 160]),
        &objects_dir.join("circle_aoe.png"),
    )?;

    for icon in icons {
        save_png(
            &solid_image(32, 32, ICON_RGBA),
            &objects_dir.join(format!("{}.png", icon)),
        )?;
    }

    Ok(())
}

fn save_png(img: &RgbaImage, path: &Path) -> std::io::Result<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}
