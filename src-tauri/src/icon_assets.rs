use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use tauri::image::Image;

use crate::platform::{Platform, GENERIC_ICON_ASSET};

pub const TRAY_ICON_SIZE: u32 = 16;
pub const DEDICATED_TRAY_ASSET: &str = "assets/tray-icon.png";

/// Decodes a PNG/ICO asset, optionally squashing it to `size`x`size`.
pub fn load_icon_image(path: &Path, resize_to: Option<u32>) -> Result<Image<'static>, String> {
    let decoded = image::open(path)
        .map_err(|error| format!("Failed to decode icon {}: {}", path.display(), error))?;
    let decoded = match resize_to {
        Some(size) => decoded.resize_exact(size, size, FilterType::Lanczos3),
        None => decoded,
    };
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new_owned(rgba.into_raw(), width, height))
}

/// Picks the first tray asset `locate` can find: dedicated tray art, then the
/// platform icon, then the generic icon.
pub fn resolve_tray_icon_path<L>(platform: Platform, locate: L) -> Option<PathBuf>
where
    L: Fn(&str) -> Option<PathBuf>,
{
    [DEDICATED_TRAY_ASSET, platform.icon_asset(), GENERIC_ICON_ASSET]
        .into_iter()
        .find_map(locate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MACOS_ICON_ASSET, WINDOWS_ICON_ASSET};

    fn locate_only(available: &'static [&'static str]) -> impl Fn(&str) -> Option<PathBuf> {
        move |relative| {
            available
                .contains(&relative)
                .then(|| PathBuf::from("/res").join(relative))
        }
    }

    #[test]
    fn dedicated_tray_asset_wins_when_present() {
        let path = resolve_tray_icon_path(
            Platform::MacOs,
            locate_only(&[DEDICATED_TRAY_ASSET, MACOS_ICON_ASSET]),
        );
        assert_eq!(path, Some(PathBuf::from("/res").join(DEDICATED_TRAY_ASSET)));
    }

    #[test]
    fn tray_falls_back_to_platform_asset() {
        let all_assets: &'static [&'static str] =
            &[MACOS_ICON_ASSET, WINDOWS_ICON_ASSET, GENERIC_ICON_ASSET];

        let mac = resolve_tray_icon_path(Platform::from_os_name("darwin"), locate_only(all_assets));
        assert_eq!(mac, Some(PathBuf::from("/res").join(MACOS_ICON_ASSET)));

        let win = resolve_tray_icon_path(Platform::from_os_name("win32"), locate_only(all_assets));
        assert_eq!(win, Some(PathBuf::from("/res").join(WINDOWS_ICON_ASSET)));

        let other = resolve_tray_icon_path(Platform::from_os_name("linux"), locate_only(all_assets));
        assert_eq!(other, Some(PathBuf::from("/res").join(GENERIC_ICON_ASSET)));
    }

    #[test]
    fn tray_falls_back_to_generic_then_nothing() {
        let generic_only = resolve_tray_icon_path(Platform::MacOs, locate_only(&[GENERIC_ICON_ASSET]));
        assert_eq!(generic_only, Some(PathBuf::from("/res").join(GENERIC_ICON_ASSET)));
        assert_eq!(resolve_tray_icon_path(Platform::Windows, locate_only(&[])), None);
    }

    #[test]
    fn load_icon_image_downsizes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("icon.png");
        image::RgbaImage::from_pixel(64, 64, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .expect("write png");

        let icon = load_icon_image(&path, Some(TRAY_ICON_SIZE)).expect("load icon");
        assert_eq!((icon.width(), icon.height()), (16, 16));
        assert_eq!(icon.rgba().len(), 16 * 16 * 4);

        let full = load_icon_image(&path, None).expect("load icon");
        assert_eq!((full.width(), full.height()), (64, 64));
    }

    #[test]
    fn load_icon_image_reports_missing_files() {
        let error = load_icon_image(Path::new("/definitely/missing.png"), None).unwrap_err();
        assert!(error.contains("Failed to decode icon"));
    }
}
