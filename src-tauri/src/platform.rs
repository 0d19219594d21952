use std::env;

pub const MACOS_ICON_ASSET: &str = "assets/brandbay-macos-1024.png";
pub const WINDOWS_ICON_ASSET: &str = "assets/brandbay-windows-256.ico";
pub const GENERIC_ICON_ASSET: &str = "assets/icon.png";

/// OS family as far as the shell cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os_name(env::consts::OS)
    }

    /// Accepts both Rust (`macos`, `windows`) and Node-style (`darwin`, `win32`) names.
    pub fn from_os_name(os_name: &str) -> Self {
        match os_name.trim().to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Self::MacOs,
            "win32" | "windows" => Self::Windows,
            _ => Self::Other,
        }
    }

    pub fn icon_asset(self) -> &'static str {
        match self {
            Self::MacOs => MACOS_ICON_ASSET,
            Self::Windows => WINDOWS_ICON_ASSET,
            Self::Other => GENERIC_ICON_ASSET,
        }
    }

    /// Tray images render at 16x16 on macOS and Windows.
    pub fn downsizes_tray_icon(self) -> bool {
        matches!(self, Self::MacOs | Self::Windows)
    }

    /// macOS apps stay alive in the dock after their last window closes.
    pub fn quits_when_all_windows_closed(self) -> bool {
        self != Self::MacOs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_os_name_maps_node_and_rust_names() {
        assert_eq!(Platform::from_os_name("darwin"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("win32"), Platform::Windows);
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
        assert_eq!(Platform::from_os_name("linux"), Platform::Other);
        assert_eq!(Platform::from_os_name("freebsd"), Platform::Other);
    }

    #[test]
    fn icon_asset_selects_one_asset_per_os_family() {
        assert_eq!(Platform::from_os_name("darwin").icon_asset(), MACOS_ICON_ASSET);
        assert_eq!(Platform::from_os_name("win32").icon_asset(), WINDOWS_ICON_ASSET);
        assert_eq!(Platform::from_os_name("sunos").icon_asset(), GENERIC_ICON_ASSET);
    }

    #[test]
    fn only_macos_keeps_running_without_windows() {
        assert!(!Platform::MacOs.quits_when_all_windows_closed());
        assert!(Platform::Windows.quits_when_all_windows_closed());
        assert!(Platform::Other.quits_when_all_windows_closed());
    }

    #[test]
    fn tray_icon_downsizing_applies_to_macos_and_windows() {
        assert!(Platform::MacOs.downsizes_tray_icon());
        assert!(Platform::Windows.downsizes_tray_icon());
        assert!(!Platform::Other.downsizes_tray_icon());
    }
}
