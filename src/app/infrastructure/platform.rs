/// Host light/dark signal, queried every time an effective theme is needed.
pub trait AmbientTheme {
    fn prefers_dark(&self) -> bool;
}

/// Reads the desktop's color scheme through [`detect_system_dark_mode`].
///
/// Falls back to dark when the platform gives no answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAmbient;

impl AmbientTheme for SystemAmbient {
    fn prefers_dark(&self) -> bool {
        detect_system_dark_mode().unwrap_or(true)
    }
}

/// Ask the OS whether it is in dark mode. `None` when detection is unsupported
/// or failed.
pub fn detect_system_dark_mode() -> Option<bool> {
    // Windows: Check registry for dark mode preference
    #[cfg(target_os = "windows")]
    {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        if let Ok(hkcu) = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize")
        {
            // AppsUseLightTheme: 0 = dark mode, 1 = light mode
            if let Ok(value) = hkcu.get_value::<u32, _>("AppsUseLightTheme") {
                return Some(value == 0);
            }
        }
    }

    // Linux: color-scheme first, then the GTK theme name
    #[cfg(target_os = "linux")]
    {
        use std::process::Command;

        if let Ok(output) = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
        {
            if output.status.success() {
                let scheme = String::from_utf8_lossy(&output.stdout);
                if scheme.contains("prefer-dark") {
                    return Some(true);
                }
                if scheme.contains("prefer-light") {
                    return Some(false);
                }
            }
        }

        if let Ok(output) = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "gtk-theme"])
            .output()
        {
            if output.status.success() {
                let theme = String::from_utf8_lossy(&output.stdout).to_lowercase();
                return Some(theme.contains("dark"));
            }
        }
    }

    // macOS: AppleInterfaceStyle only exists while dark mode is on
    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        if let Ok(output) = Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
        {
            let style = String::from_utf8_lossy(&output.stdout).to_lowercase();
            return Some(output.status.success() && style.contains("dark"));
        }
    }

    None
}
