use std::env;

pub(crate) const WEBVIEW_BROWSER_ARGS_ENV: &str = "WEBVIEW2_ADDITIONAL_BROWSER_ARGUMENTS";

/// Extra browser switches pinning the device scale factor when DPI scaling
/// is turned off in the deploy descriptor.
pub(crate) fn dpi_browser_args(dpi_scaling: bool) -> &'static [&'static str] {
    if dpi_scaling {
        &[]
    } else {
        &["--high-dpi-support=1", "--force-device-scale-factor=1"]
    }
}

/// Appends `extra` to `existing`, skipping switches that are already present.
pub(crate) fn merge_browser_args(existing: Option<&str>, extra: &[&str]) -> Option<String> {
    let mut args: Vec<String> = existing
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let before = args.len();
    for arg in extra {
        if !args.iter().any(|present| present == arg) {
            args.push((*arg).to_string());
        }
    }

    if args.len() == before {
        return None;
    }
    Some(args.join(" "))
}

/// Must run before the first webview is created. Returns whether browser
/// switches were handed to the webview.
pub(crate) fn apply_dpi_scaling(dpi_scaling: bool) -> bool {
    let extra = dpi_browser_args(dpi_scaling);
    if extra.is_empty() {
        return false;
    }
    if !cfg!(target_os = "windows") {
        tracing::info!(
            "DpiScaling is false but only WebView2 honors browser switches; ignored on this platform"
        );
        return false;
    }

    let existing = env::var(WEBVIEW_BROWSER_ARGS_ENV).ok();
    let Some(merged) = merge_browser_args(existing.as_deref(), extra) else {
        return false;
    };
    env::set_var(WEBVIEW_BROWSER_ARGS_ENV, &merged);
    tracing::info!(args = %merged, "DPI scaling disabled for webview");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_args_only_when_scaling_disabled() {
        assert!(dpi_browser_args(true).is_empty());
        assert_eq!(
            dpi_browser_args(false),
            ["--high-dpi-support=1", "--force-device-scale-factor=1"]
        );
    }

    #[test]
    fn merge_keeps_existing_switches_and_skips_duplicates() {
        let merged = merge_browser_args(
            Some("--disable-gpu --high-dpi-support=1"),
            dpi_browser_args(false),
        );
        assert_eq!(
            merged.as_deref(),
            Some("--disable-gpu --high-dpi-support=1 --force-device-scale-factor=1")
        );
    }

    #[test]
    fn merge_without_changes_returns_none() {
        assert_eq!(merge_browser_args(None, &[]), None);
        assert_eq!(
            merge_browser_args(
                Some("--force-device-scale-factor=1 --high-dpi-support=1"),
                dpi_browser_args(false)
            ),
            None
        );
        assert_eq!(
            merge_browser_args(None, dpi_browser_args(false)).as_deref(),
            Some("--high-dpi-support=1 --force-device-scale-factor=1")
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn dpi_switches_are_not_applied_outside_windows() {
        assert!(!apply_dpi_scaling(false));
        assert!(env::var(WEBVIEW_BROWSER_ARGS_ENV).is_err());
    }

    #[test]
    fn enabled_scaling_applies_nothing() {
        assert!(!apply_dpi_scaling(true));
    }
}
