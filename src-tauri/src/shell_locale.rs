use std::env;

use crate::SHELL_LOCALE_ENV;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ShellTexts {
    pub(crate) tray_show: &'static str,
    pub(crate) tray_hide: &'static str,
    pub(crate) tray_quit: &'static str,
}

pub(crate) fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "zh-CN" {
        return ShellTexts {
            tray_show: "显示 NKAS",
            tray_hide: "隐藏 NKAS",
            tray_quit: "退出",
        };
    }

    ShellTexts {
        tray_show: "Show NKAS",
        tray_hide: "Hide NKAS",
        tray_quit: "Exit",
    }
}

/// The explicit shell override wins, then the usual POSIX locale variables.
pub(crate) fn resolve_shell_locale(default_shell_locale: &'static str) -> &'static str {
    locale_from_env_values(
        [SHELL_LOCALE_ENV, "LC_ALL", "LANG"]
            .into_iter()
            .map(|key| env::var(key).ok()),
        default_shell_locale,
    )
}

fn locale_from_env_values<I>(values: I, default_shell_locale: &'static str) -> &'static str
where
    I: IntoIterator<Item = Option<String>>,
{
    values
        .into_iter()
        .flatten()
        .find_map(|value| normalize_shell_locale(&value))
        .unwrap_or(default_shell_locale)
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "zh-CN" {
        return Some("zh-CN");
    }
    if raw == "en-US" {
        return Some("en-US");
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}
