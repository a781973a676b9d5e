use tauri::{plugin::TauriPlugin, Wry};
use tauri_plugin_window_state::StateFlags;

/// Size, position and maximized state survive restarts. Visibility is left
/// to the reveal policy so a restored window never appears before the
/// backend is ready.
pub(crate) fn persisted_state_flags() -> StateFlags {
    StateFlags::all() - StateFlags::VISIBLE
}

pub(crate) fn plugin() -> TauriPlugin<Wry> {
    tauri_plugin_window_state::Builder::default()
        .with_state_flags(persisted_state_flags())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_persisted_but_visibility_is_not() {
        let flags = persisted_state_flags();
        assert!(flags.contains(StateFlags::SIZE | StateFlags::POSITION | StateFlags::MAXIMIZED));
        assert!(!flags.contains(StateFlags::VISIBLE));
    }
}
