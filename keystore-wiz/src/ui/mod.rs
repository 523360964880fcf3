//! Interactive terminal front-end.
//!
//! The UI state ([`AppState`]) lives in Cursive's user data. Screens:
//!
//! - [`load`] - keystore path and password form
//! - [`entries`] - entry table with actions
//! - [`dialogs`] - details, remove, add certificate, export and quit dialogs

use std::path::PathBuf;

use cursive::{
    Cursive, CursiveExt,
    event::Key,
    theme::{BaseColor, Color, ColorStyle},
    utils::markup::StyledString,
    views::{Dialog, TextView},
};

use crate::config::WizConfig;
use crate::manager::KeystoreManager;

/// Dialogs opened from the entry table.
pub mod dialogs;

/// Entry table screen.
pub mod entries;

/// Keystore load form.
pub mod load;

/// State shared by all screens.
pub struct AppState {
    /// The keystore being edited.
    pub manager: KeystoreManager,
    /// Loaded configuration.
    pub config: WizConfig,
}

/// Runs the UI until the user quits and returns the final manager state.
///
/// `initial_path` pre-fills the load form; otherwise the configured default
/// path is used.
pub fn run(
    manager: KeystoreManager,
    config: WizConfig,
    initial_path: Option<PathBuf>,
) -> anyhow::Result<KeystoreManager> {
    cursive::logger::init();
    cursive::logger::set_filter_levels_from_env();

    let title = config.ui.title.clone();
    let path = initial_path
        .or_else(|| config.keystore.default_path.clone())
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let mut siv = Cursive::default();
    siv.set_window_title(title.clone());
    siv.set_user_data(AppState { manager, config });

    siv.add_global_callback('q', dialogs::confirm_quit);
    siv.add_global_callback(Key::Esc, handle_back);
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    siv.add_layer(load::load_view(&title, &path));
    siv.run();

    let state = siv
        .take_user_data::<AppState>()
        .ok_or(anyhow!("UI state lost"))?;
    Ok(state.manager)
}

/// Closes the top dialog, never the base screen.
pub fn handle_back(s: &mut Cursive) {
    if s.screen().len() > 1 {
        s.pop_layer();
    }
}

/// Runs `f` against the keystore manager held in the UI state.
pub fn with_manager<R>(
    s: &mut Cursive,
    f: impl FnOnce(&mut KeystoreManager) -> anyhow::Result<R>,
) -> anyhow::Result<R> {
    s.with_user_data(|state: &mut AppState| f(&mut state.manager))
        .unwrap_or_else(|| Err(anyhow!("UI state lost")))
}

/// Text styled as an error.
pub fn error_text(msg: impl Into<String>) -> StyledString {
    StyledString::styled(msg, ColorStyle::front(Color::Dark(BaseColor::Red)))
}

/// Shows a dismissable message.
pub fn show_info(s: &mut Cursive, title: &str, msg: impl Into<String>) {
    s.add_layer(
        Dialog::around(TextView::new(msg.into()))
            .title(title)
            .dismiss_button("OK"),
    );
}

/// Shows a dismissable error message.
pub fn show_error(s: &mut Cursive, title: &str, msg: impl Into<String>) {
    s.add_layer(
        Dialog::around(TextView::new(error_text(msg)))
            .title(title)
            .dismiss_button("OK"),
    );
}
