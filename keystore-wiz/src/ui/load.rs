use cursive::{
    Cursive,
    traits::{Nameable, Resizable},
    view::View,
    views::{Dialog, DummyView, EditView, LinearLayout, TextView},
};

use super::{dialogs, entries, error_text, with_manager};
use crate::manager::MISSING_INPUT;

const PATH_FIELD: &str = "keystore_path";
const PASSWORD_FIELD: &str = "keystore_password";
const STATUS: &str = "load_status";

/// Builds the load form.
pub fn load_view(title: &str, initial_path: &str) -> impl View + use<> {
    let form = LinearLayout::vertical()
        .child(TextView::new("Keystore file (.jks):"))
        .child(
            EditView::new()
                .content(initial_path)
                .on_submit(|s, _| on_load(s))
                .with_name(PATH_FIELD)
                .fixed_width(60),
        )
        .child(DummyView)
        .child(TextView::new("Password:"))
        .child(
            EditView::new()
                .secret()
                .on_submit(|s, _| on_load(s))
                .with_name(PASSWORD_FIELD)
                .fixed_width(60),
        )
        .child(DummyView)
        .child(TextView::new("").with_name(STATUS));

    Dialog::around(form)
        .title(title)
        .button("Load", on_load)
        .button("Quit", dialogs::confirm_quit)
}

fn field(s: &mut Cursive, name: &str) -> String {
    s.call_on_name(name, |v: &mut EditView| v.get_content().to_string())
        .unwrap_or_default()
}

fn set_status(s: &mut Cursive, msg: &str) {
    s.call_on_name(STATUS, |v: &mut TextView| v.set_content(error_text(msg)));
}

fn on_load(s: &mut Cursive) {
    let path = field(s, PATH_FIELD);
    let password = field(s, PASSWORD_FIELD);

    if path.trim().is_empty() || password.is_empty() {
        set_status(s, MISSING_INPUT);
        return;
    }

    match with_manager(s, |m| m.load(path.trim(), &password)) {
        Ok(()) => {
            s.pop_layer();
            s.add_fullscreen_layer(entries::entries_view());
            entries::refresh(s);
        }
        Err(e) => set_status(s, &format!("Failed to load keystore: {e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WizConfig;
    use crate::manager::KeystoreManager;
    use crate::ui::AppState;
    use cursive::views::SelectView;

    fn app() -> Cursive {
        let mut s = Cursive::new();
        s.set_user_data(AppState {
            manager: KeystoreManager::new(),
            config: WizConfig::default(),
        });
        s.add_layer(load_view("Keystore Wiz", ""));
        s
    }

    fn fill(s: &mut Cursive, path: &str, password: &str) {
        s.call_on_name(PATH_FIELD, |v: &mut EditView| {
            let _ = v.set_content(path);
        });
        s.call_on_name(PASSWORD_FIELD, |v: &mut EditView| {
            let _ = v.set_content(password);
        });
    }

    fn status(s: &mut Cursive) -> String {
        s.call_on_name(STATUS, |v: &mut TextView| v.get_content().source().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_missing_input_shown() {
        let mut s = app();
        on_load(&mut s);
        assert_eq!(status(&mut s), MISSING_INPUT);

        fill(&mut s, "trust.jks", "");
        on_load(&mut s);
        assert_eq!(status(&mut s), MISSING_INPUT);
        assert_eq!(s.screen().len(), 1);
    }

    #[test]
    fn test_load_failure_shown() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jks");

        let mut s = app();
        fill(&mut s, missing.to_str().unwrap(), "changeit");
        on_load(&mut s);
        assert!(status(&mut s).starts_with("Failed to load keystore: "));
        assert!(s.find_name::<EditView>(PATH_FIELD).is_some());
    }

    #[test]
    fn test_load_switches_to_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trust.jks");
        let cert = rcgen::generate_simple_self_signed(vec!["ui.test".to_string()]).unwrap();
        let mut ks = jks::Keystore::new();
        ks.set_certificate_entry("ui", jks::Certificate::x509(cert.cert.der().to_vec()))
            .unwrap();
        std::fs::write(&path, ks.to_bytes("changeit").unwrap()).unwrap();

        let mut s = app();
        fill(&mut s, path.to_str().unwrap(), "changeit");
        on_load(&mut s);

        assert_eq!(s.screen().len(), 1);
        assert!(s.find_name::<EditView>(PATH_FIELD).is_none());
        let rows = s
            .call_on_name(entries::ENTRIES, |v: &mut SelectView<String>| v.len())
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(entries::selected_alias(&mut s).as_deref(), Some("ui"));
    }
}
