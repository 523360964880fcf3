use std::fs;
use std::path::PathBuf;

use cursive::{
    Cursive,
    traits::{Nameable, Resizable},
    views::{Dialog, EditView, LinearLayout, TextView},
};

use super::{AppState, entries, show_error, show_info, with_manager};
use crate::cert;
use crate::manager::EntryDetails;

const INPUT: &str = "dialog_input";
const DELETE_DIALOG: &str = "delete_dialog";
const QUIT_DIALOG: &str = "quit_dialog";

/// Renders the details dialog body.
pub fn details_text(d: &EntryDetails) -> String {
    let c = &d.certificate;
    let mut lines = vec![
        format!("Alias:            {}", d.entry.alias),
        format!("Entry type:       {}", d.entry.kind.label()),
        format!("Created:          {}", d.created),
        format!("Issued to:        {}", c.summary.subject),
        format!("Issued by:        {}", c.summary.issuer),
        format!("Valid from:       {}", c.summary.not_before),
        format!("Valid until:      {}", c.summary.not_after),
        format!("Status:           {}", d.entry.validity.label()),
        format!("Version:          V{}", c.version),
        format!("Serial number:    {}", c.serial),
        format!("Signature alg.:   {}", c.signature_algorithm),
        format!("SHA-1:            {}", c.sha1_fingerprint),
        format!("SHA-256:          {}", c.sha256_fingerprint),
    ];
    if c.self_signed {
        lines.push("Self-signed:      yes".to_string());
    }
    if d.chain_len > 1 {
        lines.push(format!("Chain length:     {}", d.chain_len));
    }
    lines.join("\n")
}

/// Shows the certificate details of an entry.
pub fn show_details(s: &mut Cursive, alias: &str) {
    match with_manager(s, |m| m.details(alias)) {
        Ok(details) => s.add_layer(
            Dialog::around(TextView::new(details_text(&details)))
                .title(format!("Certificate: {alias}"))
                .dismiss_button("Close"),
        ),
        Err(e) => show_error(s, "Details", format!("{e:#}")),
    }
}

/// Asks before removing an entry.
pub fn confirm_delete(s: &mut Cursive, alias: &str) {
    let alias = alias.to_string();
    s.add_layer(
        Dialog::text(format!(
            "Are you sure you want to delete this keystore entry?\n\nAlias: {alias}"
        ))
        .title("Delete Confirmation")
        .button("Yes", move |s| {
            s.pop_layer();
            match with_manager(s, |m| m.delete_entry(&alias)) {
                Ok(()) => entries::refresh(s),
                Err(e) => show_error(s, "Delete Failed", format!("{e:#}")),
            }
        })
        .dismiss_button("No")
        .with_name(DELETE_DIALOG),
    );
}

/// Single-field prompt. `on_ok` receives the entered text.
fn prompt<F>(s: &mut Cursive, title: &str, label: &str, initial: &str, secret: bool, on_ok: F)
where
    F: Fn(&mut Cursive, String) + Send + Sync + 'static,
{
    let mut input = EditView::new().content(initial);
    if secret {
        input.set_secret(true);
    }
    let on_ok = std::sync::Arc::new(on_ok);
    let submit = {
        let on_ok = on_ok.clone();
        move |s: &mut Cursive, text: &str| {
            s.pop_layer();
            on_ok(s, text.to_string());
        }
    };

    s.add_layer(
        Dialog::around(
            LinearLayout::vertical()
                .child(TextView::new(label))
                .child(input.on_submit(submit).with_name(INPUT).fixed_width(60)),
        )
        .title(title)
        .button("OK", move |s| {
            let text = s
                .call_on_name(INPUT, |v: &mut EditView| v.get_content().to_string())
                .unwrap_or_default();
            s.pop_layer();
            on_ok(s, text);
        })
        .dismiss_button("Cancel"),
    );
}

/// Adds a trusted certificate: asks for the file, then for the alias.
pub fn add_certificate(s: &mut Cursive) {
    prompt(
        s,
        "Select Certificate",
        "Certificate file (.cer, .crt, .pem):",
        "",
        false,
        |s, path| {
            let path = PathBuf::from(path.trim());
            let checked = fs::read(&path)
                .map_err(anyhow::Error::from)
                .and_then(|data| cert::parse_certificates(&data));
            if let Err(e) = checked {
                show_error(
                    s,
                    "Add Certificate Failed",
                    format!("Failed to add certificate: {e:#}"),
                );
                return;
            }

            prompt(
                s,
                "Certificate Alias",
                "Enter the alias for the certificate:",
                "",
                false,
                move |s, alias| match with_manager(s, |m| m.add_certificate_file(&alias, &path)) {
                    Ok(_) => {
                        entries::refresh(s);
                        show_info(s, "Add Certificate", "Certificate added successfully.");
                    }
                    Err(e) => show_error(
                        s,
                        "Add Certificate Failed",
                        format!("Failed to add certificate: {e:#}"),
                    ),
                },
            );
        },
    );
}

/// Writes the keystore under a new password: asks for the password, then the path.
pub fn export_keystore(s: &mut Cursive) {
    prompt(
        s,
        "Keystore Password",
        "Enter the keystore password:",
        "",
        true,
        |s, password| {
            let current = with_manager(s, |m| {
                Ok(m.path().map(|p| p.display().to_string()).unwrap_or_default())
            })
            .unwrap_or_default();

            prompt(
                s,
                "Save Keystore",
                "Output file:",
                &current,
                false,
                move |s, out| {
                    let out = PathBuf::from(out.trim());
                    match with_manager(s, |m| m.store(&out, &password)) {
                        Ok(()) => {
                            let shown = fs::canonicalize(&out).unwrap_or_else(|_| out.clone());
                            entries::refresh(s);
                            show_info(
                                s,
                                "Export Successful",
                                format!("Keystore exported successfully to {}", shown.display()),
                            );
                        }
                        Err(e) => show_error(
                            s,
                            "Export Failed",
                            format!("Failed to export keystore: {e:#}"),
                        ),
                    }
                },
            );
        },
    );
}

/// Asks before leaving the application. Does nothing if already asking.
pub fn confirm_quit(s: &mut Cursive) {
    if s.find_name::<Dialog>(QUIT_DIALOG).is_some() {
        return;
    }

    let dirty = s
        .user_data::<AppState>()
        .map(|state| state.manager.is_dirty())
        .unwrap_or(false);

    let mut msg = "Are you sure you want to exit?".to_string();
    if dirty {
        msg.push_str("\n\nAll unsaved data will be lost!");
    }

    s.add_layer(
        Dialog::text(msg)
            .title("Exit Program")
            .button("OK", |s| {
                info!("Application closed by user.");
                s.quit();
            })
            .dismiss_button("Cancel")
            .with_name(QUIT_DIALOG),
    );
}
