use cursive::{
    Cursive,
    traits::{Nameable, Resizable, Scrollable},
    view::View,
    views::{Dialog, LinearLayout, SelectView, TextView},
};

use super::{dialogs, show_error, with_manager};
use crate::manager::KeystoreEntry;

const HEADER: &str = "entries_header";
pub(crate) const ENTRIES: &str = "entries_table";

/// Column widths: alias, kind, subject, issuer, valid from, valid until, status.
const COLUMNS: [usize; 7] = [20, 12, 32, 32, 28, 28, 13];

/// Builds the entry table screen. Call [`refresh`] after adding it.
pub fn entries_view() -> impl View {
    let table = SelectView::<String>::new()
        .on_submit(|s, alias: &str| dialogs::show_details(s, alias))
        .with_name(ENTRIES)
        .scrollable();

    let layout = LinearLayout::vertical()
        .child(TextView::new("").with_name(HEADER))
        .child(TextView::new(column_header()))
        .child(table.full_height());

    Dialog::around(layout)
        .title("Keystore Details")
        .button("Details", |s| {
            if let Some(alias) = selected_alias(s) {
                dialogs::show_details(s, &alias);
            }
        })
        .button("Remove", |s| {
            if let Some(alias) = selected_alias(s) {
                dialogs::confirm_delete(s, &alias);
            }
        })
        .button("Add certificate", dialogs::add_certificate)
        .button("Export", dialogs::export_keystore)
        .button("Quit", dialogs::confirm_quit)
        .full_screen()
}

/// Alias of the highlighted row.
pub fn selected_alias(s: &mut Cursive) -> Option<String> {
    s.find_name::<SelectView<String>>(ENTRIES)
        .and_then(|v| v.selection())
        .map(|alias| alias.to_string())
}

/// Reloads the table and header from the manager.
pub fn refresh(s: &mut Cursive) {
    let listing = with_manager(s, |m| {
        let path = m
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let marker = if m.is_dirty() { " [modified]" } else { "" };
        Ok((format!("Keystore: {path}{marker}"), m.entries()?))
    });

    let (header, rows) = match listing {
        Ok(v) => v,
        Err(e) => {
            show_error(s, "Keystore", format!("Failed to list entries: {e:#}"));
            return;
        }
    };

    s.call_on_name(HEADER, |v: &mut TextView| v.set_content(header));
    s.call_on_name(ENTRIES, |v: &mut SelectView<String>| {
        v.clear();
        for row in &rows {
            v.add_item(format_row(row), row.alias.clone());
        }
    });
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}… ")
    } else {
        format!("{text:<width$} ")
    }
}

fn column_header() -> String {
    let names = [
        "Alias",
        "Kind",
        "Subject",
        "Issuer",
        "Valid from",
        "Valid until",
        "Status",
    ];
    names
        .iter()
        .zip(COLUMNS)
        .map(|(n, w)| fit(n, w))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Formats one table row with fixed-width columns.
pub fn format_row(entry: &KeystoreEntry) -> String {
    let cells = [
        entry.alias.as_str(),
        entry.kind.label(),
        entry.subject.as_str(),
        entry.issuer.as_str(),
        entry.start_date.as_str(),
        entry.end_date.as_str(),
        entry.validity.label(),
    ];
    cells
        .iter()
        .zip(COLUMNS)
        .map(|(c, w)| fit(c, w))
        .collect::<String>()
        .trim_end()
        .to_string()
}
