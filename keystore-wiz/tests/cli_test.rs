use std::fs;
use std::path::Path;

use clap::Parser;
use jks::Keystore;
use keystore_wiz::cli::{Cli, run};

fn cli(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
    let config = dir.join("wiz.toml");
    fs::write(&config, "[ui]\ntitle = \"Test\"\n").unwrap();

    let mut argv = vec!["keystore-wiz", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?)
}

#[test]
fn test_import_list_delete_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("trust.jks");
    let store_s = store.to_str().unwrap();

    let cert = rcgen::generate_simple_self_signed(vec!["cli.test".to_string()]).unwrap();
    let pem = dir.path().join("cli.pem");
    fs::write(&pem, cert.cert.pem()).unwrap();

    // Import creates the keystore.
    cli(
        dir.path(),
        &["import", store_s, "CLI", pem.to_str().unwrap(), "-p", "changeit"],
    )
    .unwrap();
    let ks = Keystore::from_bytes(&fs::read(&store).unwrap(), Some("changeit")).unwrap();
    assert!(ks.is_certificate_entry("cli"));

    cli(dir.path(), &["list", store_s, "-p", "changeit", "--json"]).unwrap();
    cli(dir.path(), &["show", store_s, "cli", "-p", "changeit"]).unwrap();

    let exported = dir.path().join("export.jks");
    cli(
        dir.path(),
        &[
            "export",
            store_s,
            exported.to_str().unwrap(),
            "-p",
            "changeit",
            "--new-password",
            "other",
        ],
    )
    .unwrap();
    assert!(Keystore::from_bytes(&fs::read(&exported).unwrap(), Some("other")).is_ok());

    let trimmed = dir.path().join("trimmed.jks");
    cli(
        dir.path(),
        &["delete", store_s, "cli", "-p", "changeit", "-o", trimmed.to_str().unwrap()],
    )
    .unwrap();
    let ks = Keystore::from_bytes(&fs::read(&trimmed).unwrap(), Some("changeit")).unwrap();
    assert!(ks.is_empty());
    // The source is untouched when writing elsewhere.
    let ks = Keystore::from_bytes(&fs::read(&store).unwrap(), Some("changeit")).unwrap();
    assert_eq!(ks.len(), 1);
}

#[test]
fn test_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("trust.jks");
    fs::write(&store, Keystore::new().to_bytes("changeit").unwrap()).unwrap();
    let store_s = store.to_str().unwrap();

    assert!(cli(dir.path(), &["list", store_s, "-p", "wrong"]).is_err());
    assert!(cli(dir.path(), &["show", store_s, "missing", "-p", "changeit"]).is_err());
    assert!(cli(dir.path(), &["delete", store_s, "missing", "-p", "changeit"]).is_err());
}
