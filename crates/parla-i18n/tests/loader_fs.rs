//! Loading translation files from disk.

use std::fs;

use parla_i18n::loader::{FsAssetSource, TranslationLoader};
use parla_i18n::{LanguageFile, LanguageId, LoaderConfig, LoaderError, Params, Translator};
use pretty_assertions::assert_eq;

fn write(dir: &tempfile::TempDir, name: &str, text: &str) {
    fs::write(dir.path().join(name), text).expect("write fixture");
}

#[test]
fn loads_nested_files_and_activates_default() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir,
        "de.json",
        r#"{ "menu": { "open": "Öffnen", "greeting": "Hallo {name}" }, "count": 3 }"#,
    );
    write(&dir, "en.json", r#"{ "menu": { "open": "Open" } }"#);

    let config = LoaderConfig::from_json(
        r#"{
            "asset_location": "",
            "languages": [
                { "language": "en", "file_name": "en.json" },
                { "language": "de", "file_name": "de.json", "default": true }
            ]
        }"#,
    )
    .unwrap();

    let translator = Translator::new();
    let report = TranslationLoader::new(FsAssetSource::with_root(dir.path()), config)
        .load_into(&translator)
        .unwrap();

    assert_eq!(report.loaded, vec![LanguageId::from("en"), LanguageId::from("de")]);
    assert_eq!(report.activated, Some(LanguageId::from("de")));
    assert_eq!(report.entries, 4);

    let params = Params::new().with("name", "Robin");
    assert_eq!(
        translator.translate_or_empty("menu.greeting", Some(&params)).unwrap(),
        "Hallo Robin"
    );
    assert_eq!(translator.translate_or_empty("count", None).unwrap(), "3");

    translator.use_language("en");
    assert_eq!(translator.translate_or_empty("menu.open", None).unwrap(), "Open");
}

#[test]
fn missing_file_is_reported_and_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, "de.json", r#"{ "a": "b" }"#);

    let config = LoaderConfig::default()
        .asset_location("")
        .language(LanguageFile::new("de", "de.json"))
        .language(LanguageFile::new("en", "en.json"));

    let translator = Translator::new();
    let err = TranslationLoader::new(FsAssetSource::with_root(dir.path()), config)
        .load_into(&translator)
        .unwrap_err();

    match err {
        LoaderError::Io { location, .. } => assert_eq!(location, "en.json"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(translator.languages().is_empty());
    assert_eq!(translator.active_language_id(), None);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, "de.json", "{ not json");

    let config = LoaderConfig::default()
        .asset_location("")
        .language(LanguageFile::new("de", "de.json"));

    let err = TranslationLoader::new(FsAssetSource::with_root(dir.path()), config)
        .load_into(&Translator::new())
        .unwrap_err();
    assert!(matches!(err, LoaderError::Parse { .. }), "{err}");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn asset_location_prefixes_file_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("i18n")).unwrap();
    fs::write(dir.path().join("i18n").join("fr.json"), r#"{ "k": "v" }"#).unwrap();

    let config = LoaderConfig::default()
        .asset_location("i18n/")
        .language(LanguageFile::new("fr", "fr.json"));
    let translator = Translator::new();
    let report = TranslationLoader::new(FsAssetSource::with_root(dir.path()), config)
        .load_into(&translator)
        .unwrap();

    assert_eq!(report.activated, Some(LanguageId::from("fr")));
    assert_eq!(translator.translate_or_empty("k", None).unwrap(), "v");
}

#[test]
fn numeric_language_id_in_config() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, "2.json", r#"{ "k": "zwei" }"#);

    let config = LoaderConfig::from_json(
        r#"{ "asset_location": "", "languages": [ { "language": 2, "file_name": "2.json" } ] }"#,
    )
    .unwrap();
    let translator = Translator::new();
    let report = TranslationLoader::new(FsAssetSource::with_root(dir.path()), config)
        .load_into(&translator)
        .unwrap();

    assert_eq!(report.activated, Some(LanguageId::from(2)));
    assert_eq!(translator.active_language_id(), Some(LanguageId::from("2")));
    assert_eq!(translator.translate_or_empty("k", None).unwrap(), "zwei");
}
