/*!
 * Tests for catalog parsing and writing
 */

use potwai::catalog::{Catalog, CatalogEntry, EntryKey};
use potwai::errors::CatalogError;

use crate::common::{self, STORE_CATALOG};

#[test]
fn test_roundTrip_withStoreCatalog_shouldBeByteIdentical() {
    let catalog = Catalog::parse(STORE_CATALOG).unwrap();
    assert_eq!(catalog.to_po_string(), STORE_CATALOG);
}

#[test]
fn test_parse_withStoreCatalog_shouldExposeEveryField() {
    let catalog = Catalog::parse(STORE_CATALOG).unwrap();

    assert_eq!(catalog.language().as_deref(), Some("nb_NO"));
    assert_eq!(catalog.charset().as_deref(), Some("UTF-8"));
    assert_eq!(catalog.plural_forms().as_deref(), Some("nplurals=2; plural=(n != 1);"));

    let cookie = catalog.find(&EntryKey::from("Cookie Settings")).unwrap();
    assert_eq!(cookie.extracted_comments, vec!["Banner heading"]);
    assert_eq!(cookie.references, vec!["templates/cookie_banner.html:3"]);

    let open = catalog.find(&EntryKey::new(Some("menu"), "Open")).unwrap();
    assert_eq!(open.msgctxt.as_deref(), Some("menu"));

    let terms = catalog.find(&EntryKey::from("Terms")).unwrap();
    assert_eq!(
        terms.msgstr,
        "Read our <a href=\"https://example.com/terms\">terms</a> before you order."
    );

    let plural = catalog.find(&EntryKey::from("%d item")).unwrap();
    assert_eq!(plural.msgid_plural.as_deref(), Some("%d items"));
    assert_eq!(plural.msgstr_plural.len(), 2);

    assert!(catalog.entries().iter().any(|e| e.obsolete && e.msgid == "Old banner"));
    assert_eq!(catalog.messages().count(), 7);
}

#[test]
fn test_setTranslation_shouldLeaveOtherEntriesUntouched() {
    let mut catalog = Catalog::parse(STORE_CATALOG).unwrap();
    let index = catalog
        .messages()
        .find(|(_, e)| e.msgid == "Cookie Settings")
        .map(|(i, _)| i)
        .unwrap();

    assert!(catalog.set_translation(index, "Innstillinger for informasjonskapsler".to_string(), false));
    let output = catalog.to_po_string();

    let expected = STORE_CATALOG.replacen(
        "msgid \"Cookie Settings\"\nmsgstr \"\"",
        "msgid \"Cookie Settings\"\nmsgstr \"Innstillinger for informasjonskapsler\"",
        1,
    );
    assert_eq!(output, expected);
}

#[test]
fn test_saveAndLoad_shouldPreserveTranslations() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("out/messages.nb.po");

    let mut catalog = Catalog::new();
    catalog.push(CatalogEntry::new("Checkout", "Til kassen").with_reference("cart.html:4"));
    catalog.push(CatalogEntry::new("Line one\nLine two", "").with_context("help"));
    catalog.save(&path).unwrap();

    let loaded = Catalog::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.entries()[0].msgstr, "Til kassen");
    assert_eq!(loaded.entries()[1].msgid, "Line one\nLine two");
    assert_eq!(loaded.entries()[1].msgctxt.as_deref(), Some("help"));
}

#[test]
fn test_load_withMissingFile_shouldFailWithIoError() {
    let dir = common::create_temp_dir().unwrap();
    let err = Catalog::load(dir.path().join("missing.po")).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}

#[test]
fn test_parse_withDuplicateEntry_shouldReportLine() {
    let content = "msgid \"Save\"\nmsgstr \"\"\n\nmsgid \"Save\"\nmsgstr \"Lagre\"\n";
    match Catalog::parse(content) {
        Err(CatalogError::DuplicateEntry { line, key }) => {
            assert_eq!(line, 4);
            assert_eq!(key, "Save");
        }
        other => panic!("expected duplicate entry error, got {:?}", other.map(|c| c.len())),
    }
}
