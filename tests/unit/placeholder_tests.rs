/*!
 * Tests for placeholder validation
 */

use potwai::validation::{PlaceholderSet, PlaceholderValidator};

#[test]
fn test_validate_withMissingPrintfDirective_shouldFlagIt() {
    let report = PlaceholderValidator::validate("Accept %s of %d items", "Godta %s elementer");

    assert!(!report.passed);
    assert_eq!(report.missing, vec!["%d"]);
    assert!(report.added.is_empty());
}

#[test]
fn test_validate_withSwappedDirectiveType_shouldReportBothSides() {
    let report = PlaceholderValidator::validate("Accept %s of %d items", "Godta %d av %d elementer");

    assert!(!report.passed);
    assert_eq!(report.missing, vec!["%s"]);
    assert_eq!(report.added, vec!["%d"]);
}

#[test]
fn test_validate_withAllTokensPreserved_shouldPass() {
    let source = "Hi {{ user.name }}, see <a href=\"https://example.com/help\">help</a> or {0} (%1$s, 100%%).";
    let translation = "Hei {{ user.name }}, se <a href=\"https://example.com/help\">hjelp</a> eller {0} (%1$s, 100%%).";

    assert!(PlaceholderValidator::validate(source, translation).passed);
}

#[test]
fn test_validate_withTranslatedUrl_shouldReportBothSides() {
    let report = PlaceholderValidator::validate(
        "Read more at https://example.com/en/privacy.",
        "Les mer på https://example.com/nb/personvern.",
    );

    assert_eq!(report.missing, vec!["https://example.com/en/privacy"]);
    assert_eq!(report.added, vec!["https://example.com/nb/personvern"]);
}

#[test]
fn test_extract_withNamedAndObjectiveCDirectives_shouldCountThem() {
    let set = PlaceholderSet::extract("%(count)s files from %@ at %5.2f, %lld bytes");

    assert_eq!(set.len(), 4);
    assert_eq!(set.count("%(count)s"), 1);
    assert_eq!(set.count("%@"), 1);
    assert_eq!(set.count("%lld"), 1);
}

#[test]
fn test_validate_withDroppedFormatSpecBraces_shouldFlagThem() {
    let report = PlaceholderValidator::validate("Total: {0:.2f} for {count:d} items at {price:,}", "Totalt for elementer");

    assert!(!report.passed);
    assert_eq!(report.missing.len(), 3);
    assert!(report.missing.contains(&"{0:.2f}".to_string()));
    assert!(report.missing.contains(&"{count:d}".to_string()));
    assert!(report.missing.contains(&"{price:,}".to_string()));
}

#[test]
fn test_validate_withFormatSpecBracesKept_shouldPass() {
    assert!(PlaceholderValidator::validate("{0:.2f} of {name!r}", "{0:.2f} av {name!r}").passed);
}
