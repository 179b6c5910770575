/*!
 * Heuristic source-language classifier.
 *
 * Detection is a pure function over closed word lists and language-specific
 * letters for a small set of candidate languages. Placeholders and markup are
 * removed before scoring so that `%s` or `<strong>` never count as words.
 *
 * Scoring per candidate:
 * - every word found in the candidate's word list adds `WORD_WEIGHT`
 * - every word containing one of the candidate's special letters adds `LETTER_WEIGHT`
 * - English additionally gets `ASCII_WEIGHT` when the text is pure ASCII and
 *   at least one English word matched
 *
 * The unique best-scoring candidate wins; ties and all-zero scores are
 * reported as ambiguous.
 */

use crate::language_utils;
use crate::validation::strip_placeholders;

const WORD_WEIGHT: u32 = 2;
const LETTER_WEIGHT: u32 = 3;
const ASCII_WEIGHT: u32 = 1;

/// Word list and special letters of one candidate language
struct LanguageProfile {
    code: &'static str,
    words: &'static [&'static str],
    letters: &'static [char],
}

static PROFILES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "en",
        words: &[
            // common UI vocabulary
            "accept", "settings", "cookie", "cookies", "filter", "configure", "product",
            "products", "review", "reviews", "customer", "customers", "archive", "example",
            "save", "cancel", "next", "previous", "email", "password", "sign", "log", "login",
            "home", "about", "contact", "help", "search", "show", "delete", "remove", "add",
            "cart", "order", "account", "items", "item", "please", "yes", "select",
            // function words
            "the", "and", "is", "not", "for", "with", "a", "an", "to", "of", "on", "as",
            "also", "your", "you", "this", "that", "all", "in", "are", "be", "by", "or",
            "from", "it", "new", "more", "no", "here", "was", "has", "have", "will", "can",
        ],
        letters: &[],
    },
    LanguageProfile {
        code: "de",
        words: &[
            "der", "die", "das", "und", "ist", "nicht", "für", "mit", "ein", "eine", "zu",
            "von", "auf", "als", "auch", "alle", "akzeptieren", "speichern", "abbrechen",
            "einstellungen", "weiter", "zurück", "passwort", "anmelden", "abmelden",
            "startseite", "über", "hilfe", "suchen", "anzeigen", "löschen", "kunde",
            "kunden", "kundenstimmen", "archiv", "produkte", "auswählen", "hinzufügen",
            "warenkorb", "bestellung", "neu", "keine", "mehr", "oder", "sie", "ihr", "ihre",
            "wir", "unsere", "bei", "hat", "kann", "wird", "im", "dem", "des", "sich",
            "werden", "sind", "bitte",
        ],
        letters: &['ä', 'ö', 'ü', 'ß'],
    },
    LanguageProfile {
        code: "fr",
        words: &[
            "le", "la", "les", "et", "est", "pas", "pour", "avec", "un", "une", "de", "du",
            "des", "sur", "au", "aux", "vous", "votre", "nous", "tous", "toutes", "accepter",
            "paramètres", "enregistrer", "annuler", "suivant", "précédent", "mot", "passe",
            "connexion", "accueil", "propos", "aide", "rechercher", "afficher", "supprimer",
            "client", "avis", "archives", "produits", "panier", "commande", "compte",
            "nouveau", "plus", "ou", "dans", "qui", "que", "ce", "cette", "veuillez",
        ],
        letters: &['é', 'è', 'ê', 'à', 'ç', 'ù', 'â', 'î', 'ô', 'û', 'ë', 'ï', 'œ'],
    },
    LanguageProfile {
        code: "es",
        words: &[
            "el", "la", "los", "las", "y", "es", "no", "para", "con", "un", "una", "de",
            "del", "en", "por", "al", "su", "sus", "usted", "nuestro", "todos", "todas",
            "aceptar", "configuración", "guardar", "cancelar", "siguiente", "anterior",
            "contraseña", "iniciar", "sesión", "inicio", "acerca", "ayuda", "buscar",
            "mostrar", "eliminar", "cliente", "opiniones", "archivo", "productos", "carrito",
            "pedido", "cuenta", "nuevo", "más", "o", "que", "este", "esta",
        ],
        letters: &['ñ', 'á', 'í', 'ó', 'ú', '¿', '¡'],
    },
    LanguageProfile {
        code: "nb",
        words: &[
            "og", "ikke", "er", "for", "til", "med", "på", "av", "som", "det", "en", "et",
            "den", "alle", "godta", "lagre", "avbryt", "innstillinger", "neste", "forrige",
            "passord", "logg", "inn", "ut", "hjem", "om", "kontakt", "hjelp", "søk", "vis",
            "slett", "kunde", "kunder", "kundeanmeldelser", "arkiv", "produkter", "velg",
            "legg", "handlekurv", "bestilling", "konto", "ny", "nye", "ingen", "mer", "fra",
            "eller", "du", "din", "ditt", "dine", "vår", "våre", "ved", "har", "kan", "skal",
            "vil", "må", "informasjonskapsler", "vennligst",
        ],
        letters: &['æ', 'ø', 'å'],
    },
    LanguageProfile {
        code: "sv",
        words: &[
            "och", "inte", "är", "för", "till", "med", "på", "av", "som", "det", "en", "ett",
            "den", "alla", "acceptera", "spara", "avbryt", "inställningar", "nästa",
            "föregående", "lösenord", "logga", "in", "ut", "hem", "om", "kontakt", "hjälp",
            "sök", "visa", "ta", "bort", "kund", "kunder", "kundomdömen", "arkiv",
            "produkter", "välj", "lägg", "varukorg", "beställning", "konto", "ny", "nya",
            "ingen", "mer", "från", "eller", "du", "din", "ditt", "dina", "vår", "våra",
            "vid", "har", "kan", "ska", "vill", "måste",
        ],
        letters: &['ä', 'ö', 'å'],
    },
    LanguageProfile {
        code: "da",
        words: &[
            "og", "ikke", "er", "for", "til", "med", "på", "af", "som", "det", "en", "et",
            "den", "alle", "accepter", "gem", "annuller", "indstillinger", "næste",
            "forrige", "adgangskode", "log", "ind", "ud", "hjem", "om", "kontakt", "hjælp",
            "søg", "vis", "slet", "kunde", "kunder", "kundeanmeldelser", "arkiv",
            "produkter", "vælg", "tilføj", "kurv", "ordre", "konto", "ny", "nye", "ingen",
            "mere", "fra", "eller", "du", "din", "dit", "dine", "vores", "ved", "har", "kan",
            "skal", "vil", "må", "jeg", "hvad", "hvor",
        ],
        letters: &['æ', 'ø', 'å'],
    },
];

/// Result of language detection on one text
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Empty or whitespace-only text
    Empty,
    /// Nothing but placeholders, markup, digits and punctuation
    PlaceholderOnly,
    /// A unique best-scoring candidate
    Detected { language: &'static str, score: u32 },
    /// No candidate scored, or several tied
    Ambiguous,
}

impl Detection {
    /// Whether the text contains anything human-readable
    pub fn is_translatable_text(&self) -> bool {
        matches!(self, Self::Detected { .. } | Self::Ambiguous)
    }

    /// Detected language code, if any
    pub fn language(&self) -> Option<&'static str> {
        match self {
            Self::Detected { language, .. } => Some(*language),
            _ => None,
        }
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphabetic() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Detect the language of a text
pub fn detect(text: &str) -> Detection {
    if text.trim().is_empty() {
        return Detection::Empty;
    }

    let stripped = strip_placeholders(text);
    let words = words(&stripped);
    if words.is_empty() {
        return Detection::PlaceholderOnly;
    }

    let ascii_only = stripped.is_ascii() && words.iter().any(|w| w.len() >= 2);

    let mut scores: Vec<(&'static str, u32)> = PROFILES
        .iter()
        .map(|profile| {
            let mut score = 0;
            for word in &words {
                if profile.words.contains(&word.as_str()) {
                    score += WORD_WEIGHT;
                }
                if word.chars().any(|c| profile.letters.contains(&c)) {
                    score += LETTER_WEIGHT;
                }
            }
            // plain ASCII only supports English once an English word matched
            if profile.code == "en" && ascii_only && score > 0 {
                score += ASCII_WEIGHT;
            }
            (profile.code, score)
        })
        .collect();

    // stable sort keeps profile order among equal scores
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    match scores.as_slice() {
        [(language, best), rest @ ..] if *best > 0 && rest.first().is_none_or(|(_, s)| s < best) => {
            Detection::Detected { language: *language, score: *best }
        }
        _ => Detection::Ambiguous,
    }
}

/// Decision for one text
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Raw detection result
    pub detection: Detection,
    /// Whether the text should be sent for translation
    pub needs_translation: bool,
}

impl Classification {
    /// Inferred source language, when detection found one
    pub fn inferred_language(&self) -> Option<&'static str> {
        self.detection.language()
    }
}

/// Classifier bound to a source-language hint and a target language
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    /// None means `auto`
    source_hint: Option<String>,
    target_language: String,
}

impl LanguageClassifier {
    /// Create a classifier; a hint of `auto` enables detection of any candidate
    pub fn new(source_language: &str, target_language: &str) -> Self {
        let source_hint = if language_utils::is_auto(source_language) {
            None
        } else {
            Some(language_utils::language_part(source_language))
        };
        Self {
            source_hint,
            target_language: language_utils::language_part(target_language),
        }
    }

    /// Source-language hint, None for `auto`
    pub fn source_hint(&self) -> Option<&str> {
        self.source_hint.as_deref()
    }

    /// Target language code
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Whether a detection names the target language
    pub fn is_target(&self, detection: &Detection) -> bool {
        detection
            .language()
            .is_some_and(|lang| language_utils::language_codes_match(lang, &self.target_language))
    }

    /// Decide whether a text needs translation
    pub fn classify(&self, text: &str) -> Classification {
        let detection = detect(text);
        let needs_translation = match &detection {
            Detection::Empty | Detection::PlaceholderOnly => false,
            detected if self.is_target(detected) => false,
            Detection::Detected { language, .. } => match &self.source_hint {
                None => true,
                Some(hint) => language_utils::language_codes_match(language, hint),
            },
            Detection::Ambiguous => true,
        };
        Classification { detection, needs_translation }
    }
}
