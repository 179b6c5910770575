/*!
 * Prompt templates for catalog translation.
 *
 * The system prompt fixes the rules and the answer format; the user prompt is
 * a JSON document carrying the items of one batch together with few-shot
 * examples for the target language and the optional domain context.
 */

use serde::{Deserialize, Serialize};

use crate::language_utils;
use crate::translation::selection::WorkItem;

/// System prompt template for catalog translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for UI string translation.
    pub const PO_TRANSLATOR: &'static str = r#"You are a professional software localizer translating user interface strings into {target_language} ({target_code}).

## Rules
- Each item carries a `lang` field naming its source language; translate from that language into {target_language}
- Preserve every placeholder token exactly as written: printf directives (%s, %d, %1$s, %(name)s, %%), brace placeholders ({name}, {0}, {{ name }}), HTML tags and URLs
- Never translate HTML tag names, attribute names or attribute values, and never change URLs
- Keep the capitalization style and punctuation of the source (title case stays title case)
- Keep technical terms consistent and natural for standard {target_language}

## Output Requirements
- Return ONLY a single JSON object mapping each item `id` to its translated string
- Include every id from the request exactly once and no other keys
- Do not wrap the JSON in markdown and do not add any text outside it"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default catalog translator template.
    pub fn po_translator() -> Self {
        Self::new(Self::PO_TRANSLATOR)
    }

    /// Render the template for a target language.
    pub fn render(&self, target_language: &str, target_code: &str) -> String {
        self.template
            .replace("{target_language}", target_language)
            .replace("{target_code}", target_code)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::po_translator()
    }
}

/// Human-readable name for a target code, falling back to the code itself
pub fn target_language_name(code: &str) -> String {
    language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// Few-shot examples for a target language
pub fn few_shot_examples(target_code: &str) -> Vec<FewShotExample> {
    let rows: &[(&str, &str, &str)] = match language_utils::language_part(target_code).as_str() {
        "nb" | "no" | "nn" => &[
            ("Accept All", "en", "Godta alle"),
            ("Cookie Settings", "en", "Innstillinger for informasjonskapsler"),
            ("Kundenstimmen - Archiv", "de", "Arkiv for kundeanmeldelser"),
        ],
        "sv" => &[
            ("Accept All", "en", "Acceptera alla"),
            ("Cookie Settings", "en", "Cookie-inställningar"),
            ("Kundenstimmen - Archiv", "de", "Arkiv för kundomdömen"),
        ],
        "da" => &[
            ("Accept All", "en", "Accepter alle"),
            ("Cookie Settings", "en", "Cookie-indstillinger"),
            ("Kundenstimmen - Archiv", "de", "Arkiv for kundeanmeldelser"),
        ],
        "de" => &[
            ("Accept All", "en", "Alle akzeptieren"),
            ("Cookie Settings", "en", "Cookie-Einstellungen"),
            ("Delete %s?", "en", "%s löschen?"),
        ],
        "fr" => &[
            ("Accept All", "en", "Tout accepter"),
            ("Cookie Settings", "en", "Paramètres des cookies"),
            ("Delete %s?", "en", "Supprimer %s ?"),
        ],
        "es" => &[
            ("Accept All", "en", "Aceptar todo"),
            ("Cookie Settings", "en", "Configuración de cookies"),
            ("Delete %s?", "en", "¿Eliminar %s?"),
        ],
        // shows the answer shape only
        _ => &[("Accept All", "en", "Accept All")],
    };

    rows.iter()
        .enumerate()
        .map(|(i, (text, lang, translation))| FewShotExample {
            id: format!("example-{}", i + 1),
            text: text.to_string(),
            lang: lang.to_string(),
            translation: translation.to_string(),
        })
        .collect()
}

/// Builder for constructing translation prompts.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    target_language: String,
    items: Vec<RequestItem>,
    context: Option<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(target_language: &str) -> Self {
        Self {
            target_language: language_utils::language_part(target_language),
            items: Vec::new(),
            context: None,
        }
    }

    /// Set the items to translate.
    pub fn with_items(mut self, items: &[WorkItem]) -> Self {
        self.items = items
            .iter()
            .map(|item| RequestItem {
                id: item.key.as_str().to_string(),
                text: item.text.clone(),
                lang: item.language.clone().unwrap_or_else(|| "auto".to_string()),
            })
            .collect();
        self
    }

    /// Set the domain context injected verbatim into the request.
    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string).filter(|c| !c.trim().is_empty());
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        PromptTemplate::po_translator().render(
            &target_language_name(&self.target_language),
            &self.target_language,
        )
    }

    /// Build the user prompt as a JSON request.
    pub fn build_user_prompt(&self) -> String {
        let request = TranslationRequest {
            task: "translate_ui_strings".to_string(),
            instructions: format!(
                "Translate every item into {} and answer with one JSON object mapping each id to its translation.",
                target_language_name(&self.target_language)
            ),
            target_lang: self.target_language.clone(),
            context: self.context.clone(),
            examples: few_shot_examples(&self.target_language),
            items: self.items.clone(),
        };

        serde_json::to_string_pretty(&request).unwrap_or_else(|_| "{}".to_string())
    }

    /// Build both system and user prompts.
    pub fn build(&self) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt())
    }
}

/// Rough prompt size in tokens (four characters per token)
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Translation request structure for JSON communication with LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Task identifier
    pub task: String,

    /// Short restatement of the rules
    pub instructions: String,

    /// Target language code
    pub target_lang: String,

    /// Domain context supplied by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Worked examples
    pub examples: Vec<FewShotExample>,

    /// Items to translate
    pub items: Vec<RequestItem>,
}

/// An item to translate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItem {
    /// Entry key
    pub id: String,

    /// Text to translate
    pub text: String,

    /// Source language code, or "auto"
    pub lang: String,
}

/// A worked example shown to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FewShotExample {
    pub id: String,
    pub text: String,
    pub lang: String,
    pub translation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntryKey;
    use crate::translation::selection::SourceField;

    fn item(key: EntryKey, text: &str, lang: Option<&str>) -> WorkItem {
        WorkItem {
            index: 0,
            key,
            field: SourceField::Msgid,
            text: text.to_string(),
            language: lang.map(str::to_string),
        }
    }

    #[test]
    fn test_promptTemplate_render_shouldReplaceVariables() {
        let rendered = PromptTemplate::po_translator().render("Swedish", "sv");

        assert!(rendered.contains("into Swedish (sv)"));
        assert!(!rendered.contains("{target_language}"));
        assert!(!rendered.contains("{target_code}"));
    }

    #[test]
    fn test_buildUserPrompt_shouldCarryItemsExamplesAndContext() {
        let items = vec![
            item(EntryKey::from("Accept All"), "Accept All", Some("en")),
            item(EntryKey::new(Some("menu"), "Open"), "Open", None),
        ];
        let builder = TranslationPromptBuilder::new("nb_NO")
            .with_items(&items)
            .with_context(Some("Garden machinery web shop"));

        let request: TranslationRequest = serde_json::from_str(&builder.build_user_prompt()).unwrap();

        assert_eq!(request.target_lang, "nb");
        assert_eq!(request.context.as_deref(), Some("Garden machinery web shop"));
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[1].id, "menu\u{4}Open");
        assert_eq!(request.items[1].lang, "auto");
        assert_eq!(request.examples[0].translation, "Godta alle");
    }

    #[test]
    fn test_withContext_withBlankText_shouldOmitContext() {
        let builder = TranslationPromptBuilder::new("da").with_context(Some("  "));
        let request: TranslationRequest = serde_json::from_str(&builder.build_user_prompt()).unwrap();

        assert!(request.context.is_none());
        assert_eq!(request.examples[1].translation, "Cookie-indstillinger");
    }

    #[test]
    fn test_fewShotExamples_withUnlistedTarget_shouldUseGenericExample() {
        let examples = few_shot_examples("it");

        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].id, "example-1");
        assert_eq!(examples[0].text, "Accept All");
        assert_eq!(few_shot_examples("nb_NO").len(), 3);
    }

    #[test]
    fn test_estimateTokens_shouldRoundUp() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
