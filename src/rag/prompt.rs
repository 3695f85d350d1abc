//! System prompt rendering.
//!
//! Prompts are inlined per language; an unknown language code falls back to
//! English rather than failing.

use crate::types::Chunk;

/// Languages with a dedicated prompt.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "de", "fr", "es"];

/// Whether a language code has a dedicated prompt.
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Full language name for a code, defaulting to English.
pub fn language_name(code: &str) -> &'static str {
    match code {
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        _ => "English",
    }
}

/// Renders language-aware system prompts from retrieved context.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplate;

impl PromptTemplate {
    /// Create a template renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render the system prompt embedding the given chunks.
    ///
    /// An unsupported language renders the English prompt.
    pub fn render_system(&self, context: &[Chunk], language: &str) -> String {
        let instructions = match language {
            "de" => INSTRUCTIONS_DE,
            "fr" => INSTRUCTIONS_FR,
            "es" => INSTRUCTIONS_ES,
            _ => INSTRUCTIONS_EN,
        };

        let mut prompt = String::with_capacity(instructions.len() + context.len() * 256);
        prompt.push_str(instructions);
        prompt.push_str("\n\nContext:\n");

        for chunk in context {
            prompt.push_str(&format!(
                "\n[{}, Page {}]\n{}\n",
                chunk.document, chunk.page, chunk.content
            ));
        }

        prompt.push_str(&format!(
            "\nAnswer in {}. Cite sources using the [Document, Page N] format.",
            language_name(language)
        ));
        prompt
    }
}

const INSTRUCTIONS_EN: &str = "You are a technical support assistant. \
Answer the user's question using only the provided context passages. \
If the context does not contain the answer, say you don't know rather than guessing. \
Reference the documents you used with citations like [Document Name, Page 3].";

const INSTRUCTIONS_DE: &str = "Du bist ein technischer Support-Assistent. \
Beantworte die Frage des Nutzers ausschließlich anhand der bereitgestellten Kontextauszüge. \
Wenn der Kontext die Antwort nicht enthält, sage, dass du es nicht weißt, statt zu raten. \
Verweise auf die verwendeten Dokumente mit Zitaten wie [Dokumentname, Page 3].";

const INSTRUCTIONS_FR: &str = "Tu es un assistant de support technique. \
Réponds à la question de l'utilisateur uniquement à partir des extraits de contexte fournis. \
Si le contexte ne contient pas la réponse, dis que tu ne sais pas plutôt que de deviner. \
Référence les documents utilisés avec des citations comme [Nom du document, Page 3].";

const INSTRUCTIONS_ES: &str = "Eres un asistente de soporte técnico. \
Responde a la pregunta del usuario utilizando únicamente los fragmentos de contexto proporcionados. \
Si el contexto no contiene la respuesta, di que no lo sabes en lugar de adivinar. \
Referencia los documentos utilizados con citas como [Nombre del documento, Page 3].";
