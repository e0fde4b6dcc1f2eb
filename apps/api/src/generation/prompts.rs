// All LLM prompt constants for the generation pipeline.
// Reuses cross-cutting fragments from llm_client::prompts via `{placeholders}`.

/// System prompt for deck and note titles.
pub const TITLE_SYSTEM: &str = "You write short, specific titles for study material. \
    Respond with the title only, on a single line.";

/// Title prompt template. Replace `{language_instruction}` and `{text}` before sending.
pub const TITLE_PROMPT_TEMPLATE: &str = r#"Write one concise title (at most 10 words) for study material based on the opening of the source below.

Rules:
- Output exactly one line containing only the title.
- Do NOT prefix it with "Title:" or any other label.
- Do NOT wrap it in quotes or markdown.
- {language_instruction}

SOURCE (opening excerpt):
{text}"#;

/// System prompt for flashcard generation. Enforces JSON-only output.
pub const FLASHCARD_SYSTEM: &str = "You are an expert teacher who writes excellent flashcards. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Flashcard prompt template. Replace `{count}`, `{language_instruction}`,
/// `{ellipsis_instruction}` and `{chunk}` before sending.
pub const FLASHCARD_PROMPT_TEMPLATE: &str = r#"Create exactly {count} flashcards that test understanding of the source excerpt below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "flashcards": [
    {"question": "What process do plants use to convert light into chemical energy?", "answer": "Plants use photosynthesis to convert light energy into chemical energy stored in glucose."}
  ]
}

Rules:
- Every answer is one or more complete sentences.
- {ellipsis_instruction}
- {language_instruction}
- Ask about the content itself: facts, definitions, causes, consequences, comparisons and applications. Never ask about the text's language, formatting or author.
- Mix question types (definition, why/how, compare/contrast, example, cause/effect).
- Each question must be answerable from the excerpt alone.

SOURCE EXCERPT:
{chunk}"#;

/// System prompt for HTML study notes.
pub const NOTE_SYSTEM: &str = "You are an expert note-taker who turns source material into \
    thorough, well-structured HTML study notes. \
    Respond with the HTML fragment only: no <html>, <head> or <body> tags, no markdown, no code fences.";

/// Shared HTML structure rules for full notes and per-chunk sections.
pub const NOTE_FORMAT_RULES: &str = r#"Formatting rules:
- Use <h3> subheadings inside each section.
- Use <p> for paragraphs and <ul>/<li> for lists.
- Use <strong> and <em> to emphasise key terms.
- Use <blockquote> for notable quotes from the source.
- Use <pre><code> only for genuine code that appears in the source."#;

/// Full-note prompt template. Replace `{format_rules}`, `{language_instruction}`,
/// `{ellipsis_instruction}` and `{text}` before sending.
pub const NOTE_PROMPT_TEMPLATE: &str = r#"Write comprehensive study notes covering ALL of the source below.

Structure:
- Begin with an <h2> heading naming the overall topic.
- Split the material into between 1 and 4 major <h2> sections, each covering roughly a quarter of the source in order.

{format_rules}

Rules:
- Be exhaustive: cover every important point, definition, example and argument. This is NOT a short abstract.
- {ellipsis_instruction}
- {language_instruction}

SOURCE:
{text}"#;

/// Section prompt used when notes are generated per chunk. Replace `{part}`,
/// `{parts}`, `{format_rules}`, `{language_instruction}`,
/// `{ellipsis_instruction}` and `{chunk}` before sending.
pub const NOTE_SECTION_PROMPT_TEMPLATE: &str = r#"This is part {part} of {parts} of a longer source. Write comprehensive study notes for THIS PART ONLY.

Structure:
- Begin with one <h2> heading naming the topic of this part.

{format_rules}

Rules:
- Be exhaustive: cover every important point, definition, example and argument in this part.
- Do NOT write an introduction or conclusion for the whole source.
- {ellipsis_instruction}
- {language_instruction}

SOURCE PART:
{chunk}"#;
