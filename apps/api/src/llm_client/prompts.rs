// Shared prompt fragments. Each generator keeps its own prompts alongside it
// (see generation/prompts.rs); only cross-cutting rules live here.

/// Keeps output in the language of the source material.
pub const SOURCE_LANGUAGE_INSTRUCTION: &str = "\
    Detect the language of the source text and write your entire output in that language. \
    Never mention, name, or comment on the language itself.";

/// Every generated sentence must be complete.
pub const NO_ELLIPSIS_INSTRUCTION: &str = "\
    Never use ellipses (\"...\" or \"…\") and never truncate a sentence. \
    Every sentence must be complete.";
