//! In-memory fakes for the pipeline's trait seams, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::flashcards::Flashcard;
use crate::generation::prompts::{FLASHCARD_SYSTEM, NOTE_SYSTEM, TITLE_SYSTEM};
use crate::generation::store::{GenerationStore, Reservation};
use crate::llm_client::{LanguageModel, LlmError};
use crate::quota::rate_limit::{RateDecision, RateLimiter};
use crate::sources::normalize::collapse_whitespace;
use crate::sources::{CleanedText, ExtractError, Source, SourceExtractor};

pub const NOTE_HTML: &str = "<h2>Cells</h2><p>Cells are the basic unit of life.</p>";

pub fn card(question: &str) -> Flashcard {
    Flashcard {
        question: question.to_string(),
        answer: format!("The answer to {question} is stated in the text."),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
}

/// Answers by system prompt: a fixed title, `cards_per_call` flashcards, or note HTML.
pub struct FakeModel {
    calls: Mutex<Vec<RecordedCall>>,
    title: String,
    note: Option<String>,
    cards_per_call: usize,
    fail_flashcards: bool,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            title: "Title: Cell Biology".to_string(),
            note: None,
            cards_per_call: 10,
            fail_flashcards: false,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn failing_flashcards(mut self) -> Self {
        self.fail_flashcards = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, system: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.system == system)
            .count()
    }

    pub fn title_calls(&self) -> usize {
        self.count(TITLE_SYSTEM)
    }

    pub fn flashcard_calls(&self) -> usize {
        self.count(FLASHCARD_SYSTEM)
    }

    pub fn note_calls(&self) -> usize {
        self.count(NOTE_SYSTEM)
    }

    fn flashcards_json(&self, call: usize) -> String {
        let cards: Vec<Flashcard> = (0..self.cards_per_call)
            .map(|i| card(&format!("call {call} question {i}")))
            .collect();
        serde_json::json!({ "flashcards": cards }).to_string()
    }

    fn note_html(&self, prompt: &str) -> String {
        if let Some(note) = &self.note {
            return note.clone();
        }
        match prompt
            .strip_prefix("This is part ")
            .and_then(|rest| rest.split_whitespace().next())
        {
            Some(part) => format!("```html\n<h2>Part {part}</h2>\n```"),
            None => format!("```html\n{NOTE_HTML}\n```"),
        }
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                system: system.to_string(),
                prompt: prompt.to_string(),
            });
            calls.len()
        };
        // Yield so concurrent calls genuinely interleave.
        tokio::task::yield_now().await;

        match system {
            TITLE_SYSTEM => Ok(self.title.clone()),
            FLASHCARD_SYSTEM if self.fail_flashcards => Err(LlmError::Api {
                status: 500,
                message: "overloaded".to_string(),
            }),
            FLASHCARD_SYSTEM => Ok(self.flashcards_json(call)),
            NOTE_SYSTEM => Ok(self.note_html(prompt)),
            other => panic!("unexpected system prompt: {other}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Source extractor
// ────────────────────────────────────────────────────────────────────────────

pub struct FakeExtractor {
    calls: AtomicUsize,
    fixed: Option<CleanedText>,
}

impl FakeExtractor {
    /// Text sources pass through; every other source is empty.
    pub fn passthrough() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fixed: None,
        }
    }

    pub fn returning(text: CleanedText) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fixed: Some(text),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceExtractor for FakeExtractor {
    async fn extract(&self, source: &Source) -> Result<CleanedText, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(text) = &self.fixed {
            return Ok(text.clone());
        }
        match source {
            Source::Text { content } => Ok(CleanedText::new(collapse_whitespace(content))),
            _ => Err(ExtractError::EmptyContent("source")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rate limiter
// ────────────────────────────────────────────────────────────────────────────

pub struct FakeRateLimiter {
    deny: Option<String>,
    charged: Mutex<Vec<(String, u32)>>,
}

impl FakeRateLimiter {
    pub fn allowing() -> Self {
        Self {
            deny: None,
            charged: Mutex::new(Vec::new()),
        }
    }

    pub fn denying(reason: &str) -> Self {
        Self {
            deny: Some(reason.to_string()),
            charged: Mutex::new(Vec::new()),
        }
    }

    pub fn charged(&self) -> Vec<(String, u32)> {
        self.charged.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimiter for FakeRateLimiter {
    async fn check(&self, key: &str, cost: u32) -> Result<RateDecision, AppError> {
        self.charged.lock().unwrap().push((key.to_string(), cost));
        Ok(match &self.deny {
            Some(reason) => RateDecision::Denied {
                reason: reason.clone(),
            },
            None => RateDecision::Allowed { remaining: 100 },
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredDeck {
    pub owner_id: Uuid,
    pub title: String,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone)]
pub struct StoredNote {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub source: String,
}

#[derive(Default)]
struct MemoryState {
    /// user id → (allowance, used)
    users: HashMap<Uuid, (i32, i32)>,
    decks: HashMap<Uuid, StoredDeck>,
    notes: HashMap<Uuid, StoredNote>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, allowance: i32, used: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.insert(id, (allowance, used));
        id
    }

    pub fn used(&self, user_id: Uuid) -> i32 {
        self.state.lock().unwrap().users[&user_id].1
    }

    pub fn deck(&self, id: Uuid) -> Option<StoredDeck> {
        self.state.lock().unwrap().decks.get(&id).cloned()
    }

    pub fn note(&self, id: Uuid) -> Option<StoredNote> {
        self.state.lock().unwrap().notes.get(&id).cloned()
    }

    pub fn artifact_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.decks.len() + state.notes.len()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn reserve_generation(&self, user_id: Uuid) -> Result<Reservation, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(match state.users.get_mut(&user_id) {
            Some((allowance, used)) if *used < *allowance => {
                *used += 1;
                Reservation::Reserved {
                    used: *used,
                    allowance: *allowance,
                }
            }
            Some((allowance, used)) => Reservation::Exhausted {
                used: *used,
                allowance: *allowance,
            },
            None => Reservation::UnknownUser,
        })
    }

    async fn release_generation(&self, user_id: Uuid) -> Result<(), AppError> {
        if let Some((_, used)) = self.state.lock().unwrap().users.get_mut(&user_id) {
            *used = (*used - 1).max(0);
        }
        Ok(())
    }

    async fn create_deck(
        &self,
        owner_id: Uuid,
        title: &str,
        cards: &[Flashcard],
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().decks.insert(
            id,
            StoredDeck {
                owner_id,
                title: title.to_string(),
                cards: cards.to_vec(),
            },
        );
        Ok(id)
    }

    async fn create_note(
        &self,
        owner_id: Uuid,
        title: &str,
        content: &str,
        source: &str,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().notes.insert(
            id,
            StoredNote {
                owner_id,
                title: title.to_string(),
                content: content.to_string(),
                source: source.to_string(),
            },
        );
        Ok(id)
    }
}
