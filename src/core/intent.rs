use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::prompt;

/// What the user is asking for in a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Plain chat, no artwork involved.
    Conversational,
    /// Start a fresh piece of art from this turn.
    NewGeneration,
    /// Modify the most recently generated piece.
    EditRequest,
}

/// An edit verb aimed at a pronoun or "the <thing>" object: "make it taller",
/// "change the tree", "update this".
static EDIT_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:make|change|modify|edit|update|adjust|alter)\s+(?:it|this|that|the\s+\w+)\b")
        .unwrap()
});

/// Turns that open with add/remove read as edits: "add a moon", "remove the sun".
static ADD_REMOVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:add|remove)\b").unwrap());

static COMPARATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:taller|shorter|wider|bigger|smaller|larger|thicker|thinner|darker|lighter|brighter|colorful|better|more|less|different)\b",
    )
    .unwrap()
});

/// Any word that signals an art request. "make" and "create" are in here even
/// though they are ambiguous; the edit rules run first and claim them when a
/// prior prompt exists.
static GENERATION_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:generate|create|make|draw|ascii|art|image|picture)\b").unwrap()
});

/// Keywords that always mean a fresh generation, never an edit. Excludes
/// "make"/"create" so that "make a bigger dragon" still counts as an edit
/// of the previous piece.
static UNAMBIGUOUS_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:generate|draw|ascii|art|image|picture)\b").unwrap()
});

struct Rule {
    name: &'static str,
    intent: Intent,
    matches: fn(&str, bool) -> bool,
}

fn edit_verb_rule(text: &str, has_prior: bool) -> bool {
    has_prior && EDIT_VERB.is_match(text)
}

fn add_remove_rule(text: &str, has_prior: bool) -> bool {
    has_prior && ADD_REMOVE.is_match(text)
}

fn comparative_rule(text: &str, has_prior: bool) -> bool {
    has_prior
        && COMPARATIVE.is_match(text)
        && !UNAMBIGUOUS_KEYWORD.is_match(text)
        && prompt::parse_explicit_request(text).is_none()
}

fn generation_rule(text: &str, _has_prior: bool) -> bool {
    GENERATION_KEYWORD.is_match(text)
}

/// Evaluated top to bottom; the first matching rule decides. Extending the
/// classifier means appending a rule, not editing branch logic.
static RULES: &[Rule] = &[
    Rule {
        name: "edit-verb",
        intent: Intent::EditRequest,
        matches: edit_verb_rule,
    },
    Rule {
        name: "add-remove",
        intent: Intent::EditRequest,
        matches: add_remove_rule,
    },
    Rule {
        name: "comparative",
        intent: Intent::EditRequest,
        matches: comparative_rule,
    },
    Rule {
        name: "generation-keyword",
        intent: Intent::NewGeneration,
        matches: generation_rule,
    },
];

/// Classify one user turn. `has_prior_prompt` is whether the session already
/// holds a last generation prompt; without one an edit has nothing to target,
/// so the edit rules never fire.
pub fn classify(text: &str, has_prior_prompt: bool) -> Intent {
    for rule in RULES {
        if (rule.matches)(text, has_prior_prompt) {
            tracing::debug!(rule = rule.name, "intent matched");
            return rule.intent;
        }
    }
    Intent::Conversational
}
