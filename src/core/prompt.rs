use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::message::ChatTurn;

/// Used when a generation request contains no extractable subject at all.
pub const DEFAULT_PROMPT: &str = "abstract art";

/// Explicit request phrasings with a captured subject, tried in order.
static EXPLICIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "draw an ascii picture of a boat", "make me an image of a castle"
        r"(?i)\b(?:generate|create|make|draw)\s+(?:me\s+)?(?:(?:a|an|some)\s+)?(?:ascii\s+)?(?:art|image|picture)\s+(?:of|for)\s+(.+)",
        // "ascii art of a boat", "ascii of a boat"
        r"(?i)\bascii\s+(?:art\s+)?(?:of|for)\s+(.+)",
        // bare "generate X" / "draw me X"; these verbs never mean plain chat
        r"(?i)\b(?:generate|draw)\s+(?:me\s+)?(.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static POLITENESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\s*(?:can you|could you|will you|please)[\s,]+)+").unwrap()
});

static VERB_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:generate|create|make|draw|show|give)\s+(?:me\s+)?").unwrap()
});

static NOUN_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:a|an|the|some)\s+)?(?:ascii\s+)?(?:art|image|picture)\b\s*(?:of|for)?\s*")
        .unwrap()
});

static ARTICLE_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:a|an|the)\s+").unwrap());

static KEYWORD_SWEEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:can you|could you|will you|please|generate|create|make|draw|show|give|me|ascii|art|image|picture|of|for)\b",
    )
    .unwrap()
});

static EDIT_VERB_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:make|change|modify|edit|update|adjust|alter)\s+(?:(?:it|this|that)\b\s*)?")
        .unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Match an explicit "draw me X" style request and return its subject.
/// `None` means the turn phrases no unmistakable request, which the intent
/// rules also use to keep comparative edits ("make a bigger dragon") from
/// being misread as fresh requests.
pub fn parse_explicit_request(text: &str) -> Option<String> {
    for pattern in EXPLICIT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(subject) = caps.get(1) {
                let subject = tidy(subject.as_str());
                if !subject.is_empty() {
                    return Some(subject);
                }
            }
        }
    }
    None
}

/// Pull an image prompt out of a new-generation turn. Falls through three
/// stages: explicit phrasing, head-stripping of request scaffolding, then a
/// keyword sweep, ending at [`DEFAULT_PROMPT`] if nothing survives.
pub fn new_generation_prompt(text: &str) -> String {
    if let Some(subject) = parse_explicit_request(text) {
        return subject;
    }

    let without_politeness = POLITENESS.replace(text, "");
    let without_verb = VERB_HEAD.replace(&without_politeness, "");
    let without_noun = NOUN_HEAD.replace(&without_verb, "");
    let stripped = ARTICLE_HEAD.replace(&without_noun, "");
    let candidate = tidy(&stripped);
    if stripped != text && candidate.chars().count() >= 3 {
        return candidate;
    }

    let swept = tidy(&KEYWORD_SWEEP.replace_all(text, " "));
    let swept = tidy(&ARTICLE_HEAD.replace(&swept, ""));
    if swept.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        swept
    }
}

/// Build the rewrite exchange sent to the text backend for an edit turn.
pub fn edit_exchange(prior: &str, request: &str, user_name: Option<&str>) -> Vec<ChatTurn> {
    let mut system = String::from(
        "You rewrite image-generation prompts for an ASCII art studio. \
         Reply with exactly one replacement prompt: a complete scene description \
         incorporating the requested change, not a diff and not commentary.",
    );
    if let Some(name) = user_name {
        system.push_str(&format!(" The user's name is {name}."));
    }
    vec![
        ChatTurn::system(system),
        ChatTurn::user(format!(
            "Previous prompt: {prior}\nRequested change: {request}"
        )),
    ]
}

/// Tidy a backend reply into a usable prompt: drop a wrapping quote pair,
/// keep only the first line, trim. Replies shorter than 3 characters are
/// rejected so the caller can fall back deterministically.
pub fn clean_chat_reply(reply: &str) -> Option<String> {
    let mut text = reply.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = &text[1..text.len() - 1];
            break;
        }
    }
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.chars().count() < 3 {
        None
    } else {
        Some(first_line.to_string())
    }
}

/// The no-backend edit path: strip the edit phrasing from the request and
/// append whatever is left to the prior prompt. "make it taller" against
/// "a pine tree" becomes "a pine tree, taller".
pub fn fallback_edit_prompt(prior: &str, request: &str) -> String {
    let without_politeness = POLITENESS.replace(request, "");
    let leftover = tidy(&EDIT_VERB_HEAD.replace(&without_politeness, ""));
    if leftover.is_empty() {
        prior.to_string()
    } else {
        format!("{prior}, {leftover}")
    }
}

fn tidy(text: &str) -> String {
    WHITESPACE
        .replace_all(text, " ")
        .trim()
        .trim_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';' | ':'))
        .trim()
        .to_string()
}
