use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// `Basic` authorization value for the client credentials.
pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

/// Upper-cases the first letter of every word, lower-cases the rest.
///
/// A word starts after any non-alphabetic character, so `"r&b"` becomes
/// `"R&B"` and `"k-pop"` becomes `"K-Pop"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````) from a model answer.
pub fn strip_code_fences(content: &str) -> &str {
    let mut content = content.trim();
    if content.starts_with("```") {
        content = match content.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };
    }
    if content.ends_with("```") {
        content = match content.rsplit_once('\n') {
            Some((rest, _)) => rest,
            None => "",
        };
    }
    content.trim()
}

/// Shortens a message to at most `max` characters, for log lines.
pub fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Parses a comma separated list of hours, e.g. `"6,18"`.
pub fn parse_hours(value: &str) -> Result<Vec<u32>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut hours = Vec::new();
    for segment in trimmed.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(format!("empty segment in hour list '{}'", value));
        }
        match segment.parse::<u32>() {
            Ok(hour) if hour < 24 => hours.push(hour),
            _ => return Err(format!("invalid hour '{}', expected 0-23", segment)),
        }
    }
    hours.sort_unstable();
    hours.dedup();
    Ok(hours)
}
