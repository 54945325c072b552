use spotdash::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Should be deterministic
    assert_eq!(challenge, generate_code_challenge(verifier));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // URL safe base64 without padding
    assert!(!challenge.contains('='));
    assert!(!challenge.contains('+'));
    assert!(!challenge.contains('/'));
}

#[test]
fn test_basic_auth() {
    assert_eq!(basic_auth("id", "secret"), "Basic aWQ6c2VjcmV0");
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("indie rock"), "Indie Rock");
    assert_eq!(title_case("HIP HOP"), "Hip Hop");
    assert_eq!(title_case("r&b"), "R&B");
    assert_eq!(title_case("lo-fi beats"), "Lo-Fi Beats");
    assert_eq!(title_case("k-pop"), "K-Pop");
    assert_eq!(title_case(""), "");
}

#[test]
fn test_strip_code_fences() {
    assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
    assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    assert_eq!(strip_code_fences("OK"), "OK");
}

#[test]
fn test_truncate_chars() {
    assert_eq!(truncate_chars("hello world", 5), "hello");
    assert_eq!(truncate_chars("short", 50), "short");
    assert_eq!(truncate_chars("héllo", 2), "hé");
}

#[test]
fn test_parse_hours() {
    assert_eq!(parse_hours("6,18"), Ok(vec![6, 18]));
    assert_eq!(parse_hours(" 18, 6 ,6"), Ok(vec![6, 18]));
    assert_eq!(parse_hours(""), Ok(vec![]));
    assert_eq!(parse_hours("0,23"), Ok(vec![0, 23]));
}

#[test]
fn test_parse_hours_rejects_invalid_input() {
    assert!(parse_hours("24").is_err());
    assert!(parse_hours("6,,18").is_err());
    assert!(parse_hours("six").is_err());
    assert!(parse_hours("-1").is_err());
}
