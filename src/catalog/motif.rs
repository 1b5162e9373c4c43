use crate::utils::Result;

/// Expands a repeat-structure expression into the literal sequence.
///
/// Tokens are whitespace-separated and written as `MOTIF[n]`, `(MOTIF)n` or a
/// bare `MOTIF` (once): `AGAT[11] AGGT` and `(AGAT)11 AGGT` both expand to
/// eleven `AGAT` followed by `AGGT`.
pub fn expand_motif(expression: &str) -> Result<String> {
    let mut sequence = String::new();
    for token in expression.split_whitespace() {
        let (motif, count) = parse_token(token)
            .ok_or_else(|| format!("Invalid repeat token '{}' in '{}'", token, expression))?;
        if motif.is_empty() || !motif.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid motif '{}' in '{}'", motif, expression));
        }
        sequence.push_str(&motif.to_ascii_uppercase().repeat(count));
    }
    Ok(sequence)
}

fn parse_token(token: &str) -> Option<(&str, usize)> {
    if let Some(body) = token.strip_suffix(']') {
        let (motif, count) = body.split_once('[')?;
        return Some((motif, count.parse().ok()?));
    }
    if let Some(body) = token.strip_prefix('(') {
        let (motif, count) = body.split_once(')')?;
        return Some((motif, count.parse().ok()?));
    }
    Some((token, 1))
}

/// A catalog sequence that ends in an ellipsis or is shorter than its own
/// repeat structure was cut off for display.
pub fn looks_truncated(sequence: &str, expanded: &str) -> bool {
    let sequence = sequence.trim_end();
    sequence.ends_with("...") || sequence.ends_with('…') || sequence.len() < expanded.len()
}

/// Sequence text shown for a catalog entry: the full sequence when it is
/// present and complete, the expanded repeat structure otherwise.
pub fn display_sequence(sequence: Option<&str>, repeat_structure: Option<&str>) -> Option<String> {
    let expanded = repeat_structure.and_then(|e| expand_motif(e).ok());
    match (sequence, expanded) {
        (Some(seq), Some(expanded)) if looks_truncated(seq, &expanded) => Some(expanded),
        (Some(seq), _) => Some(seq.to_string()),
        (None, expanded) => expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_bracket_notation() {
        assert_eq!(expand_motif("AGAT[3] AGGT").unwrap(), "AGATAGATAGATAGGT");
        assert_eq!(expand_motif("tcta[2]").unwrap(), "TCTATCTA");
    }

    #[test]
    fn test_expand_parenthesis_notation() {
        assert_eq!(expand_motif("(AATG)2 ATG (AATG)1").unwrap(), "AATGAATGATGAATG");
    }

    #[test]
    fn test_expand_zero_count() {
        assert_eq!(expand_motif("AGAT[0] TCTA").unwrap(), "TCTA");
    }

    #[test]
    fn test_expand_errors() {
        assert!(expand_motif("AGAT[x]").is_err());
        assert!(expand_motif("AGAT[3").is_err());
        assert!(expand_motif("[3]").is_err());
        assert!(expand_motif("AG1T").is_err());
    }

    #[test]
    fn test_display_prefers_complete_sequence() {
        assert_eq!(
            display_sequence(Some("TCTATCTA"), Some("TCTA[2]")),
            Some("TCTATCTA".to_string())
        );
        assert_eq!(
            display_sequence(Some("TCTATC..."), Some("TCTA[2]")),
            Some("TCTATCTA".to_string())
        );
        assert_eq!(
            display_sequence(Some("TCTA"), Some("TCTA[2]")),
            Some("TCTATCTA".to_string())
        );
        assert_eq!(display_sequence(None, Some("TCTA[1]")), Some("TCTA".to_string()));
        assert_eq!(display_sequence(Some("TC..."), None), Some("TC...".to_string()));
        assert_eq!(display_sequence(None, Some("TCTA[?]")), None);
        assert_eq!(display_sequence(None, None), None);
    }
}
