//! Player-name normalization shared by the index and the resolver.

/// Generational suffixes dropped from names before comparison.
pub const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Normalize a display name into a comparable, space-separated form.
///
/// "A.J. Brown" -> "aj brown", "Odell Beckham Jr." -> "odell beckham",
/// "J K Dobbins" -> "jk dobbins", "Amon-Ra St. Brown" -> "amon ra st brown".
pub fn normalize_name(raw: &str) -> String {
    tokens(raw).join(" ")
}

/// Normalized name tokens, in order.
pub fn tokens(raw: &str) -> Vec<String> {
    let lowered: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '`'))
        .map(|c| if matches!(c, ',' | '-' | '_' | '/') { ' ' } else { c })
        .collect();

    let mut parts: Vec<String> = Vec::new();
    for word in lowered.split_whitespace() {
        if word.contains('.') {
            let segments: Vec<&str> = word.split('.').filter(|s| !s.is_empty()).collect();
            if segments.iter().all(|s| s.chars().count() == 1) {
                // Dotted initials collapse: "a.j." -> "aj"
                parts.push(segments.concat());
            } else {
                parts.extend(segments.iter().map(|s| s.to_string()));
            }
        } else {
            parts.push(word.to_string());
        }
    }

    let cleaned: Vec<String> = parts
        .into_iter()
        .map(|p| p.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|p| !p.is_empty())
        .collect();

    let merged = merge_single_letters(cleaned);

    merged
        .into_iter()
        .enumerate()
        .filter(|(i, t)| *i == 0 || !SUFFIXES.contains(&t.as_str()))
        .map(|(_, t)| t)
        .collect()
}

/// Consecutive single-letter tokens merge into one: ["j", "k", "dobbins"] -> ["jk", "dobbins"].
fn merge_single_letters(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut run = String::new();
    let mut run_len = 0;

    for token in tokens {
        if token.chars().count() == 1 {
            run.push_str(&token);
            run_len += 1;
            continue;
        }
        if run_len > 0 {
            out.push(std::mem::take(&mut run));
            run_len = 0;
        }
        out.push(token);
    }
    if run_len > 0 {
        out.push(run);
    }
    out
}

/// Alternate forms a pool player may be referred to by.
///
/// Built from the pool's first/last name split: first initial + last,
/// concatenated initials of a multi-word first name + last, and the first
/// name with single-letter middle parts removed + last.
pub fn variant_forms(first: &str, last: &str) -> Vec<String> {
    let first_tokens = tokens(first);
    let last_norm = normalize_name(last);
    if first_tokens.is_empty() || last_norm.is_empty() {
        return Vec::new();
    }

    let mut forms = Vec::new();
    let mut push = |form: String| {
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    };

    if let Some(initial) = first_tokens[0].chars().next() {
        push(format!("{} {}", initial, last_norm));
    }

    let raw_first_words: Vec<&str> = first.split_whitespace().collect();
    if raw_first_words.len() > 1 {
        let initials: String = raw_first_words
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .flat_map(char::to_lowercase)
            .collect();
        push(format!("{} {}", initials, last_norm));
    }

    let without_middle: Vec<&str> = raw_first_words
        .iter()
        .copied()
        .filter(|w| w.trim_matches('.').chars().count() > 1)
        .collect();
    if !without_middle.is_empty() && without_middle.len() < raw_first_words.len() {
        push(normalize_name(&format!("{} {}", without_middle.join(" "), last)));
    }

    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dotted_initials() {
        assert_eq!(normalize_name("A.J. Brown"), "aj brown");
        assert_eq!(normalize_name("C. McCaffrey"), "c mccaffrey");
        assert_eq!(normalize_name("C.McCaffrey"), "c mccaffrey");
        assert_eq!(normalize_name("D.K. Metcalf"), "dk metcalf");
    }

    #[test]
    fn test_normalize_suffixes_and_punctuation() {
        assert_eq!(normalize_name("Odell Beckham Jr."), "odell beckham");
        assert_eq!(normalize_name("Marvin Harrison Jr"), "marvin harrison");
        assert_eq!(normalize_name("Michael Pittman, Jr."), "michael pittman");
        assert_eq!(normalize_name("Kenneth Walker III"), "kenneth walker");
        assert_eq!(normalize_name("Ja'Marr Chase"), "jamarr chase");
        assert_eq!(normalize_name("Amon-Ra St. Brown"), "amon ra st brown");
    }

    #[test]
    fn test_normalize_merges_single_letters() {
        assert_eq!(normalize_name("J K Dobbins"), "jk dobbins");
        assert_eq!(normalize_name("J.K. Dobbins"), "jk dobbins");
    }

    #[test]
    fn test_normalize_keeps_leading_suffix_like_token() {
        // A lone "V" at the front is a name, not a suffix.
        assert_eq!(tokens("V Jefferson"), vec!["v", "jefferson"]);
    }

    #[test]
    fn test_normalize_whitespace_and_empty() {
        assert_eq!(normalize_name("  Josh   Allen  "), "josh allen");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("..."), "");
    }

    #[test]
    fn test_variant_forms() {
        let forms = variant_forms("Christian", "McCaffrey");
        assert_eq!(forms, vec!["c mccaffrey"]);

        let forms = variant_forms("J. K.", "Dobbins");
        assert!(forms.contains(&"j dobbins".to_string()));
        assert!(forms.contains(&"jk dobbins".to_string()));

        let forms = variant_forms("Patrick L", "Mahomes");
        assert!(forms.contains(&"p mahomes".to_string()));
        assert!(forms.contains(&"pl mahomes".to_string()));
        assert!(forms.contains(&"patrick mahomes".to_string()));
    }

    #[test]
    fn test_variant_forms_missing_parts() {
        assert!(variant_forms("", "Dobbins").is_empty());
        assert!(variant_forms("Josh", "").is_empty());
    }
}
