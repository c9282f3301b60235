//! Capitalization helpers

/// Upper-case the first character, lower-case the rest
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Sentence case for a machine-translated sentence
///
/// First word capitalized, every other word lower-cased. Words are
/// re-joined with single spaces.
#[must_use]
pub fn sentence_case(sentence: &str) -> String {
    let mut words = sentence.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };
    std::iter::once(capitalize(first))
        .chain(words.map(str::to_lowercase))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case every word but the first, which is left as is
///
/// Single-word sentences are returned unchanged.
#[must_use]
pub fn lowercase_tail(sentence: &str) -> String {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() <= 1 {
        return sentence.to_string();
    }
    std::iter::once(words[0].to_string())
        .chain(words[1..].iter().map(|w| w.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case variants of a user-defined term
///
/// The term as given, lower case, upper case, first letter capitalized, and
/// every word capitalized. Duplicates are removed, order is kept.
#[must_use]
pub fn case_variants(term: &str) -> Vec<String> {
    let title = term
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    let mut out: Vec<String> = Vec::with_capacity(5);
    for v in [
        term.to_string(),
        term.to_lowercase(),
        term.to_uppercase(),
        capitalize(term),
        title,
    ] {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("bONJOUR"), "Bonjour");
        assert_eq!(capitalize("été"), "Été");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn sentence_case_first_word_only() {
        assert_eq!(sentence_case("chiffre D'Affaires Total"), "Chiffre d'affaires total");
        assert_eq!(sentence_case("   "), "");
    }

    #[test]
    fn lowercase_tail_keeps_first_word() {
        assert_eq!(lowercase_tail("CA Par Mois"), "CA par mois");
        assert_eq!(lowercase_tail("Ventes"), "Ventes");
    }

    #[test]
    fn variants_are_unique() {
        let v = case_variants("total sales");
        assert_eq!(v, vec!["total sales", "TOTAL SALES", "Total sales", "Total Sales"]);
    }
}
