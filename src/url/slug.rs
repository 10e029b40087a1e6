/// Converts a category slug into a human-readable label
///
/// Used when category discovery finds a link but no display text: a trailing
/// all-numeric id segment is dropped, `-`/`_` separators become spaces, and
/// each word is capitalized.
///
/// # Examples
///
/// ```
/// use vitrina::url::humanize_slug;
///
/// assert_eq!(humanize_slug("belleza-1"), "Belleza");
/// assert_eq!(humanize_slug("audio_profesional"), "Audio Profesional");
/// ```
pub fn humanize_slug(slug: &str) -> String {
    let mut parts: Vec<&str> = slug
        .trim_matches('/')
        .split(['-', '_'])
        .filter(|p| !p.is_empty())
        .collect();

    // A trailing numeric segment is a database id, not part of the name
    if parts.len() > 1
        && parts
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()))
    {
        parts.pop();
    }

    parts
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
