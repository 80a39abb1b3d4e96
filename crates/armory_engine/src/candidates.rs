use crate::types::VariantTag;

const SHEET_SUFFIX: &str = "-sheet";

/// Ordered filename candidates for `name` rendered with `variant_suffix`.
///
/// Callers probe in order and accept the first hit, so exact matches come
/// before the casing and sprite-sheet fallbacks.
pub fn generate_candidates(name: &str, variant_suffix: &str) -> Vec<String> {
    let base = base_filename(name);
    let lower_last = lower_last_word(&base);
    let mut candidates = Vec::with_capacity(8);

    candidates.push(format!("{base}{variant_suffix}.png"));
    if variant_suffix.is_empty() {
        candidates.push(format!("{base}_.png"));
    } else {
        candidates.push(format!("{base}_{variant_suffix}.png"));
    }

    if let Some(lower) = lower_last.as_deref() {
        candidates.push(format!("{lower}{variant_suffix}.png"));
        if variant_suffix.is_empty() {
            candidates.push(format!("{lower}_.png"));
        }
    }

    if variant_suffix == VariantTag::A.suffix() || variant_suffix.is_empty() {
        candidates.push(format!("{base}{SHEET_SUFFIX}{variant_suffix}.png"));
        if let Some(lower) = lower_last.as_deref() {
            candidates.push(format!("{lower}{SHEET_SUFFIX}{variant_suffix}.png"));
        }
    }

    let all_lower = format!("{}{variant_suffix}.png", base.to_lowercase());
    if !candidates.contains(&all_lower) {
        candidates.push(all_lower);
    }

    candidates
}

/// Candidates for a [`VariantTag`].
pub fn candidates_for(name: &str, tag: VariantTag) -> Vec<String> {
    generate_candidates(name, tag.suffix())
}

/// `Black Vein Syndicate` -> `Black_Vein_Syndicate.png`.
pub fn manufacturer_icon_filename(manufacturer: &str) -> String {
    let mut out = String::with_capacity(manufacturer.len() + 4);
    let mut in_whitespace = false;
    for c in manufacturer.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if is_word_char(c) {
            out.push(c);
        }
    }
    out.push_str(".png");
    out
}

/// Folds `.`, `-` and whitespace runs to `_` and drops everything outside
/// `[A-Za-z0-9_]`. Quotes are removed first.
pub(crate) fn base_filename(name: &str) -> String {
    let mut base = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars().filter(|c| !matches!(c, '"' | '\'')) {
        if c.is_whitespace() {
            if !in_whitespace {
                base.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match c {
            '.' | '-' => base.push('_'),
            c if is_word_char(c) => base.push(c),
            _ => {}
        }
    }
    base
}

/// `Arcline_Shock_Baton` -> `Arcline_Shock_baton`; `None` for single words.
fn lower_last_word(base: &str) -> Option<String> {
    let (head, last) = base.rsplit_once('_')?;
    Some(format!("{head}_{}", last.to_lowercase()))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
