//! Slug derivation for display names.

/// ASCII spelling of a lowercase Latin letter with a diacritic, ligature or
/// stroke. Letters outside this table have no ASCII form.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĳ' => "ij",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Derive a slug from a display name.
///
/// The name is lowercased and Latin letters with diacritics are folded to
/// ASCII (`"Crème"` becomes `"creme"`). Every run of remaining characters
/// that are not ASCII letters or digits collapses to a single `_`, and
/// leading and trailing separators are dropped, so `"  Ready for Review! "`
/// becomes `"ready_for_review"`. Slugs are always ASCII.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let mut buf = [0; 4];
        let piece = if c.is_ascii_alphanumeric() {
            Some(&*c.encode_utf8(&mut buf))
        } else {
            fold_latin(c)
        };

        match piece {
            Some(piece) => {
                if pending_sep && !slug.is_empty() {
                    slug.push('_');
                }
                pending_sep = false;
                slug.push_str(piece);
            }
            None => pending_sep = true,
        }
    }

    slug
}

/// Slug of a file name with its extension removed.
///
/// Everything from the first `.` on is dropped before slugifying. A name
/// without a `.` is slugified whole.
#[must_use]
pub fn slugify_stem(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    slugify(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Card Name"), "card_name");
        assert_eq!(slugify("To Do"), "to_do");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Fruits -- Grown  in   Quebec"), "fruits_grown_in_quebec");
        assert_eq!(slugify("  Ready for Review! "), "ready_for_review");
    }

    #[test]
    fn test_slugify_folds_latin_diacritics() {
        assert_eq!(slugify("Crème Brûlée"), "creme_brulee");
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("ÉQUIPE Æther"), "equipe_aether");
    }

    #[test]
    fn test_slugify_drops_other_scripts() {
        assert_eq!(slugify("東京 Office"), "office");
        assert_eq!(slugify("Déjà vu 🎉 2024"), "deja_vu_2024");
        assert!(slugify("Ünïcödé Ñame").is_ascii());
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_stem_strips_extension() {
        assert_eq!(slugify_stem("Hero Image.png"), "hero_image");
        assert_eq!(slugify_stem("archive.tar.gz"), "archive");
    }

    #[test]
    fn test_slugify_stem_without_extension() {
        assert_eq!(slugify_stem("Mockup Final"), "mockup_final");
    }
}
