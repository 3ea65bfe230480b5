//! Product slugs: `<normalized-name>-<id>`.

use vitrina_core::{DomainError, DomainResult, ProductId};

/// Strip the accent from a Latin letter. Anything else is returned as is.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ō' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
        'ñ' => 'n',
        'ç' | 'ć' | 'č' => 'c',
        'ý' | 'ÿ' => 'y',
        'š' | 'ś' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        'ł' => 'l',
        _ => c,
    }
}

/// Lowercase, drop accents, collapse every run of other characters into a
/// single hyphen and trim hyphens from both ends.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars().flat_map(char::to_lowercase).map(fold_diacritic) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    out
}

pub fn generate_product_slug(name: &str, id: ProductId) -> String {
    let name = slugify(name);
    if name.is_empty() {
        id.to_string()
    } else {
        format!("{name}-{id}")
    }
}

/// The id is the token after the last hyphen.
pub fn extract_id_from_slug(slug: &str) -> DomainResult<ProductId> {
    let token = slug.rsplit('-').next().unwrap_or(slug);
    token
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(ProductId::new)
        .ok_or_else(|| DomainError::invalid_id("Slug de producto inválido"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slug_is_normalized_name_plus_id() {
        assert_eq!(generate_product_slug("Camiseta Roja", ProductId::new(42)), "camiseta-roja-42");
        assert_eq!(generate_product_slug("  Pantalón  Niño (talla única)! ", ProductId::new(7)), "pantalon-nino-talla-unica-7");
        assert_eq!(generate_product_slug("¡¡!!", ProductId::new(3)), "3");
    }

    #[test]
    fn id_is_the_last_token() {
        assert_eq!(extract_id_from_slug("camiseta-roja-42").unwrap(), ProductId::new(42));
        assert_eq!(extract_id_from_slug("42").unwrap(), ProductId::new(42));
        let err = extract_id_from_slug("no-id-here-xyz").unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!(extract_id_from_slug("camiseta-").is_err());
        assert!(extract_id_from_slug("camiseta-0").is_err());
    }

    proptest! {
        #[test]
        fn slug_round_trips_the_id(name in "\\PC{0,40}", id in 1i64..i64::MAX) {
            let slug = generate_product_slug(&name, ProductId::new(id));
            prop_assert_eq!(extract_id_from_slug(&slug).unwrap(), ProductId::new(id));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
