//! Plugin name derivation
//!
//! A plugin's canonical name comes from its implementing type: the last
//! path segment of `std::any::type_name`, a trailing `Plugin` suffix
//! stripped, camel case split into lowercase underscore-separated words.
//! `HTTPClient` and `HttpClient` both become `http_client`.

/// Derive the canonical plugin name from an implementation type path.
pub fn plugin_name_from_type(type_ident: &str) -> String {
    let last = type_ident.rsplit("::").next().unwrap_or(type_ident);
    let stripped = last.strip_suffix("Plugin").unwrap_or(last);

    #[derive(Clone, Copy, PartialEq)]
    enum Case {
        None,
        Upper,
        Lower,
    }

    let mut out: Vec<char> = Vec::new();
    let mut lastcase = Case::None;
    for c in stripped.chars() {
        if c.is_uppercase() {
            if lastcase != Case::Upper {
                if !out.is_empty() && out.last() != Some(&'_') {
                    out.push('_');
                }
                lastcase = Case::Upper;
            }
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            // an acronym ran into a word: split before its last letter
            if lastcase == Case::Upper && out.len() > 1 && out[out.len() - 2] != '_' {
                out.insert(out.len() - 1, '_');
            }
            lastcase = Case::Lower;
            out.push(c);
        } else {
            lastcase = Case::None;
            out.push(c);
        }
    }
    out.into_iter().collect()
}

/// A derived name must start with a letter and continue with letters,
/// digits, or underscores.
pub fn is_valid_plugin_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
