//! Address Normalization
//!
//! User-typed addresses often omit the scheme. Stored step URLs are taken
//! as they are; only typed input goes through [`normalize_address`].

/// Scheme assumed when the user leaves it out.
pub const DEFAULT_SCHEME: &str = "https://";

/// Turns user input into a navigation target.
///
/// Surrounding whitespace is trimmed. Input starting with `http://` or
/// `https://` (any case) is kept as is; anything else gets `https://`
/// prepended. Blank input yields `None`.
///
/// # Example
///
/// ```
/// use waymark::navigation::normalize_address;
///
/// assert_eq!(normalize_address("example.com").as_deref(), Some("https://example.com"));
/// assert_eq!(normalize_address("http://example.com").as_deref(), Some("http://example.com"));
/// assert_eq!(normalize_address("   "), None);
/// ```
pub fn normalize_address(input: &str) -> Option<String> {
    let address = input.trim();
    if address.is_empty() {
        return None;
    }

    if has_web_scheme(address) {
        Some(address.to_string())
    } else {
        Some(format!("{}{}", DEFAULT_SCHEME, address))
    }
}

fn has_web_scheme(address: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        address
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
