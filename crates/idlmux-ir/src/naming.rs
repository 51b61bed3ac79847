/// `UserProfile` -> `userProfile`
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `string` -> `String`
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("TextMessage"), "textMessage");
        assert_eq!(lower_first("URL"), "uRL");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn test_upper_first() {
        assert_eq!(upper_first("string"), "String");
        assert_eq!(upper_first("MapWrapper0"), "MapWrapper0");
        assert_eq!(upper_first(""), "");
    }
}
