//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// Encode a relative path for use in a URL, keeping `/` separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a URL prefix and an already-encoded relative path
pub fn join_url(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path() {
        assert_eq!(
            encode_path("2023/Pasted image 1.png"),
            "2023/Pasted%20image%201.png"
        );
        assert_eq!(encode_path("a#b?.png"), "a%23b%3F.png");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("/attachments/", "/x.png"), "/attachments/x.png");
        assert_eq!(
            join_url("https://cdn.example.com", "x.png"),
            "https://cdn.example.com/x.png"
        );
    }
}
