//! MIME type guessing for callers that do not supply one.

/// Fallback for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess a MIME type from a file name's extension.
pub fn guess_from_name(name: &str) -> String {
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_from_name() {
        assert_eq!(guess_from_name("file.pdf"), "application/pdf");
        assert_eq!(guess_from_name("IMG.PNG"), "image/png");
        assert_eq!(guess_from_name("noext"), OCTET_STREAM);
        assert_eq!(guess_from_name(".bashrc"), OCTET_STREAM);
    }
}
