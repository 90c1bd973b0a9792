//! Yes/no confirmation. Anything other than an explicit yes declines.

use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Yes,
    No,
    /// Input could not be read; treated as decline.
    Error,
}

impl ConfirmResult {
    pub fn is_confirmed(self) -> bool {
        self == ConfirmResult::Yes
    }
}

/// Maps a raw response to a decision: only `y` / `yes`, case-insensitive and
/// trimmed, confirm.
pub fn parse_confirmation(input: &str) -> ConfirmResult {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => ConfirmResult::Yes,
        _ => ConfirmResult::No,
    }
}

/// Writes `prompt` and reads one line of response.
///
/// The line must end in a newline. An answer cut short by end of input
/// declines, even if it reads `y`.
pub fn confirm(prompt: &str, input: &mut dyn BufRead, out: &mut dyn Write) -> ConfirmResult {
    if write!(out, "{}", prompt).and_then(|_| out.flush()).is_err() {
        return ConfirmResult::Error;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) if line.ends_with('\n') => parse_confirmation(&line),
        Ok(_) => ConfirmResult::No,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read confirmation");
            ConfirmResult::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_only_yes_confirms() {
        for input in ["y", "Y", "yes", "YES", "Yes", "  y  ", "yes\n", "\tYeS\r\n"] {
            assert_eq!(parse_confirmation(input), ConfirmResult::Yes, "{input:?}");
        }
    }

    #[test]
    fn test_everything_else_declines() {
        for input in [
            "", "\n", "   \n", "n", "N", "no", "No", "NO", "maybe", "1", "ye", "yess", "y es",
        ] {
            assert_eq!(parse_confirmation(input), ConfirmResult::No, "{input:?}");
        }
    }

    #[test]
    fn test_confirm_reads_one_line_and_prints_prompt() {
        let mut input = Cursor::new("yes\nno\n");
        let mut out = Vec::new();

        assert_eq!(
            confirm("Proceed? [y/N]: ", &mut input, &mut out),
            ConfirmResult::Yes
        );
        assert_eq!(String::from_utf8(out).unwrap(), "Proceed? [y/N]: ");
        assert_eq!(
            confirm("", &mut input, &mut Vec::new()),
            ConfirmResult::No
        );
    }

    #[test]
    fn test_confirm_eof_declines() {
        let mut input = Cursor::new("");
        assert_eq!(
            confirm("? ", &mut input, &mut Vec::new()),
            ConfirmResult::No
        );
    }

    #[test]
    fn test_confirm_unterminated_yes_declines() {
        for raw in ["y", "yes", "Y"] {
            let mut input = Cursor::new(raw);
            assert_eq!(
                confirm("? ", &mut input, &mut Vec::new()),
                ConfirmResult::No,
                "{raw:?}"
            );
        }
        let mut input = Cursor::new("y\r\n");
        assert_eq!(
            confirm("? ", &mut input, &mut Vec::new()),
            ConfirmResult::Yes
        );
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_confirm_read_error_is_error_and_declines() {
        let mut input = std::io::BufReader::new(FailingReader);
        let result = confirm("? ", &mut input, &mut Vec::new());
        assert_eq!(result, ConfirmResult::Error);
        assert!(!result.is_confirmed());
    }
}
