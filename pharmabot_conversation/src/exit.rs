/// Inputs that end the interactive loop.
pub const EXIT_TOKENS: [&str; 2] = ["sair", "exit"];

/// True when `input` is an exit token, ignoring case and surrounding
/// whitespace.
#[must_use]
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_TOKENS
        .iter()
        .any(|token| input.eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_tokens_any_casing() {
        for input in ["sair", "SAIR", "Sair", "exit", "EXIT", "eXiT", "  sair\n"] {
            assert!(is_exit_command(input), "{input:?} should exit");
        }
    }

    #[test]
    fn other_text_does_not_exit() {
        for input in ["", "quit", "sair agora", "exit()", "saír"] {
            assert!(!is_exit_command(input), "{input:?} should not exit");
        }
    }
}
