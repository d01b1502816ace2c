use dialoguer::Confirm;
use std::io::{self, BufRead, IsTerminal};

/// Blocks until the user answers `question`.
///
/// On a terminal this is a dialoguer yes/no prompt defaulting to no. When
/// stdin is piped, one line is read and only `y` or `Y` counts as yes.
pub fn ask(question: &str) -> io::Result<bool> {
    if io::stdin().is_terminal() && console::user_attended_stderr() {
        return Confirm::new()
            .with_prompt(question)
            .default(false)
            .wait_for_newline(true)
            .interact_opt()
            .map(|answer| answer.unwrap_or(false))
            .map_err(io::Error::other);
    }

    eprint!("{question} (Y/N): ");
    read_answer(io::stdin().lock())
}

pub fn read_answer(mut input: impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}
