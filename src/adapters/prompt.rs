use crate::domain::ports::ConfirmPrompt;
use std::io::{BufRead, Write};

/// Asks on the terminal; anything but `y`/`yes` declines.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn terminal() -> Self {
        Self {
            input: std::io::stdin().lock(),
            output: std::io::stderr(),
        }
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmPrompt for StdinPrompt<R, W> {
    fn confirm(&mut self, count: usize) -> bool {
        let noun = if count == 1 { "order" } else { "orders" };
        if write!(self.output, "Delete {} {}? [y/N] ", count, noun)
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// `--yes`: every deletion is pre-approved.
pub struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&mut self, count: usize) -> bool {
        tracing::debug!("Auto-confirming deletion of {} records", count);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_accepts_yes() {
        let mut out = Vec::new();
        let mut prompt = StdinPrompt::new("Yes\n".as_bytes(), &mut out);
        assert!(prompt.confirm(3));
        assert_eq!(String::from_utf8(out).unwrap(), "Delete 3 orders? [y/N] ");
    }

    #[test]
    fn test_prompt_defaults_to_no() {
        let mut prompt = StdinPrompt::new("\n".as_bytes(), Vec::new());
        assert!(!prompt.confirm(1));

        let mut prompt = StdinPrompt::new("".as_bytes(), Vec::new());
        assert!(!prompt.confirm(1));
    }
}
