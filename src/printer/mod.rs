//! Printers for one-shot runs: plain text or colored sections (owo-colors).

use owo_colors::OwoColorize;

use crate::execution::{Section, SessionResult, NO_OUTPUT};

pub struct ResultPrinter {
    pub color: bool,
}

impl ResultPrinter {
    /// Render a result with section headers; headers are colored when enabled.
    pub fn render(&self, result: &SessionResult) -> String {
        if !self.color {
            return result.to_string();
        }
        if result.is_empty() {
            return format!("{}", NO_OUTPUT.dimmed());
        }

        result
            .sections()
            .map(|(section, body)| {
                let heading = match section {
                    Section::Output => section.heading().green().to_string(),
                    Section::Errors => section.heading().yellow().to_string(),
                    Section::ReturnValue => section.heading().cyan().to_string(),
                };
                format!("{heading}\n{body}{}", section.terminator())
            })
            .collect()
    }

    pub fn print(&self, result: &SessionResult) {
        println!("{}", self.render(result));
    }

    pub fn print_error(&self, message: &str) {
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{message}");
        }
    }
}
