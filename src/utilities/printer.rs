//! Console printer with color support.
//!
//! Used by the `evaluate` binary to print batch summaries; library code
//! logs through `log` instead.

use serde::{Deserialize, Serialize};

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Cyan,
    BoldGreen,
    BoldYellow,
    BoldCyan,
    BoldWhite,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Cyan => "\x1b[36m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldWhite => "\x1b[1;37m",
        }
    }
}

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// Printer for console output with color support.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    /// Suppress ANSI codes (e.g. when writing to a pipe).
    pub plain: bool,
}

impl Printer {
    /// Create a new `Printer`.
    pub fn new(plain: bool) -> Self {
        Self { plain }
    }

    /// Print a message with the specified color.
    pub fn print(&self, content: &str, color: PrinterColor) {
        if self.plain {
            println!("{}", content);
        } else {
            println!("{}{}{}", color.ansi_code(), content, RESET);
        }
    }

    /// Print a section heading with an underline.
    pub fn heading(&self, title: &str) {
        self.print(title, PrinterColor::BoldCyan);
        self.print(&"-".repeat(title.len()), PrinterColor::Cyan);
    }

    /// Print one named score, colored by how healthy the value is.
    pub fn metric(&self, name: &str, value: f64) {
        let color = if value >= 0.7 {
            PrinterColor::Green
        } else if value >= 0.4 {
            PrinterColor::Yellow
        } else {
            PrinterColor::Red
        };
        if self.plain {
            println!("  {}: {:.3}", name, value);
        } else {
            println!("  {}: {}{:.3}{}", name, color.ansi_code(), value, RESET);
        }
    }
}
