//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Writers are passed in so the dispatcher can be driven from tests.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix)
pub fn error(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}: {}", "error".red().bold(), msg)
}

/// Print warning-style notice without the error prefix (yellow)
pub fn notice(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}", msg.to_string().yellow())
}

/// Print plain output (no color, for data lines that scripts consume)
pub fn info(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}", msg)
}

/// Print each item on its own line
pub fn lines<T: Display>(w: &mut dyn Write, items: &[T]) -> io::Result<()> {
    for item in items {
        info(w, item)?;
    }
    Ok(())
}
