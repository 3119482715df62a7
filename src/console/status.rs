use colored::Colorize;
use supports_color::Stream;

/// Enables colored status lines only when stderr can show them.
pub fn setup_colors() {
    colored::control::set_override(supports_color::on(Stream::Stderr).is_some());
}

/// Prints a short stage message to stderr.
pub fn status(message: &str) {
    eprintln!("{}", message.bold());
}
