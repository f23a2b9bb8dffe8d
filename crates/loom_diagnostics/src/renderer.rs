//! Rendering diagnostics for people and for machines.

use crate::diagnostic::{Diagnostic, Severity};

/// Formats a diagnostic as text.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic, including its trailing newline.
    fn render(&self, diag: &Diagnostic) -> String;

    /// Renders a list of diagnostics.
    fn render_all(&self, diags: &[Diagnostic]) -> String {
        diags.iter().map(|d| self.render(d)).collect()
    }
}

/// rustc-style terminal output:
///
/// ```text
/// error[E305]: block %ckla in @LAGCE_proc is not reachable from the entry block
///   --> @LAGCE_proc %ckla
///    = help: branch to it or remove it
/// ```
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    /// Emit ANSI colors.
    pub color: bool,
    /// Column at which notes and help are wrapped.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn footer(&self, out: &mut String, kind: &str, text: &str) {
        let lead = format!("   = {kind}: ");
        let indent = " ".repeat(lead.len());
        let room = (self.width as usize).saturating_sub(lead.len()).max(20);
        for (i, line) in wrap(text, room).iter().enumerate() {
            out.push_str(if i == 0 { &lead } else { &indent });
            out.push_str(line);
            out.push('\n');
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(false, 100)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let ansi = match diag.severity {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
            Severity::Note => "1;36",
        };
        let mut out = format!(
            "{}: {}\n",
            self.paint(&format!("{}[{}]", diag.severity, diag.code), ansi),
            diag.message
        );
        if let Some(location) = &diag.location {
            out.push_str(&format!("  {} {location}\n", self.paint("-->", "1;34")));
        }
        for note in &diag.notes {
            self.footer(&mut out, "note", note);
        }
        for help in &diag.help {
            self.footer(&mut out, "help", help);
        }
        out
    }
}

/// One JSON object per line.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        match serde_json::to_string(diag) {
            Ok(json) => json + "\n",
            Err(err) => format!("{{\"error\":\"{err}\"}}\n"),
        }
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
