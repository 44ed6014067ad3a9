//! Terminal output renderer for status and progress lines.

use crossterm::style::Stylize;

use super::settings;

/// Outcome tone of a per-pane progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneTone {
    Step,
    Ok,
    Failed,
}

/// Handles all console formatting. Everything goes to stderr so stdout
/// stays clean for `plan` output.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// App name plus a short detail, e.g. session and version.
    pub fn header(&self, detail: &str) {
        eprintln!("\r{}", self.header_line(detail));
    }

    pub fn section(&self, title: &str) {
        eprintln!("\r{}", self.section_line(title));
    }

    /// Bold gray lifecycle line.
    pub fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                text.with(settings::COLOR_ACTIVITY_TEXT).bold()
            );
        } else {
            eprintln!("\r{text}");
        }
    }

    pub fn field(&self, key: &str, value: &str) {
        eprintln!("\r{}", self.field_line(key, value));
    }

    pub fn detail(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{}{}",
                settings::INDENT_1,
                text.with(settings::COLOR_FIELD_VALUE)
            );
        } else {
            eprintln!("\r{}{text}", settings::INDENT_1);
        }
    }

    /// One progress line for a pane.
    pub fn pane(&self, index: usize, label: &str, tone: PaneTone, text: &str) {
        eprintln!("\r{}", self.pane_line(index, label, tone, text));
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!(
                "\r{} {msg}",
                settings::LABEL_WARNING.with(settings::COLOR_WARNING).bold()
            );
        } else {
            eprintln!("\r{} {msg}", settings::LABEL_WARNING);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!(
                "\r{} {msg}",
                settings::LABEL_ERROR.with(settings::COLOR_ERROR).bold()
            );
        } else {
            eprintln!("\r{} {msg}", settings::LABEL_ERROR);
        }
    }

    pub fn success(&self, msg: &str) {
        if self.color {
            eprintln!("\r{}", msg.with(settings::COLOR_SUCCESS).bold());
        } else {
            eprintln!("\r{msg}");
        }
    }

    fn header_line(&self, detail: &str) -> String {
        if self.color {
            format!(
                "{} {}",
                settings::LABEL_APP.with(settings::COLOR_APP_LABEL).bold(),
                detail.with(settings::COLOR_ACTIVITY_TEXT)
            )
        } else {
            format!("{} ({detail})", settings::LABEL_APP)
        }
    }

    fn section_line(&self, title: &str) -> String {
        if self.color {
            format!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                title.with(settings::COLOR_SECTION_TITLE).bold()
            )
        } else {
            format!("{title}:")
        }
    }

    fn field_line(&self, key: &str, value: &str) -> String {
        if self.color {
            format!(
                "{}{} {}",
                settings::INDENT_1,
                format!("{key}:").with(settings::COLOR_FIELD_KEY),
                value.with(settings::COLOR_FIELD_VALUE),
            )
        } else {
            format!("{}{key}: {value}", settings::INDENT_1)
        }
    }

    fn pane_line(&self, index: usize, label: &str, tone: PaneTone, text: &str) -> String {
        if !self.color {
            let glyph = match tone {
                PaneTone::Step => settings::GLYPH_PANE_STEP_PLAIN,
                PaneTone::Ok => settings::GLYPH_PANE_OK_PLAIN,
                PaneTone::Failed => settings::GLYPH_PANE_FAILED_PLAIN,
            };
            return format!("{}[{index}] {label} {glyph} {text}", settings::INDENT_1);
        }
        let glyph = match tone {
            PaneTone::Step => settings::GLYPH_PANE_STEP.with(settings::COLOR_PANE_STEP),
            PaneTone::Ok => settings::GLYPH_PANE_OK.with(settings::COLOR_SUCCESS),
            PaneTone::Failed => settings::GLYPH_PANE_FAILED.with(settings::COLOR_ERROR),
        };
        format!(
            "{}{} {} {glyph} {}",
            settings::INDENT_1,
            format!("[{index}]").with(settings::COLOR_PANE_DETAIL),
            label.with(settings::COLOR_PANE_LABEL).bold(),
            text.with(settings::COLOR_PANE_DETAIL),
        )
    }
}
