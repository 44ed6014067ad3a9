//! Centralized UI settings for console output.
//!
//! The single place to tweak labels, glyphs, colors and indentation.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout / indentation
// ---------------------------------------------------------------------------

pub const INDENT_1: &str = "  ";
pub const INDENT_2: &str = "    ";

// ---------------------------------------------------------------------------
// Sections / labels
// ---------------------------------------------------------------------------

pub const LABEL_APP: &str = "panelaunch";
pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";
pub const GLYPH_PANE_OK: &str = "✓";
pub const GLYPH_PANE_FAILED: &str = "✗";
pub const GLYPH_PANE_STEP: &str = "▶";
pub const GLYPH_PANE_OK_PLAIN: &str = "ok";
pub const GLYPH_PANE_FAILED_PLAIN: &str = "FAILED";
pub const GLYPH_PANE_STEP_PLAIN: &str = ">";

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_APP_LABEL: Color = Color::Green;
pub const COLOR_ACTIVITY_TEXT: Color = Color::DarkGrey;
pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
pub const COLOR_SUCCESS: Color = Color::Green;

pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_SECTION_TITLE: Color = Color::Cyan;
pub const COLOR_FIELD_KEY: Color = Color::DarkGrey;
pub const COLOR_FIELD_VALUE: Color = Color::White;

pub const COLOR_PANE_LABEL: Color = Color::Yellow;
pub const COLOR_PANE_STEP: Color = Color::DarkYellow;
pub const COLOR_PANE_DETAIL: Color = Color::DarkGrey;
