//! Console output: settings, the terminal renderer and the sink contract.

pub mod render;
pub mod renderer;
pub mod settings;

pub use render::{format_duration, render_launch_event, render_run_report, RenderSink};
pub use renderer::{PaneTone, Renderer};
