//! Force-directed knowledge-graph view: record adapter, layout, hit-testing,
//! layered canvas rendering and pointer interaction.

mod adapter;
mod color;
mod component;
mod config;
mod interaction;
mod layout;
mod render;
pub mod scale;
mod spring_layout;
mod state;
mod surface;
mod types;

pub use component::ForceGraphCanvas;
pub use config::{AdapterConfig, GraphConfig, LayoutKind, SimulationConfig};
pub use interaction::PointerKind;
pub use layout::{ForceSimulation, LayoutStrategy};
pub use render::{DrawOp, Tone, plan_frame, render};
pub use spring_layout::SpringLayout;
pub use state::GraphView;
pub use surface::{CanvasError, CanvasSurface, Surface, TextAlign, TextStyle};
pub use types::{Bounds, GraphElement, GraphEvent, Point, ViewLink, ViewNode, ViewTransform};
