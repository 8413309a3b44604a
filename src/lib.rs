// Library exports for sheetchart

pub mod config;
pub mod data;
pub mod descriptor;
pub mod diagnostic;
pub mod label;
pub mod palette;

// Preparation pipeline
pub mod validate;
pub mod coerce;
pub mod kind;
pub mod reduce;
pub mod engine;

// Output
pub mod render;
pub mod dashboard;

pub use config::{Config, EngineConfig, RenderOptions};
pub use data::{CellValue, DataRow, Dataset};
pub use descriptor::ChartDescriptor;
pub use diagnostic::{Diagnostic, DiagnosticReport};
pub use engine::{prepare_chart, ChartPlan, ChartView};
pub use kind::ChartKind;
