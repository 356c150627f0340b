//! RoomPlan 用户界面
//!
//! 基于egui的即时模式GUI：2D平面视图的坐标模型、交互引擎、绘制，以及侧边面板。

pub mod canvas;
pub mod designs_panel;
pub mod egui_surface;
pub mod error;
pub mod furniture_panel;
pub mod painter;
pub mod properties_panel;
pub mod state;

pub use canvas::RoomCanvas;
pub use error::DrawError;
pub use state::{PlanEditor, PlanMode, UiState};
