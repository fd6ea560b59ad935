//! Monthly goal persistence and progress tracking.

pub mod store;
pub mod tracker;

pub use store::GoalStore;
pub use tracker::{calcular_progresso, calcular_projecao_mes, GoalProgress, MonthActuals};
