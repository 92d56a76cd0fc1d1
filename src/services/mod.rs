pub mod fixed_placement;
pub mod flexible_placement;
pub mod plan_observer;
pub mod planning_engine;
pub mod planning_service;
pub mod priority_scorer;
pub mod recurrence_expander;
pub mod result_assembler;
pub mod schedule_utils;
pub mod settings_service;
pub mod task_classifier;
pub mod timeline_builder;
pub mod window_resolver;
