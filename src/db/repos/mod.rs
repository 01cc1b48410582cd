pub mod ai_logs;
pub mod blueprints;
pub mod profiles;
