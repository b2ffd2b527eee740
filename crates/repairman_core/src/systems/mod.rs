pub mod machine_failure;
pub mod repair_completed;
