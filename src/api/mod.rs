pub mod employee;
pub mod leave;
pub mod task;
pub mod work_status;
