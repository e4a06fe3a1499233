pub mod assigned_task;
pub mod leave;
pub mod otp;
pub mod role;
pub mod task;
pub mod user;
