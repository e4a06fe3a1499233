use crate::api::employee::UpdateUser;
use crate::api::leave::{CreateLeave, DecideLeave, LeaveFilter, SplitLeave};
use crate::api::task::{
    AssignTasks, NewAssignment, SubmitTask, TaskWithAssignments, UserMonthGroup,
};
use crate::api::work_status::UserWorkStatus;
use crate::core::calendar::DayCell;
use crate::core::merge::DoneFlagPatch;
use crate::model::assigned_task::AssignedTask;
use crate::model::leave::{Leave, LeaveStatus, LeaveType};
use crate::model::task::{Task, TaskStatus};
use crate::model::user::{User, UserSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave & Daily Task API",
        version = "1.0.0",
        description = r#"
## Leave management & daily task tracking

Employees submit leave requests and daily work logs; managers approve or
reject leave, assign tasks, and monitor attendance through a monthly
day-by-day status grid.

### Key features
- **Leave Management**: apply, re-edit while pending, approve/reject, and
  split a single day out of a multi-day request
- **Daily Tasks**: one log per employee per day, manager-assigned to-dos
- **Work Status**: per-employee, per-day monthly status grid

### Security
Endpoints are protected with **JWT Bearer authentication**; manager-only
operations require the manager role.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::update_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::split_leave,

        crate::api::task::month_tasks,
        crate::api::task::submit_task,
        crate::api::task::assign_tasks,

        crate::api::work_status::work_status,

        crate::api::employee::list_users,
        crate::api::employee::get_user,
        crate::api::employee::update_user,
    ),
    components(
        schemas(
            Leave,
            LeaveType,
            LeaveStatus,
            LeaveFilter,
            CreateLeave,
            DecideLeave,
            SplitLeave,
            Task,
            TaskStatus,
            AssignedTask,
            SubmitTask,
            AssignTasks,
            NewAssignment,
            DoneFlagPatch,
            TaskWithAssignments,
            UserMonthGroup,
            UserWorkStatus,
            DayCell,
            User,
            UserSummary,
            UpdateUser,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Task", description = "Daily task & assignment APIs"),
        (name = "WorkStatus", description = "Monthly work-status grid"),
        (name = "Employee", description = "User administration APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
