//! Job lifecycle and link classification state types

mod job_status;
mod link_type;

pub use job_status::JobStatus;
pub use link_type::LinkType;
