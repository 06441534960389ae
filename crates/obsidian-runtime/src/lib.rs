#![forbid(unsafe_code)]

//! Runtime: the cooperative scheduler effects register with, and the task
//! scopes screens use to revoke everything on teardown.

pub mod scheduler;
pub mod scope;

pub use scheduler::{
    Due, Fired, Host, MIN_PERIOD, Scheduler, StopSignal, TaskGuard, TaskId, TaskKind,
};
pub use scope::TaskScope;
