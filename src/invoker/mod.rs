pub mod process_runner;
pub mod tool_invoker;

pub use process_runner::{
    InvocationFailure, ProcessRunner, ToolCommand, ToolRunner, TrialResult, SENTINEL_EXIT_CODE,
};
pub use tool_invoker::ToolInvoker;
