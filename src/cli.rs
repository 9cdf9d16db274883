//! CLI domain: parse, route, output, and presentation only.
//! Pipeline orchestration lives in the library; the route table only wires it up.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_check_ok, format_explain_json, format_explain_text, format_plan_json,
    format_plan_text,
};
pub use route::{command_name, RunContext};
