mod loop_handler;

pub use loop_handler::{run, run_check_links, run_headless, LoopContext};
