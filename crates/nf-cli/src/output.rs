//! Console formatting helpers

use nf_rest_client::contract::ProcessorState;

const RULE_WIDTH: usize = 60;

/// Print a title framed by horizontal rules
pub fn print_header(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", rule);
    println!(" {}", title);
    println!("{}", rule);
    println!();
}

/// Marker shown next to a processor in listings
pub fn state_icon(state: ProcessorState) -> &'static str {
    match state {
        ProcessorState::Running => "▶",
        _ => "■",
    }
}
