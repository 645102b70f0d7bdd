//! Functions command implementation

use crate::console::CliConsole;
use crate::functions::BundledFunction;

/// List the bundled functions, marking the selected one
pub fn list(selected: BundledFunction) {
    let console = CliConsole::new(true);
    console.print_header("Bundled Functions");

    for function in BundledFunction::all() {
        let marker = if *function == selected { "*" } else { " " };
        let name = format!("{} {}", marker, function.name());
        console.print_table_row(&[name.as_str(), function.description()]);
    }

    console.info("");
    console.info("Select one with --function <name> or AUTOMATE_FUNCTION.");
}
