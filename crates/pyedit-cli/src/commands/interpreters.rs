use colored::Colorize;
use pyedit_config::{discover_interpreters, IdeConfig};

pub fn run(config: &IdeConfig) {
    let found = discover_interpreters();
    if found.is_empty() {
        println!("{}", "No Python interpreters found".yellow());
        return;
    }

    let configured = config.interpreter.canonicalize().ok();
    for interpreter in found {
        if configured.as_ref() == Some(&interpreter) {
            println!("{} {}", interpreter.display(), "(configured)".green());
        } else {
            println!("{}", interpreter.display());
        }
    }
}
