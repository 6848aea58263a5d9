use colored::Colorize;

fn main() {
    match paddock::app::run_cli() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}
