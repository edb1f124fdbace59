use std::process;

fn main() {
    match docs_mcp::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("docs-mcp error: {err:#}");
            process::exit(1);
        }
    }
}
