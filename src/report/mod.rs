pub mod aggregate;
pub mod exec;
pub mod output;

pub use aggregate::build_report;
pub use exec::{exec, prompt_repo_name};
pub use output::{output_console, output_json, write_csv, write_csv_file, CSV_HEADER};
