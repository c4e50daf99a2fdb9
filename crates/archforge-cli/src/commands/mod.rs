//! One module per subcommand.  Handlers translate arguments into service
//! calls and print the result; no business logic lives here.

pub mod completions;
pub mod config;
pub mod formats;
pub mod generate;
pub mod init;
