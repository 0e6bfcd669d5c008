use clap::{Parser, Subcommand};

#[allow(clippy::upper_case_acronyms)]
#[derive(Parser, Debug)]
#[clap(name = "csvpatch", about, version)]
pub struct CLI {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the update batch described by the environment.
    ///
    /// Reads the CSV file once, resolves the set/where columns from its
    /// header and issues one parameterized UPDATE per data row. A row that
    /// fails is logged and skipped, the batch always runs to the end of the
    /// file.
    ///
    /// Example:
    /// `csvpatch run` or `csvpatch run --env-file ./jobs/fix-status.env`
    #[clap(name = "run")]
    Run {
        /// optional - Path to an env file with the job configuration,
        /// default is a .env in the current directory.
        #[clap(long, short)]
        env_file: Option<String>,
    },
}
