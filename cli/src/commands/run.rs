use std::fs::File;

use csvpatch::{
    batch::run_batch, csvpatch_info, setup_info_logger, PostgresClient, PostgresUpdater, Settings,
};
use dotenv::{dotenv, from_path};

use crate::console::{print_error_message, print_success_message};

fn load_env(env_file: Option<&str>) {
    match env_file {
        Some(path) => {
            if from_path(path).is_err() {
                print_error_message(&format!("Could not load env file: {}", path));
                std::process::exit(1);
            }
        }
        None => {
            dotenv().ok();
        }
    }
}

pub async fn run(env_file: Option<String>) {
    setup_info_logger();

    load_env(env_file.as_deref());

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            print_error_message(&format!("Invalid configuration: {}", e));
            std::process::exit(1);
        }
    };

    let client = match PostgresClient::connect(&settings.database).await {
        Ok(client) => client,
        Err(e) => {
            print_error_message(&format!("Could not connect to the database: {}", e));
            std::process::exit(1);
        }
    };

    let updater =
        match PostgresUpdater::prepare(client, &settings.target, settings.log_query).await {
            Ok(updater) => updater,
            Err(e) => {
                print_error_message(&format!("Could not prepare the update statement: {}", e));
                std::process::exit(1);
            }
        };

    let input = match File::open(&settings.csv_path) {
        Ok(input) => input,
        Err(e) => {
            print_error_message(&format!(
                "Could not open CSV file {}: {}",
                settings.csv_path.display(),
                e
            ));
            std::process::exit(1);
        }
    };

    csvpatch_info!(
        "Updating {}.{} from {}",
        settings.target.table,
        settings.target.set_column,
        settings.csv_path.display()
    );

    match run_batch(input, &settings.set_column, &settings.where_column, &updater).await {
        Ok(summary) => {
            // per-row failures are already logged, a finished run exits 0
            print_success_message(&format!(
                "Batch complete: {} rows processed, {} failed, {} rows affected",
                summary.rows_processed, summary.rows_failed, summary.rows_affected
            ));
        }
        Err(e) => {
            print_error_message(&format!("Batch aborted: {}", e));
            std::process::exit(1);
        }
    }
}
