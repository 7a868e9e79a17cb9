mod cli;

use cli::Cli;
use directories::ProjectDirs;
use log::error;

use verdant::config::Config;
use verdant::error::VerdantError;

fn main() {
    let project_dirs = match ProjectDirs::from("dev", "verdant", "verdant") {
        Some(dirs) => dirs,
        None => {
            eprintln!("Could not determine a home directory for application data");
            std::process::exit(1);
        }
    };

    let config = Config::load_config(&project_dirs);

    // The handle must stay alive for the duration of the program.
    let _logger = match init_logging(&config) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Failed to initialize logging: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = Cli::handle_command_line(&config, &project_dirs) {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) -> Result<flexi_logger::LoggerHandle, VerdantError> {
    let spec = format!("error, verdant = {}", config.logging.verdant);
    flexi_logger::Logger::try_with_str(&spec)
        .map_err(|e| VerdantError::Error(format!("Invalid log specification: {}", e)))?
        .log_to_stderr()
        .start()
        .map_err(|e| VerdantError::Error(format!("Failed to start logger: {}", e)))
}
