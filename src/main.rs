use anyhow::Result;
use meshterm::cli;
use meshterm_config::Config;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("meshterm: using default config: {e:#}");
            Config::default()
        }
    };
    cli::apply_overrides(&mut config, &options);

    // Routes all log::info!() etc. to the debug log file.
    // CLI --log-level takes precedence, then RUST_LOG, then config.
    meshterm::debug::init_log_bridge(options.log_level, config.log_level.to_level_filter());
    log::info!("Starting meshterm {}", meshterm::VERSION);

    // Single-threaded: the workspace core relies on cooperative scheduling
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let code = runtime.block_on(cli::run_command(&config, &options))?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
