use std::path::PathBuf;
use std::sync::Arc;

use is_terminal::IsTerminal;
use tracing::{error, info};

use maxctrl_exporter::config::{Config, CONFIG_FILE_ENV};
use maxctrl_exporter::exporter::Exporter;
use maxctrl_exporter::{server, Result};

fn main() {
    use clap::{crate_description, crate_name, crate_version, Arg, Command, ValueHint};
    use std::process;

    let cmd = Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("config_file")
                .long("config-file")
                .env(CONFIG_FILE_ENV)
                .help("YAML file overriding the MAXSCALE_* environment variables")
                .value_hint(ValueHint::FilePath),
        );
    let matches = cmd.get_matches();
    let config_file = matches
        .get_one::<String>("config_file")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from);

    if let Err(e) = init_tracing() {
        eprintln!("{e}");
        process::exit(1);
    }

    if let Err(e) = startup(config_file) {
        error!(error = %e, "failed to start MaxScale exporter");
        process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::{filter::EnvFilter, prelude::*};

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let collector = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(if std::io::stdout().is_terminal() {
            Some(tracing_subscriber::fmt::layer())
        } else {
            None
        })
        .with(if std::io::stdout().is_terminal() {
            None
        } else {
            Some(tracing_subscriber::fmt::layer().json())
        });
    tracing::subscriber::set_global_default(collector)?;
    Ok(())
}

fn startup(config_file: Option<PathBuf>) -> Result<()> {
    use tokio::{net::TcpListener, runtime, signal};

    let config = Config::load(config_file.as_deref())?;
    info!("starting MaxScale exporter");
    info!(url = %config.url, monitors = config.monitors, "scraping MaxScale REST API");

    let exporter = Arc::new(Exporter::new(&config)?);

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async move {
        let listener = TcpListener::bind(config.listen_address()).await?;
        let shutdown = async {
            if let Err(err) = signal::ctrl_c().await {
                error!("error reading SIGINT: {err}");
            }
            info!("shutting down");
        };
        server::serve(listener, exporter, shutdown).await
    })
}
