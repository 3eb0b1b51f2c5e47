#[macro_use]
extern crate tracing;

use std::path::PathBuf;

use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;

use iconlamp::{
    global::Event,
    models::StatusLineConfig,
    servers::ServerHandle,
    status::StatusLine,
};

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    #[structopt(short, long = "config")]
    config_path: Option<PathBuf>,
    #[structopt(long)]
    dump_config: bool,
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let config = {
        if let Some(config_path) = opts.config_path.as_deref() {
            iconlamp::models::Config::load_file(config_path).await?
        } else {
            iconlamp::models::Config::default()
        }
    };

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    // Create the global state object
    let global = iconlamp::global::GlobalData::new(&config).wrap();

    // Raise the power indicator to its running level
    let status = StatusLine::new(&config.global.status_line);
    status.set_duty(StatusLineConfig::STARTUP_DUTY).await;

    // Initialize and spawn the pixel groups
    for group in &config.groups {
        let instance = iconlamp::instance::Instance::new(global.clone(), group.clone()).await;

        tokio::spawn(async move {
            let result = instance.run().await;

            if let Err(error) = result {
                error!(error = %error, "group runtime error");
            }
        });
    }

    // Start the web server
    let _web_server =
        ServerHandle::spawn(iconlamp::web::bind(global.clone(), &config.global.web).await?);

    // Start the captive portal DNS responder
    let _dns_server = if config.global.dns.enable {
        Some(ServerHandle::spawn(
            iconlamp::servers::bind_dns(
                &config.global.dns,
                config.global.access_point.address,
            )
            .await?,
        ))
    } else {
        None
    };

    info!(
        ssid = %config.global.access_point.ssid,
        "icon lamp up"
    );

    let mut events = global.subscribe_events().await;

    // Should we continue running?
    let mut abort = false;

    while !abort {
        tokio::select! {
            _ = signal::ctrl_c() => {
                abort = true;
            }
            event = events.recv() => {
                if let Ok(Event::Shutdown) = event {
                    info!("shutdown requested");
                    abort = true;
                }
            }
        }
    }

    // Servers stop when their handles drop; signal the indicator last
    status.set_duty(StatusLineConfig::SHUTDOWN_DUTY).await;

    Ok(())
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer();

    let filter_layer = EnvFilter::try_from_env("ICONLAMP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "iconlamp=warn,iconlampd=warn",
            1 => "iconlamp=info,iconlampd=info",
            2 => "iconlamp=debug,iconlampd=debug",
            _ => "iconlamp=trace,iconlampd=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Create tokio runtime
    let thd_count = match num_cpus::get() {
        1 => 2,
        other => other.min(4),
    };

    let rt = Builder::new_multi_thread()
        .worker_threads(thd_count)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}
