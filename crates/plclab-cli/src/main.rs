mod output;

use clap::{Parser, Subcommand};
use plclab_server::state::AppState;

#[derive(Parser)]
#[command(
    name = "plclab",
    about = "PLC/SCADA training lab — simulated registers, live viewers, markdown lessons",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the lab server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8000", env = "PLCLAB_PORT")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// List the training catalog
    Lessons,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { port, no_open } => run_serve(port, no_open),
        Commands::Lessons => run_lessons(cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run_serve(port: u16, no_open: bool) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("PLC lab → http://localhost:{actual_port}");

        tokio::select! {
            res = plclab_server::serve_on(AppState::new(), listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}

fn run_lessons(json: bool) -> anyhow::Result<()> {
    let catalog = plclab_core::lesson::catalog();

    if json {
        return output::print_json(&catalog);
    }

    let headers = &["ID", "TITLE", "DESCRIPTION"];
    let rows: Vec<Vec<String>> = catalog
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.title.to_string(),
                l.description.to_string(),
            ]
        })
        .collect();
    output::print_table(headers, rows);
    Ok(())
}
