use clap::{Parser, Subcommand};
use serde_json::Value;

use wire_console::observability::logging;
use wire_console::shell::{BusyIndicator, Shell, WireResponse};

#[derive(Parser)]
#[command(name = "console-cli")]
#[command(about = "Operator CLI for the wire console", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Account to sign in with. Unauthenticated commands work without it.
    #[arg(long)]
    user: Option<String>,

    #[arg(long, default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check console liveness
    Health,
    /// Show readiness and store counts
    Ready,
    /// Show the members panel for an org
    Members { org_id: u64 },
    /// Invite an email address into an org
    Invite {
        org_id: u64,
        email: String,
        #[arg(default_value = "member")]
        role: String,
    },
    /// Show the incidents table for an org
    Incidents { org_id: u64 },
    /// Mark an incident report as submitted
    Report {
        org_id: u64,
        incident_id: u64,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "")]
        reference: String,
    },
    /// Print the Annex E JSON export for an incident
    Annex { org_id: u64, incident_id: u64 },
    /// Show compliance records, optionally filtered by status
    Records {
        org_id: u64,
        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("wire_console=warn");

    let cli = Cli::parse();

    // The CLI is a real wire client: the shell runtime issues the
    // requests and the busy indicator rides the same lifecycle events a
    // browser shell would see.
    let shell = Shell::connect(&cli.url)?;
    let _hooks = BusyIndicator::new().install(&shell);
    let runtime = shell
        .runtime()
        .cloned()
        .expect("connected shell always has a runtime");

    if let Some(user) = &cli.user {
        let response = runtime
            .post_form("/login", &[("username", user), ("password", &cli.password)])
            .await?;
        if !response.is_success() {
            eprintln!("Login failed ({})", response.status);
            std::process::exit(1);
        }
    }

    let response = match &cli.command {
        Commands::Health => runtime.get("/healthz").await?,
        Commands::Ready => runtime.get("/readyz").await?,
        Commands::Members { org_id } => runtime.get(&format!("/orgs/{}/members", org_id)).await?,
        Commands::Invite { org_id, email, role } => {
            runtime
                .post_form(
                    &format!("/orgs/{}/invites", org_id),
                    &[("email", email.as_str()), ("role", role.as_str())],
                )
                .await?
        }
        Commands::Incidents { org_id } => {
            runtime.get(&format!("/orgs/{}/incidents", org_id)).await?
        }
        Commands::Report {
            org_id,
            incident_id,
            notes,
            reference,
        } => {
            runtime
                .post_form(
                    &format!("/orgs/{}/incidents/{}/submit-report", org_id, incident_id),
                    &[
                        ("report_notes", notes.as_str()),
                        ("report_reference", reference.as_str()),
                    ],
                )
                .await?
        }
        Commands::Annex { org_id, incident_id } => {
            runtime
                .get(&format!("/orgs/{}/incidents/{}/annex.json", org_id, incident_id))
                .await?
        }
        Commands::Records { org_id, status } => {
            let path = match status {
                Some(status) => format!("/orgs/{}/records?status={}", org_id, status),
                None => format!("/orgs/{}/records", org_id),
            };
            runtime.get(&path).await?
        }
    };

    print_response(response);
    Ok(())
}

fn print_response(response: WireResponse) {
    if !response.is_success() {
        eprintln!("Error: console returned status {}", response.status);
        if !response.body.is_empty() {
            eprintln!("Response: {}", response.body);
        }
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", response.body),
        },
        Err(_) => println!("{}", response.body),
    }
}
