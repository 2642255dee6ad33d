mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use lroflow_gcp::AuthMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lroflow")]
#[command(about = "Resumable long-running-operation runners for Google Cloud", long_about = None)]
struct Cli {
    /// Where bearer tokens come from
    #[arg(long, global = true, value_enum, default_value_t = AuthArg::Auto, env = "LROFLOW_AUTH")]
    auth: AuthArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuthArg {
    /// GOOGLE_OAUTH_ACCESS_TOKEN, then the metadata server
    Auto,
    Env,
    Metadata,
    Gcloud,
}

impl From<AuthArg> for AuthMode {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Auto => AuthMode::Auto,
            AuthArg::Env => AuthMode::Env,
            AuthArg::Metadata => AuthMode::Metadata,
            AuthArg::Gcloud => AuthMode::Gcloud,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a Dataproc Serverless batch and wait for it to finish
    #[command(name = "dataproc-batch")]
    DataprocBatch {
        /// Batch type (SparkBatch, PySparkBatch, SparkRBatch, SparkSqlBatch)
        #[arg(long = "type", value_name = "TYPE")]
        batch_type: String,
        #[arg(long)]
        project: String,
        #[arg(long, default_value = "us-central1")]
        location: String,
        /// Batch id; generated when empty
        #[arg(long, alias = "batch_id", default_value = "")]
        batch_id: String,
        /// Batch resource as JSON
        #[arg(long)]
        payload: String,
        /// Resource ledger file
        #[arg(long, alias = "gcp_resources")]
        gcp_resources: PathBuf,
    },
    /// Create a Vertex AI endpoint
    #[command(name = "create-endpoint")]
    CreateEndpoint {
        #[arg(long)]
        project: String,
        #[arg(long, default_value = "us-central1")]
        location: String,
        /// Endpoint resource as JSON
        #[arg(long)]
        payload: String,
        #[arg(long, alias = "gcp_resources")]
        gcp_resources: PathBuf,
        /// Pipeline executor input JSON
        #[arg(long, alias = "executor_input")]
        executor_input: Option<String>,
    },
    /// Upload a model to the Vertex AI model registry
    #[command(name = "upload-model")]
    UploadModel {
        #[arg(long)]
        project: String,
        #[arg(long, default_value = "us-central1")]
        location: String,
        /// UploadModelRequest as JSON
        #[arg(long)]
        payload: String,
        #[arg(long, alias = "gcp_resources")]
        gcp_resources: PathBuf,
        #[arg(long, alias = "executor_input")]
        executor_input: Option<String>,
    },
    /// Record an existing Vertex AI model
    #[command(name = "resolve-model")]
    ResolveModel {
        /// projects/<project>/locations/<location>/models/<model>[@<version>]
        #[arg(long, alias = "model_name")]
        model_name: String,
        /// Overrides any version in --model-name
        #[arg(long, alias = "model_version")]
        model_version: Option<String>,
        #[arg(long, alias = "gcp_resources")]
        gcp_resources: PathBuf,
        #[arg(long, alias = "executor_input")]
        executor_input: Option<String>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let auth = AuthMode::from(cli.auth);

    match cli.command {
        Commands::Version => {
            println!("lroflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::DataprocBatch {
            batch_type,
            project,
            location,
            batch_id,
            payload,
            gcp_resources,
        } => {
            commands::dataproc::handle(commands::dataproc::BatchArgs {
                batch_type,
                project,
                location,
                batch_id,
                payload,
                gcp_resources,
                auth,
            })
            .await?;
        }
        Commands::CreateEndpoint {
            project,
            location,
            payload,
            gcp_resources,
            executor_input,
        } => {
            commands::vertex::handle_create_endpoint(commands::vertex::VertexArgs {
                project,
                location,
                payload,
                gcp_resources,
                executor_input,
                auth,
            })
            .await?;
        }
        Commands::UploadModel {
            project,
            location,
            payload,
            gcp_resources,
            executor_input,
        } => {
            commands::vertex::handle_upload_model(commands::vertex::VertexArgs {
                project,
                location,
                payload,
                gcp_resources,
                executor_input,
                auth,
            })
            .await?;
        }
        Commands::ResolveModel {
            model_name,
            model_version,
            gcp_resources,
            executor_input,
        } => {
            commands::resolve::handle(
                &model_name,
                model_version.as_deref(),
                &gcp_resources,
                executor_input.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
