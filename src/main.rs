use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Command line client for Lepton AI workspaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a workspace and make it current
    Login {
        /// Credentials as `<workspace_id>:<token>`
        #[arg(short, long)]
        credentials: Option<String>,

        /// Workspace id
        #[arg(short, long)]
        workspace_id: Option<String>,

        /// Auth token; prompted for on a terminal when omitted
        #[arg(short, long)]
        token: Option<String>,

        /// Workspace API URL; resolved from the id when omitted
        #[arg(short, long)]
        url: Option<String>,

        /// Treat the workspace as a classic (pre-unified) one
        #[arg(long)]
        classic: bool,
    },

    /// Log out of the current workspace
    Logout {
        /// Also remove the workspace from the local record
        #[arg(long)]
        purge: bool,
    },

    /// Manage locally recorded workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Manage photons
    Photon {
        #[command(subcommand)]
        command: PhotonCommands,
    },

    /// Manage deployments
    Deployment {
        #[command(subcommand)]
        command: DeploymentCommands,
    },

    /// Manage pods
    Pod {
        #[command(subcommand)]
        command: PodCommands,
    },

    /// Manage batch jobs
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Inspect dedicated node groups
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Browse workspace file storage
    Storage {
        #[command(subcommand)]
        command: StorageCommands,
    },

    /// Read and write key-value namespaces
    Kv {
        #[command(subcommand)]
        command: KvCommands,
    },

    /// Manage workspace secrets
    Secret {
        #[command(subcommand)]
        command: SecretCommands,
    },
}

#[derive(Subcommand)]
enum WorkspaceCommands {
    /// List recorded workspaces
    List,
    /// Show the current workspace
    Current,
    /// Remove a workspace from the local record
    Remove {
        /// Workspace id
        workspace_id: String,
    },
}

#[derive(Subcommand)]
enum PhotonCommands {
    /// List photons
    List {
        /// List photons downloaded to this machine instead
        #[arg(short, long)]
        local: bool,

        /// List public photons
        #[arg(long)]
        public: bool,
    },
    /// Remove a photon
    Remove {
        /// Photon id (remote) or name (with --local)
        target: String,

        /// Remove from the local index instead
        #[arg(short, long)]
        local: bool,

        /// With --local, remove every version of the photon
        #[arg(long, requires = "local")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum DeploymentCommands {
    /// List deployments
    List,
    /// Show a deployment's state, readiness and replicas
    Status {
        /// Deployment id
        id: String,
    },
    /// Stream a replica's log
    Log {
        /// Deployment id
        id: String,

        /// Replica id; defaults to the only replica
        #[arg(short, long)]
        replica: Option<String>,
    },
    /// Delete a deployment
    Delete {
        /// Deployment id
        id: String,
    },
    /// Restart a deployment
    Restart {
        /// Deployment id
        id: String,
    },
}

#[derive(Subcommand)]
enum PodCommands {
    /// List pods
    List,
}

#[derive(Subcommand)]
enum JobCommands {
    /// List jobs
    List {
        /// Include archived jobs
        #[arg(long)]
        archived: bool,
    },
}

#[derive(Subcommand)]
enum NodeCommands {
    /// List dedicated node groups
    List {
        /// Also list the nodes of every group
        #[arg(long)]
        nodes: bool,
    },
}

#[derive(Subcommand)]
enum StorageCommands {
    /// List a remote directory
    Ls {
        /// Remote path
        #[arg(default_value = "/")]
        path: String,
    },
}

#[derive(Subcommand)]
enum KvCommands {
    /// Print the value of a key
    Get { namespace: String, key: String },
    /// Set the value of a key
    Put {
        namespace: String,
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum SecretCommands {
    /// List secret names
    List,
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login {
            credentials,
            workspace_id,
            token,
            url,
            classic,
        } => commands::auth::login(commands::auth::LoginArgs {
            credentials,
            workspace_id,
            token,
            url,
            classic,
        }),
        Commands::Logout { purge } => commands::auth::logout(purge),
        Commands::Workspace { command } => match command {
            WorkspaceCommands::List => commands::workspace::list(),
            WorkspaceCommands::Current => commands::workspace::current(),
            WorkspaceCommands::Remove { workspace_id } => commands::workspace::remove(&workspace_id),
        },
        Commands::Photon { command } => match command {
            PhotonCommands::List { local: true, .. } => commands::photon::list_local(),
            PhotonCommands::List { local: false, public } => commands::photon::list(public),
            PhotonCommands::Remove { target, local, all } => {
                commands::photon::remove(&target, local, all)
            }
        },
        Commands::Deployment { command } => match command {
            DeploymentCommands::List => commands::deployment::list(),
            DeploymentCommands::Status { id } => commands::deployment::status(&id),
            DeploymentCommands::Log { id, replica } => {
                commands::deployment::log(&id, replica.as_deref())
            }
            DeploymentCommands::Delete { id } => commands::deployment::delete(&id),
            DeploymentCommands::Restart { id } => commands::deployment::restart(&id),
        },
        Commands::Pod { command } => match command {
            PodCommands::List => commands::pod::list(),
        },
        Commands::Job { command } => match command {
            JobCommands::List { archived } => commands::job::list(archived),
        },
        Commands::Node { command } => match command {
            NodeCommands::List { nodes } => commands::node::list(nodes),
        },
        Commands::Storage { command } => match command {
            StorageCommands::Ls { path } => commands::storage::ls(&path),
        },
        Commands::Kv { command } => match command {
            KvCommands::Get { namespace, key } => commands::kv::get(&namespace, &key),
            KvCommands::Put {
                namespace,
                key,
                value,
            } => commands::kv::put(&namespace, &key, &value),
        },
        Commands::Secret { command } => match command {
            SecretCommands::List => commands::secret::list(),
        },
    }
}

fn main() {
    lepton::logging::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<lepton::Error>() {
            Some(lepton_err) if lepton_err.is_user_facing() => {
                eprintln!("{}", commands::guidance(lepton_err).red());
            }
            _ => eprintln!("{} {err:#}", "error:".red().bold()),
        }
        std::process::exit(1);
    }
}
