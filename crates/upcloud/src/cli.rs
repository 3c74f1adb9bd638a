//! Clap derive structures for the `upcloud` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// upcloud -- manage UpCloud servers, storage and networking
#[derive(Debug, Parser)]
#[command(
    name = "upcloud",
    version,
    about = "Manage UpCloud infrastructure from the command line",
    long_about = "A CLI for the UpCloud control-plane API (v1.2).\n\n\
        Lists and inspects servers, storages, IP addresses and firewall rules,\n\
        drives server lifecycle operations and waits for state transitions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "UPCLOUD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API username (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UPCLOUD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "UPCLOUD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show account details and remaining credits
    Account,

    /// List available zones
    Zones,

    /// List allowed server sizes (CPU / memory combinations)
    Sizes,

    /// Manage servers
    #[command(alias = "server", alias = "srv")]
    Servers(ServersArgs),

    /// Manage storage devices
    #[command(alias = "st")]
    Storage(StorageArgs),

    /// Manage IP addresses
    Ip(IpArgs),

    /// Manage server firewall rules
    #[command(alias = "fw")]
    Firewall(FirewallArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Waiting ──────────────────────────────────────────────────────────

/// Shared arguments for commands that block on a state transition.
#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Give up after this long (e.g. 90s, 5m)
    #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
    pub wait_timeout: Duration,
}

// ── Servers ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServersArgs {
    #[command(subcommand)]
    pub command: ServersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    /// List servers
    #[command(alias = "ls")]
    List,

    /// Show server details
    Get {
        /// Server UUID
        uuid: String,
    },

    /// Start a stopped server
    Start {
        /// Server UUID
        uuid: String,

        /// Block until the server is started
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Stop a running server
    Stop {
        /// Server UUID
        uuid: String,

        /// Hard stop instead of an ACPI shutdown
        #[arg(long)]
        hard: bool,

        /// Seconds a soft stop may take before the server is hard stopped
        #[arg(long)]
        stop_timeout: Option<u64>,

        /// Block until the server is stopped
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Restart a running server
    Restart {
        /// Server UUID
        uuid: String,

        /// Hard stop instead of an ACPI shutdown
        #[arg(long)]
        hard: bool,

        /// Seconds a soft stop may take before the restart gives up
        #[arg(long)]
        stop_timeout: Option<u64>,

        /// Block until the server is started again
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Delete a stopped server (storages are kept)
    #[command(alias = "rm")]
    Delete {
        /// Server UUID
        uuid: String,
    },

    /// Wait for a server to reach or leave a state
    Wait {
        /// Server UUID
        uuid: String,

        /// Wait until the server is in this state
        #[arg(long, conflicts_with = "leave", required_unless_present = "leave")]
        state: Option<ServerStateArg>,

        /// Wait until the server is no longer in this state
        #[arg(long)]
        leave: Option<ServerStateArg>,

        #[command(flatten)]
        wait_args: WaitArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServerStateArg {
    Started,
    Stopped,
    Maintenance,
    Error,
}

// ── Storage ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommand,
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// List storages
    #[command(alias = "ls")]
    List {
        /// Only list one class of storages
        #[arg(long, short = 'f')]
        filter: Option<StorageFilterArg>,
    },

    /// Show storage details
    Get {
        /// Storage UUID
        uuid: String,
    },

    /// Delete a storage that is not attached to any server
    #[command(alias = "rm")]
    Delete {
        /// Storage UUID
        uuid: String,
    },

    /// Wait for a storage to reach or leave a state
    Wait {
        /// Storage UUID
        uuid: String,

        /// Wait until the storage is in this state
        #[arg(long, conflicts_with = "leave", required_unless_present = "leave")]
        state: Option<StorageStateArg>,

        /// Wait until the storage is no longer in this state
        #[arg(long)]
        leave: Option<StorageStateArg>,

        #[command(flatten)]
        wait_args: WaitArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StorageStateArg {
    Online,
    Maintenance,
    Cloning,
    Backuping,
    Syncing,
    Error,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StorageFilterArg {
    Public,
    Private,
    Normal,
    Backup,
    Cdrom,
    Template,
    Favorite,
}

// ── IP addresses ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IpArgs {
    #[command(subcommand)]
    pub command: IpCommand,
}

#[derive(Debug, Subcommand)]
pub enum IpCommand {
    /// List IP addresses
    #[command(alias = "ls")]
    List,

    /// Show IP address details
    Get {
        /// The address itself
        address: String,
    },

    /// Release an IP address from its server
    Release {
        /// The address itself
        address: String,
    },
}

// ── Firewall ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FirewallArgs {
    #[command(subcommand)]
    pub command: FirewallCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirewallCommand {
    /// List the firewall rules of a server
    #[command(alias = "ls")]
    List {
        /// Server UUID
        server: String,
    },

    /// Show one firewall rule
    Get {
        /// Server UUID
        server: String,

        /// Rule position (1-based)
        position: u32,
    },

    /// Delete one firewall rule
    #[command(alias = "rm")]
    Delete {
        /// Server UUID
        server: String,

        /// Rule position (1-based)
        position: u32,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the loaded configuration (passwords redacted)
    Show,

    /// Set a key on the active profile
    Set {
        /// One of: username, password_env, api_url, timeout, poll_interval, retry_transient
        key: String,

        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
