use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatrelay", version, about = "Chat completion relay with saved presets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (the default when no command is given)
    Serve,

    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
pub enum PresetAction {
    /// Save a new preset
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        model: String,
        #[arg(long, default_value_t = 0.2)]
        temperature: f64,
        #[arg(long, default_value_t = 2086)]
        max_tokens: i64,
        #[arg(long, default_value_t = 1.0)]
        top_p: f64,
        #[arg(long, default_value_t = 0.0)]
        presence_penalty: f64,
        #[arg(long, default_value_t = 0.0)]
        frequency_penalty: f64,
        #[arg(short = 'N', long, default_value_t = 1)]
        n: i64,
        #[arg(short, long, default_value = "")]
        system_message: String,
    },

    /// List all presets
    List,

    /// Print one preset as JSON
    Show { id: i64 },

    /// Delete a preset
    Delete { id: i64 },
}
