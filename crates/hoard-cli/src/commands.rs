use clap::Subcommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show downloaded albums, collections, cached tracks and storage use
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the local file for a downloaded track
    Locate {
        /// Track rating key
        track: String,
    },

    /// Record a play of a downloaded track now
    MarkPlayed {
        /// Track rating key
        track: String,
    },

    /// Delete every downloaded file and the manifest
    Purge {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show resolved data, manifest and audio locations
    Paths,
}
