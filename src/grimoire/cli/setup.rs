use clap::{Parser, Subcommand};
use grimoire::model::{Language, Theme};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "grimoire", bin_name = "grimoire", version)]
#[command(about = "Offline-first personal grimoire of typed notes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $GRIMOIRE_DATA_DIR, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every collection with its entry count
    #[command(alias = "library")]
    Collections,

    /// List the most recently updated entries
    #[command(alias = "ls")]
    List {
        /// Only entries of this collection (id or name)
        #[arg(short, long)]
        collection: Option<String>,

        /// Number of entries to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Search titles, content and tags
    Search {
        /// Text to look for; empty lists everything
        text: Vec<String>,

        /// Only entries of this collection (id or name)
        #[arg(short, long)]
        collection: Option<String>,
    },

    /// Show one entry
    #[command(alias = "view")]
    Show {
        id: String,

        /// Print the rendered HTML instead of the Markdown source
        #[arg(long)]
        html: bool,
    },

    /// Create a new entry
    #[command(alias = "n")]
    Create {
        /// Collection id or name
        #[arg(short, long)]
        collection: String,

        #[arg(short, long)]
        title: String,

        /// Tag, repeatable; commas separate several tags
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Custom field value as key=value, repeatable
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Markdown content; read from stdin when omitted and piped
        #[arg(long)]
        content: Option<String>,
    },

    /// Change an existing entry
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Replacement Markdown content
        #[arg(long)]
        content: Option<String>,

        /// Replacement tag list, comma separated
        #[arg(long)]
        tags: Option<String>,

        /// Custom field value as key=value, repeatable; empty value clears
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete { id: String },

    /// Add or remove a relation from one entry to another
    Relate { id: String, other: String },

    /// Export everything as JSON (to stdout without a file)
    Export { file: Option<PathBuf> },

    /// Import a JSON export, replacing the aggregates it contains
    Import { file: PathBuf },

    /// Show or change settings
    Settings {
        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        language: Option<Language>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_with_repeated_options() {
        let cli = Cli::try_parse_from([
            "grimoire",
            "create",
            "-c",
            "herbs",
            "-t",
            "Ginger",
            "--tag",
            "root,warm",
            "--tag",
            "tea",
            "--field",
            "latin=Zingiber officinale",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Create {
                collection,
                title,
                tags,
                fields,
                content,
            }) => {
                assert_eq!(collection, "herbs");
                assert_eq!(title, "Ginger");
                assert_eq!(tags, vec!["root,warm", "tea"]);
                assert_eq!(fields, vec!["latin=Zingiber officinale"]);
                assert!(content.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_settings_values() {
        let cli =
            Cli::try_parse_from(["grimoire", "settings", "--theme", "parchment", "--language", "en"])
                .unwrap();
        match cli.command {
            Some(Commands::Settings { theme, language }) => {
                assert_eq!(theme, Some(Theme::Parchment));
                assert_eq!(language, Some(Language::En));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["grimoire", "settings", "--theme", "neon"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["grimoire", "list", "--data-dir", "/tmp/x", "-v"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.verbose);
    }
}
