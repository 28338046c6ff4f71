use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use regex::Regex;
use repo_decode::{DecodeOptions, Decoder, FileChange, format_change};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo-decode")]
#[command(about = "Decode git describe strings and unified diffs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a `git describe` string and print it as JSON
    Describe {
        /// Output of `git describe` (e.g. v1.2.3-4-gabc1234-dirty)
        raw: String,
        /// Keep the distance and hash in the rendered form for exact tags
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        long: bool,
        /// Add the distance and hash to the semver build metadata even at distance 0
        #[arg(long)]
        long_semver: bool,
        /// Suffix `git describe --dirty` appended
        #[arg(long, default_value = "-dirty")]
        dirty_mark: String,
        /// Add the dirty mark to the semver build metadata
        #[arg(long)]
        dirty_semver: bool,
        /// Prefix in front of the abbreviated hash
        #[arg(long, default_value = "g")]
        hash_prefix: String,
    },
    /// Decode a single-file unified diff (stdin when FILE is absent)
    Diff {
        file: Option<PathBuf>,
        /// Print the decoded change as JSON (the matches with --grep)
        #[arg(long)]
        json: bool,
        /// Only show hunks with an added or removed line matching REGEX
        #[arg(long, value_name = "REGEX")]
        grep: Option<Regex>,
        /// File name to report (defaults to FILE or "-")
        #[arg(long)]
        name: Option<String>,
        /// Status code to report
        #[arg(long, default_value = "M")]
        status: String,
    },
    /// Print shell completions
    Completions { shell: Shell },
    /// Print the man page
    Man,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Describe {
            raw,
            long,
            long_semver,
            dirty_mark,
            dirty_semver,
            hash_prefix,
        } => {
            let decoder = Decoder::new(DecodeOptions {
                long,
                long_semver,
                dirty_mark,
                dirty_semver,
                hash_prefix,
                ..Default::default()
            });
            let description = decoder.describe(&raw)?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Commands::Diff {
            file,
            json,
            grep,
            name,
            status,
        } => {
            let raw = match &file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let name = name
                .or_else(|| file.as_ref().map(|path| path.display().to_string()))
                .unwrap_or_else(|| "-".to_string());
            // Only CRLF: a lone CR can be part of a line's content
            let raw = raw.replace("\r\n", "\n");
            let mut change = FileChange::new(name, status, raw, &DecodeOptions::default());

            if let Some(pattern) = &grep {
                let found = change.matches(pattern);
                if found.hunks.is_empty() {
                    return Err(format!("no hunk of {} matches '{pattern}'", change.filename).into());
                }
                if json {
                    println!("{}", serde_json::to_string_pretty(&found)?);
                    return Ok(());
                }
                let kept: Vec<_> = found.hunks.into_iter().cloned().collect();
                change.hunks = kept;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&change)?);
            } else {
                print!("{}", format_change(&change));
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}
