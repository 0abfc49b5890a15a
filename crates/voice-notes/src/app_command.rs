use crate::{
    AppError, AppResult,
    category::Category,
    library::{FilterOptions, SortBy},
};

use std::panic::Location;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, error::ErrorKind};
use error_location::ErrorLocation;

/// One line typed at the prompt. The first word names the command.
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct CommandLine {
    #[command(subcommand)]
    command: AppCommand,
}

/// Commands sent from the input handler to the main application.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum AppCommand {
    /// Start a new recording
    #[command(alias = "r")]
    Record,
    /// Pause the running recording, or playback when not recording
    #[command(alias = "p")]
    Pause,
    /// Resume a paused recording, or paused playback
    Resume,
    /// Stop recording and save the note, or stop playback
    #[command(alias = "s")]
    Stop,
    /// Play a note through the speaker
    Play {
        /// Note id or unique id prefix
        id: String,
    },
    /// Jump to a position in the playing note
    Seek {
        /// Seconds from the start
        seconds: f64,
    },
    /// Restart the playing note from the beginning
    #[command(alias = "restart")]
    Rewind,
    /// Set the playback speed (cycles 0.5x to 2x when omitted)
    Speed {
        /// Speed multiplier
        rate: Option<f32>,
    },
    /// Set the playback volume
    Volume {
        /// Gain from 0.0 to 1.0
        level: f32,
    },
    /// Show a note with its waveform
    Show {
        /// Note id or unique id prefix
        id: String,
    },
    /// List notes
    #[command(alias = "ls")]
    List(ListArgs),
    /// Toggle a note's favourite flag
    Favorite {
        /// Note id or unique id prefix
        id: String,
    },
    /// Change a note's title
    Rename {
        /// Note id or unique id prefix
        id: String,
        /// New title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Add tags to a note
    Tag {
        /// Note id or unique id prefix
        id: String,
        /// Tags to add
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },
    /// Move a note to another category
    Move {
        /// Note id or unique id prefix
        id: String,
        /// Target category
        category: Category,
    },
    /// Delete a note and its audio
    #[command(alias = "rm")]
    Delete {
        /// Note id or unique id prefix
        id: String,
    },
    /// Export notes as JSON (all when no ids are given)
    Export {
        /// Note ids or unique id prefixes
        ids: Vec<String>,
    },
    /// Show library statistics
    Stats,
    /// Show the category table
    Categories,
    /// Exit, discarding any running recording
    #[command(alias = "exit")]
    Quit,
}

/// Filters for `list`.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct ListArgs {
    /// Only this category
    #[arg(long, short)]
    pub category: Option<Category>,
    /// Match titles and tags
    #[arg(long, short)]
    pub search: Option<String>,
    /// Order of the listing
    #[arg(long, value_enum, default_value_t = SortBy::Newest)]
    pub sort: SortBy,
    /// Created on or after this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub since: Option<NaiveDate>,
    /// Created on or before this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub until: Option<NaiveDate>,
    /// Only favourites
    #[arg(long, short)]
    pub favorites: bool,
}

impl ListArgs {
    /// Library filter for these arguments.
    pub fn to_filter(&self) -> FilterOptions {
        let date_range = match (self.since, self.until) {
            (None, None) => None,
            (since, until) => Some((
                since.map(start_of_day).unwrap_or(DateTime::<Utc>::MIN_UTC),
                until.map(end_of_day).unwrap_or(DateTime::<Utc>::MAX_UTC),
            )),
        };

        FilterOptions {
            category: self.category,
            search_query: self.search.clone().unwrap_or_default(),
            sort_by: self.sort,
            date_range,
        }
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|t| t.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Blank line.
    Empty,
    /// A command for the application.
    Command(AppCommand),
    /// Help text to print.
    Help(String),
}

/// Split a line shell-style and parse it as a command.
#[track_caller]
pub fn parse_line(line: &str) -> AppResult<ParsedLine> {
    let words = shell_words::split(line).map_err(|e| AppError::CommandError {
        reason: format!("Could not split input: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if words.is_empty() {
        return Ok(ParsedLine::Empty);
    }

    match CommandLine::try_parse_from(words) {
        Ok(parsed) => Ok(ParsedLine::Command(parsed.command)),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion => Ok(ParsedLine::Help(e.render().to_string())),
            _ => Err(AppError::CommandError {
                reason: e.render().to_string().trim_end().to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        },
    }
}
