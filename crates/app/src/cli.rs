//! Command-line arguments for the study tracker.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use services::logging::LogFormat;
use study_core::model::{OptionLabel, SubjectId};

#[derive(Debug, Parser)]
#[command(
    name = "study",
    version,
    about = "Daily study goals, streaks and multiple-choice practice by subject"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// `SQLite` URL or file path; overrides `STUDY_DB_URL`.
    #[arg(long = "db", value_name = "URL", global = true)]
    pub db: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show streak, today's progress and every subject.
    Status,

    /// Answer a session of questions on stdin.
    Study {
        /// Limit the session to one subject; all subjects otherwise.
        #[arg(long)]
        subject: Option<SubjectId>,
    },

    /// Change the number of correct answers needed per day.
    Goal { goal: u32 },

    /// Add a study note to a subject.
    AddNote {
        subject: SubjectId,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Add a multiple-choice question to a subject.
    ///
    /// A hint such as "Gabarito: B" in the text takes precedence over --correct.
    AddQuestion(AddQuestionArgs),

    /// Fill the built-in subjects with a few sample questions and notes.
    Seed,

    /// List the notes and questions stored for a subject.
    List { subject: SubjectId },
}

#[derive(Debug, clap::Args)]
pub struct AddQuestionArgs {
    pub subject: SubjectId,
    #[arg(long)]
    pub text: String,
    #[arg(short = 'a', long = "option-a")]
    pub option_a: String,
    #[arg(short = 'b', long = "option-b", default_value = "")]
    pub option_b: String,
    #[arg(short = 'c', long = "option-c", default_value = "")]
    pub option_c: String,
    #[arg(short = 'd', long = "option-d", default_value = "")]
    pub option_d: String,
    #[arg(long)]
    pub correct: Option<OptionLabel>,
    #[arg(long, default_value = "")]
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_question() {
        let cli = Cli::try_parse_from([
            "study",
            "add-question",
            "Matematica",
            "--text",
            "2+2?",
            "-a",
            "3",
            "-b",
            "4",
            "--correct",
            "B",
        ])
        .unwrap();

        let Command::AddQuestion(args) = cli.command else {
            panic!("expected add-question");
        };
        assert_eq!(args.subject, SubjectId::new("matematica"));
        assert_eq!(args.correct, Some(OptionLabel::B));
        assert_eq!(args.option_c, "");
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["study", "status", "-vv", "--db", "/tmp/s.db"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.db.as_deref(), Some("/tmp/s.db"));
    }

    #[test]
    fn rejects_unknown_option_label() {
        assert!(
            Cli::try_parse_from([
                "study", "add-question", "fisica", "--text", "x", "-a", "1", "--correct", "e",
            ])
            .is_err()
        );
    }
}
