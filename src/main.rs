#![forbid(unsafe_code)]

//! `quiz-client`: command-line front end for the practice-test backend.
//!
//! Replies and records print to stdout; status updates and logs go to
//! stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use quiz_client::api::{
    ApiClient, AssistantService, GradingService, QuestionService, SessionService, UserService,
};
use quiz_client::models::assistant::AssistantRequest;
use quiz_client::models::chat::{ChatTranscript, Sender};
use quiz_client::models::question::{AnswerValue, StudentAnswer};
use quiz_client::models::session::{SearchRequest, SessionMode};
use quiz_client::models::user::Credentials;
use quiz_client::stream::Envelope;
use quiz_client::{AppError, ClientConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Session mode selector; mirrors [`SessionMode`] for clap.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ModeArg {
    Practice,
    Test,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Practice => Self::Practice,
            ModeArg::Test => Self::Test,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "quiz-client", about = "Practice-test backend client", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Override the configured user id.
    #[arg(long)]
    user_id: Option<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the assistant a single question.
    Ask {
        /// Question text.
        question: String,
        /// Question being discussed.
        #[arg(long)]
        question_id: Option<String>,
        /// Practice session being discussed.
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Chat with the assistant interactively, one question per line.
    Chat {
        /// Practice session being discussed.
        #[arg(long)]
        session_id: Option<String>,
        /// Save the transcript as JSON when the chat ends.
        #[arg(long)]
        transcript: Option<PathBuf>,
        /// Continue a transcript saved by an earlier chat; it is saved back
        /// there unless `--transcript` is given.
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Create a practice session and print its id.
    CreateSession {
        /// Subject to draw questions from.
        #[arg(long)]
        subject: String,
        /// Topic within the subject (repeatable).
        #[arg(long = "topic", required = true)]
        topics: Vec<String>,
        /// Minimum number of questions.
        #[arg(long, default_value_t = 5)]
        min: u32,
        /// Maximum number of questions.
        #[arg(long, default_value_t = 10)]
        max: u32,
        /// Practice or test.
        #[arg(long, value_enum, default_value_t = ModeArg::Practice)]
        mode: ModeArg,
        /// Extra instructions for the question generator.
        #[arg(long)]
        instructions: Option<String>,
    },

    /// Show a session.
    Session {
        /// Session id.
        id: String,
    },

    /// List the questions of a session.
    Questions {
        /// Session id.
        session_id: String,
    },

    /// Show a question.
    Question {
        /// Question id.
        id: String,
    },

    /// Save an answer, given as JSON (`"text"`, `true`, `4.2`, `[[0,1]]`, `["a","b"]`).
    Answer {
        /// Question id.
        id: String,
        /// Answer as a JSON value.
        answer: String,
    },

    /// Grade a whole session.
    GradeSession {
        /// Session id.
        id: String,
    },

    /// Auto-grade a single question.
    GradeQuestion {
        /// Question id.
        id: String,
    },

    /// Grade a free-response question, streaming progress.
    GradeFreeResponse {
        /// Question id.
        id: String,
    },

    /// Show a stored assistant conversation.
    Conversation {
        /// Conversation id.
        id: String,
    },

    /// Create an account.
    Signup {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },

    /// Log in.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },

    /// Show a user.
    User {
        /// User id.
        id: String,
    },

    /// List the sessions of a user.
    UserSessions {
        /// User id.
        id: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
        .inspect_err(|err| error!(%err, "command failed"))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from_path(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(url) = args.base_url {
        config.set_base_url(url)?;
    }
    if args.user_id.is_some() {
        config.user_id = args.user_id;
    }
    info!(base_url = config.base_url.as_str(), "configuration loaded");

    let api = Arc::new(ApiClient::new(&config)?);
    let user_id = config.user_id.as_deref();

    match args.command {
        Command::Ask {
            question,
            question_id,
            session_id,
        } => {
            let mut request = AssistantRequest::new(question, user_id);
            request.question_id = question_id;
            request.session_id = session_id;
            let reply = AssistantService::new(api)
                .send_message(&request, print_status)
                .await?;
            println!("{reply}");
        }
        Command::Chat {
            session_id,
            transcript,
            resume,
        } => {
            let history = match &resume {
                Some(path) => {
                    let history = ChatTranscript::load(path)?;
                    info!(
                        path = %path.display(),
                        messages = history.messages.len(),
                        "transcript resumed"
                    );
                    history
                }
                None => ChatTranscript::new(session_id.clone()),
            };
            let session_id = session_id.or_else(|| history.practice_session_id.clone());
            chat_loop(
                AssistantService::new(api),
                user_id,
                session_id,
                history,
                transcript.or(resume),
            )
            .await?;
        }
        Command::CreateSession {
            subject,
            topics,
            min,
            max,
            mode,
            instructions,
        } => {
            if min > max {
                return Err(AppError::Config(format!(
                    "--min ({min}) must not exceed --max ({max})"
                )));
            }
            let request = SearchRequest {
                subject,
                topics,
                num_questions_range: (min, max),
                mode: mode.into(),
                special_instructions: instructions,
                user_id: config.user_id.clone(),
            };
            let sessions = SessionService::new(api);
            let create = sessions.create_session(&request, print_progress);
            let session_id = if config.session_timeout_seconds == 0 {
                create.await?
            } else {
                tokio::time::timeout(Duration::from_secs(config.session_timeout_seconds), create)
                    .await
                    .map_err(|_| {
                        AppError::Transport(format!(
                            "session creation timed out after {}s",
                            config.session_timeout_seconds
                        ))
                    })??
            };
            println!("{session_id}");
        }
        Command::Session { id } => {
            print_json(&SessionService::new(api).get_session(&id).await?)?;
        }
        Command::Questions { session_id } => {
            print_json(
                &SessionService::new(api)
                    .get_session_questions(&session_id)
                    .await?,
            )?;
        }
        Command::Question { id } => {
            print_json(&QuestionService::new(api).get_question(&id).await?)?;
        }
        Command::Answer { id, answer } => {
            let answer: AnswerValue = serde_json::from_str(&answer)
                .map_err(|err| AppError::Decode(format!("answer is not valid JSON: {err}")))?;
            let saved = QuestionService::new(api)
                .save_answer(&id, &StudentAnswer { answer })
                .await?;
            println!("{}", saved.message);
        }
        Command::GradeSession { id } => {
            print_json(&GradingService::new(api).grade_session(&id).await?)?;
        }
        Command::GradeQuestion { id } => {
            print_json(&GradingService::new(api).grade_question(&id).await?)?;
        }
        Command::GradeFreeResponse { id } => {
            GradingService::new(api)
                .grade_free_response(&id, print_progress)
                .await?;
            println!("grading finished");
        }
        Command::Conversation { id } => {
            print_json(&AssistantService::new(api).get_conversation(&id).await?)?;
        }
        Command::Signup { email, password } => {
            let user = UserService::new(api)
                .create_user(&Credentials { email, password })
                .await?;
            print_json(&user)?;
        }
        Command::Login { email, password } => {
            let login = UserService::new(api)
                .login(&Credentials { email, password })
                .await?;
            print_json(&login)?;
        }
        Command::User { id } => {
            print_json(&UserService::new(api).get_user(&id).await?)?;
        }
        Command::UserSessions { id } => {
            print_json(&UserService::new(api).get_user_sessions(&id).await?)?;
        }
    }

    Ok(())
}

/// Read questions from stdin until EOF, printing each reply and appending
/// the exchange to `transcript`.
async fn chat_loop(
    assistant: AssistantService,
    user_id: Option<&str>,
    session_id: Option<String>,
    mut transcript: ChatTranscript,
    transcript_path: Option<PathBuf>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        transcript.push(Sender::User, question);

        let mut request = AssistantRequest::new(question, user_id);
        request.session_id.clone_from(&session_id);

        match assistant.send_message(&request, print_status).await {
            Ok(reply) => {
                println!("{reply}");
                transcript.push(Sender::Assistant, reply);
            }
            Err(err) => {
                // The chat continues after a failed exchange.
                eprintln!("error: {err}");
                transcript.push(Sender::Assistant, format!("Sorry, something went wrong: {err}"));
            }
        }
    }

    if let Some(path) = transcript_path {
        transcript.save(&path)?;
        info!(
            path = %path.display(),
            messages = transcript.messages.len(),
            "transcript saved"
        );
    }
    Ok(())
}

fn print_status(status: &str) {
    eprintln!("… {status}");
}

fn print_progress(env: &Envelope) {
    match env.message() {
        Some(message) => eprintln!("… {message}"),
        None => eprintln!("… {}", serde_json::Value::Object(env.as_map().clone())),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
