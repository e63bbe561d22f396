//! `studify` command-line front-end.
//!
//! # Responsibility
//! - Wire config → cipher → persister → repository → service once per run.
//! - Run exactly one service operation and print the result as JSON.
//!
//! # Invariants
//! - Errors go to stderr as `error[<code>]: <message>` with exit status 1.
//! - The cipher key is never printed or logged.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use studify_core::config::{
    CIPHER_KEY_ENV, DATA_PATH_ENV, DEFAULT_DATA_PATH, LOG_DIR_ENV, LOG_LEVEL_ENV,
};
use studify_core::{
    core_version, default_log_level, init_logging, AddGradesRequest, AesGcmCipher,
    EncryptedJsonPersister, FullNameRequest, InMemoryStudentRepository, ServiceError,
    SnapshotCipher, StoreConfig, StudentCreateRequest, StudentIdRequest, StudentService,
    StudentUpdateRequest, StudentValidator,
};

/// Manage the encrypted student record store.
#[derive(Parser)]
#[command(name = "studify")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Encrypted snapshot file
    #[arg(
        long,
        global = true,
        env = DATA_PATH_ENV,
        default_value = DEFAULT_DATA_PATH,
        value_name = "FILE"
    )]
    data_path: PathBuf,

    /// AES-256-GCM key, exactly 32 bytes
    #[arg(long, global = true, env = CIPHER_KEY_ENV, hide_env_values = true)]
    cipher_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    /// Rolling log directory; logging is off when unset
    #[arg(long, global = true, env = LOG_DIR_ENV, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new student
    Register(StudentFields),
    /// Replace an existing student
    Update {
        id: String,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student by id
    Delete { id: String },
    /// Show one student by id
    Get { id: String },
    /// Find a student by exact name and surname
    Find {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
    },
    /// List all students
    List {
        /// Include each student's grades
        #[arg(long)]
        with_grades: bool,
    },
    /// Append grades to a student
    AddGrades {
        id: String,
        /// Comma-separated grades, e.g. `80,95`
        #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
        grades: Vec<i32>,
    },
    /// Show a student's average grade
    Average { id: String },
}

#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    surname: String,
    #[arg(long, allow_negative_numbers = true)]
    age: i32,
    /// Comma-separated grades, e.g. `90,60`
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    grades: Vec<i32>,
}

type Service = StudentService<InMemoryStudentRepository>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<ServiceError>()
                .map_or("config", ServiceError::code);
            eprintln!("error[{code}]: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|message| anyhow!(message))?;
    }
    info!("event=cli_start module=cli status=ok core_version={}", core_version());

    let key = cli
        .cipher_key
        .ok_or_else(|| anyhow!("cipher key is required (--cipher-key or {CIPHER_KEY_ENV})"))?;
    let config = StoreConfig::new(cli.data_path, key).context("invalid store configuration")?;
    let service = open_service(&config)?;

    match cli.command {
        Command::Register(fields) => print_json(&service.register(StudentCreateRequest {
            name: fields.name,
            surname: fields.surname,
            age: fields.age,
            grades: fields.grades,
        })?),
        Command::Update { id, fields } => print_json(&service.update(StudentUpdateRequest {
            id,
            name: fields.name,
            surname: fields.surname,
            age: fields.age,
            grades: fields.grades,
        })?),
        Command::Delete { id } => {
            service.delete_by_id(StudentIdRequest::new(id.clone()))?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Get { id } => print_json(&service.get_by_id(StudentIdRequest::new(id))?),
        Command::Find { name, surname } => {
            print_json(&service.get_by_full_name(FullNameRequest { name, surname })?)
        }
        Command::List { with_grades } => print_json(&service.list(with_grades)?),
        Command::AddGrades { id, grades } => {
            print_json(&service.add_grades(AddGradesRequest { id, grades })?)
        }
        Command::Average { id } => print_json(&service.average_by_id(StudentIdRequest::new(id))?),
    }
}

fn open_service(config: &StoreConfig) -> Result<Service> {
    let cipher: Arc<dyn SnapshotCipher> =
        Arc::new(AesGcmCipher::new(config.cipher_key()).context("invalid cipher key")?);
    let persister = Arc::new(EncryptedJsonPersister::new(config.data_path(), Some(cipher)));

    let validator = StudentValidator::new();
    let repo = InMemoryStudentRepository::with_persister(validator.clone(), persister.clone())
        .map_err(ServiceError::from)
        .with_context(|| format!("failed to open `{}`", persister.path().display()))?;
    Ok(StudentService::new(repo, validator))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
