//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use jobboard_core::{Clock, JobBoardConfig, SystemClock};
use jobboard_http::types::{
    ApplicationCreate, ApplicationStatus, JobCreate, JobType, RegisterRequest,
};
use jobboard_http::{EmployerDashboard, FileTokenStore, JobFilters, SessionClient};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as an employer
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new employer account
    Register {
        #[arg(long)]
        company_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        contact_info: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the current session state
    Status,

    /// Show the logged-in employer's profile
    Me,

    /// Manage the employer's job postings
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Search public job postings
    Search {
        /// Filters as a URL query string, e.g. `search=rust&page=2`
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        job_type: Option<JobType>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// List job categories
    Categories,

    /// List locations with open postings
    Locations,

    /// Review applications received for a job
    Applications {
        #[command(subcommand)]
        command: ApplicationCommands,
    },

    /// Apply to a job posting
    Apply {
        job_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        resume_url: Option<String>,

        #[arg(long)]
        cover_letter: Option<String>,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// List the employer's postings
    List,

    /// Show one posting
    Show { id: String },

    /// Create a posting
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        job_type: Option<JobType>,

        #[arg(long)]
        category_id: Option<String>,

        #[arg(long)]
        salary_min: Option<f64>,

        #[arg(long)]
        salary_max: Option<f64>,
    },

    /// Delete a posting
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ApplicationCommands {
    /// List applications for a job
    List { job_id: String },

    /// Show one application
    Show { id: String },

    /// Change the review status of an application
    Status {
        id: String,

        /// pending, reviewed, shortlisted, rejected or hired
        status: ApplicationStatus,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a default configuration file
    Init {
        /// Output file path (defaults to <data-dir>/config.json)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Client, token store and cache wired together from the configuration
struct App {
    config: JobBoardConfig,
    client: SessionClient,
    dashboard: EmployerDashboard,
}

impl App {
    fn new(config: JobBoardConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(FileTokenStore::in_dir(&config.data_dir));

        let client = SessionClient::builder()
            .config(&config.api)
            .token_store(store)
            .clock(Arc::clone(&clock))
            .on_session_expired(|| {
                eprintln!("Session expired. Run `jobboard login` to sign in again.");
            })
            .build()
            .context("Failed to create API client")?;

        let dashboard = EmployerDashboard::new(client.clone(), &config.cache, clock);
        Ok(Self {
            config,
            client,
            dashboard,
        })
    }

    fn require_login(&self) -> Result<()> {
        if !self.client.is_authenticated() {
            bail!("Not logged in. Run `jobboard login` first.");
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Commands {
    pub async fn execute(self, config: JobBoardConfig) -> Result<()> {
        // Writing a config file must work even when the current one is unusable
        if let Self::Config { command } = self {
            return command.execute(&config);
        }

        let app = App::new(config)?;
        self.run(&app).await
    }

    async fn run(self, app: &App) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let response = app.client.login(&email, &password).await?;
                println!("Logged in as employer {}", response.employer_id);
                Ok(())
            }
            Self::Register {
                company_name,
                email,
                password,
                contact_info,
            } => {
                let profile = RegisterRequest {
                    company_name,
                    email,
                    password,
                    contact_info,
                };
                let response = app.client.register(&profile).await?;
                println!("Registered employer {}", response.employer_id);
                Ok(())
            }
            Self::Logout => {
                app.client.logout();
                app.dashboard.clear().await;
                println!("Logged out");
                Ok(())
            }
            Self::Status => show_status(app),
            Self::Me => {
                app.require_login()?;
                print_json(&app.dashboard.employer().await?)
            }
            Self::Jobs { command } => {
                app.require_login()?;
                command.execute(app).await
            }
            Self::Search {
                query,
                search,
                location,
                category,
                job_type,
                page,
                limit,
            } => {
                let mut filters = query
                    .as_deref()
                    .map(JobFilters::from_query)
                    .unwrap_or_default();
                filters.search = search.or(filters.search);
                filters.location = location.or(filters.location);
                filters.category = category.or(filters.category);
                filters.job_type = job_type.or(filters.job_type);
                filters.page = page.or(filters.page);
                filters.limit = limit.or(filters.limit);

                info!(query = %filters.to_query_string(), "Searching jobs");
                print_json(&app.client.search_jobs(&filters).await?)
            }
            Self::Categories => print_json(&app.client.list_categories().await?),
            Self::Locations => print_json(&app.client.list_locations().await?),
            Self::Applications { command } => {
                app.require_login()?;
                command.execute(app).await
            }
            Self::Apply {
                job_id,
                name,
                email,
                phone,
                resume_url,
                cover_letter,
            } => {
                let application = ApplicationCreate {
                    job_id,
                    applicant_name: name,
                    applicant_email: email,
                    phone,
                    resume_url,
                    cover_letter,
                };
                let submitted = app.client.submit_application(&application).await?;
                println!("Submitted application {}", submitted.id);
                Ok(())
            }
            Self::Config { command } => command.execute(&app.config),
        }
    }
}

fn show_status(app: &App) -> Result<()> {
    let state = app.client.session_state();
    if !state.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    println!("Logged in against {}", app.client.base_url());
    match state
        .token_expiry_ms
        .and_then(chrono::DateTime::from_timestamp_millis)
    {
        Some(expiry) => println!("Access token expires at {}", expiry.to_rfc3339()),
        None => println!("Access token expiry unknown"),
    }
    if app.client.is_token_expiring_soon() {
        println!("Access token will be refreshed on the next request");
    }
    Ok(())
}

impl JobCommands {
    async fn execute(self, app: &App) -> Result<()> {
        match self {
            Self::List => print_json(&app.dashboard.jobs().await?),
            Self::Show { id } => print_json(&app.client.get_job(&id).await?),
            Self::Create {
                title,
                description,
                location,
                job_type,
                category_id,
                salary_min,
                salary_max,
            } => {
                let job = JobCreate {
                    title,
                    description,
                    location,
                    job_type,
                    category_id,
                    salary_min,
                    salary_max,
                };
                let created = app.dashboard.create_job(&job).await?;
                println!("Created job {}", created.id);
                Ok(())
            }
            Self::Delete { id } => {
                app.dashboard.delete_job(&id).await?;
                println!("Deleted job {id}");
                Ok(())
            }
        }
    }
}

impl ApplicationCommands {
    async fn execute(self, app: &App) -> Result<()> {
        match self {
            Self::List { job_id } => print_json(&app.dashboard.applications(&job_id).await?),
            Self::Show { id } => print_json(&app.client.get_application(&id).await?),
            Self::Status { id, status } => {
                let updated = app.dashboard.update_application_status(&id, status).await?;
                println!("Application {} is now {}", updated.id, updated.status);
                Ok(())
            }
        }
    }
}

impl ConfigCommands {
    fn execute(self, config: &JobBoardConfig) -> Result<()> {
        match self {
            Self::Init { output, force } => {
                let config_path =
                    output.unwrap_or_else(|| JobBoardConfig::default_path(&config.data_dir));

                if config_path.exists() && !force {
                    bail!(
                        "{} already exists, pass --force to overwrite",
                        config_path.display()
                    );
                }

                config::generate_default_config(&config_path, &config.data_dir)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}
