use agency_site::admin::{self, AdminAction, AdminContext, AdminOutcome, Section};
use agency_site::contact::{ContactForm, ContactMessage, HttpRelay};
use agency_site::fallback::{self, FallbackContent};
use agency_site::notify::{AssumeYes, Confirm, Silent};
use agency_site::output::{self, PrintNotifier, PromptConfirm};
use agency_site::provision::{self, JsonAuthDirectory};
use agency_site::store::JsonDirStore;
use agency_site::upload::{DirBucket, Folder, ImageFile, ImageUploader};
use agency_site::{config, generate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "agency-site")]
#[command(about = "Agency marketing site generator and content editor")]
#[command(long_about = "\
Agency marketing site generator and content editor

Content lives in a directory of JSON tables, one file per content type.
Sections with no stored content render built-in fallback content, so a fresh
project builds a complete site before anything is edited.

Project structure:

  ./
  ├── config.toml          # Site config (optional, see gen-config)
  ├── fallback.toml        # Overrides for the built-in fallback content
  ├── data/                # Content tables (hero_content.json, banners.json, ...)
  └── storage/cms-images/  # Uploaded images, copied into the build

Editing:

  agency-site admin                          # list sections
  agency-site admin banners list
  agency-site admin banners add
  agency-site admin banners set --id <id> title='Spring Sale' order_index:=0
  agency-site admin hero attach image_url photo.webp

Set AGENCY_SITE_LOG=debug for detailed logs.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Answer yes to confirmation prompts
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site into the output directory
    Build,
    /// Validate config and stored content without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Fill empty content tables with the fallback content
    Seed,
    /// Edit site content, one section at a time
    Admin {
        /// Section id (omit to list sections)
        section: Option<Section>,
        #[command(subcommand)]
        action: Option<ActionCommand>,
    },
    /// Upload an image and print its public URL
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "uploads")]
        folder: Folder,
    },
    /// Contact form relay
    Contact {
        #[command(subcommand)]
        command: ContactCommand,
    },
    /// Create the administrator account if it does not exist
    ProvisionAdmin {
        #[arg(long)]
        email: String,
        /// Environment variable holding the password
        #[arg(long, default_value = "AGENCY_SITE_ADMIN_PASSWORD")]
        password_env: String,
    },
}

#[derive(Subcommand)]
enum ActionCommand {
    /// List rows in display order
    List,
    /// Show one row (singletons take no id)
    Show { id: Option<String> },
    /// Add a placeholder row and print it
    Add,
    /// Set fields with key=value or key:=json and save
    Set {
        #[arg(long)]
        id: Option<String>,
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Upload an image into a field and save
    Attach {
        #[arg(long)]
        id: Option<String>,
        field: String,
        file: PathBuf,
    },
    /// Delete a row
    Delete { id: String },
}

impl From<ActionCommand> for AdminAction {
    fn from(command: ActionCommand) -> Self {
        match command {
            ActionCommand::List => AdminAction::List,
            ActionCommand::Show { id } => AdminAction::Show { id },
            ActionCommand::Add => AdminAction::Add,
            ActionCommand::Set { id, assignments } => AdminAction::Set { id, assignments },
            ActionCommand::Attach { id, field, file } => AdminAction::Attach { id, field, file },
            ActionCommand::Delete { id } => AdminAction::Delete { id },
        }
    }
}

#[derive(Subcommand)]
enum ContactCommand {
    /// Send a message through the configured relay
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("AGENCY_SITE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.root)?;
    let store = JsonDirStore::new(config.data_dir(&cli.root));
    let bucket = DirBucket::new(
        config.storage_dir(&cli.root),
        config.storage.bucket.clone(),
        config.storage.public_url.clone(),
    );
    let confirm: &dyn Confirm = if cli.yes { &AssumeYes } else { &PromptConfirm };

    match cli.command {
        Command::GenConfig => {}
        Command::Build => {
            println!("==> Building {} → {}", cli.root.display(), cli.output.display());
            let report = generate::build(&cli.root, &cli.output, &config)?;
            output::print_build_output(&report, &cli.output);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            FallbackContent::load(&cli.root)?;
            let ctx = AdminContext {
                store: &store,
                objects: &bucket,
                notifier: &Silent,
                confirm: &AssumeYes,
                cache: None,
            };
            for section in Section::ALL {
                let line = match admin::run(&ctx, section, AdminAction::List)? {
                    AdminOutcome::Rows(rows) => format!("{}: {} rows", section.id(), rows.len()),
                    AdminOutcome::NotSeeded { .. } => format!("{}: not seeded", section.id()),
                    _ => format!("{}: 1 row", section.id()),
                };
                println!("    {}", line);
            }
            println!("==> Content is valid");
        }
        Command::Seed => {
            let content = FallbackContent::load(&cli.root)?;
            let report = fallback::seed(&store, &content)?;
            output::print_seed_report(&report);
        }
        Command::Admin { section, action } => {
            let Some(section) = section else {
                output::print_sections();
                return Ok(());
            };
            let action = action.map(AdminAction::from).unwrap_or(AdminAction::List);
            let ctx = AdminContext {
                store: &store,
                objects: &bucket,
                notifier: &PrintNotifier,
                confirm,
                cache: None,
            };
            let outcome = admin::run(&ctx, section, action)?;
            output::print_admin_outcome(section, &outcome);
        }
        Command::Upload { file, folder } => {
            let image = ImageFile::read(&file)?;
            let url = ImageUploader::new(&bucket, &PrintNotifier).upload(&image, folder)?;
            println!("{}", url);
        }
        Command::Contact {
            command:
                ContactCommand::Send {
                    name,
                    email,
                    subject,
                    message,
                },
        } => {
            let relay = HttpRelay::new(config.contact.endpoint.clone());
            let mut form = ContactForm::with_fields(
                &config.contact,
                ContactMessage {
                    user_name: name,
                    user_email: email,
                    subject,
                    message,
                },
            );
            form.submit(&relay, &PrintNotifier)?;
        }
        Command::ProvisionAdmin { email, password_env } => {
            let password = std::env::var(&password_env)
                .map_err(|_| format!("set {password_env} to the admin password"))?;
            let directory = JsonAuthDirectory::new(&config.data_dir(&cli.root));
            let outcome = provision::provision_admin(&directory, &email, &password)?;
            output::print_provision(&outcome);
        }
    }

    Ok(())
}
