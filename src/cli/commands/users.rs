use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::models::Role;
use crate::services::user_service::MIN_PASSWORD_LENGTH;
use crate::services::NewAccount;
use crate::state::AppState;

const USERS_JSON: &str = include_str!("../../../fixtures/users.json");

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "Create the demo users (password P4$$w0rd), skipping existing emails")]
    Seed,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(help = "Email of the new administrator")]
        email: String,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
        #[arg(long, help = "First name", default_value = "")]
        first_name: String,
        #[arg(long, help = "Last name", default_value = "")]
        last_name: String,
    },
}

pub async fn handle(cmd: UsersCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UsersCommands::Seed => {
            let accounts = demo_accounts()?;
            let report = state
                .users
                .seed(accounts)
                .await
                .map_err(|e| anyhow!("seeding users failed: {:?}", e))?;

            if let OutputFormat::Text = output_format {
                for (email, created) in &report {
                    if *created {
                        println!("✓ User {} created", email);
                    } else {
                        println!("- User {} already exists", email);
                    }
                }
            }
            let created = report.iter().filter(|(_, created)| *created).count();
            let users: Vec<_> = report
                .iter()
                .map(|(email, created)| json!({ "email": email, "created": created }))
                .collect();
            output_success(
                output_format,
                &format!("{} of {} demo users created", created, report.len()),
                Some(json!({ "users": users })),
            )
        }
        UsersCommands::CreateAdmin {
            email,
            password,
            first_name,
            last_name,
        } => {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                anyhow::bail!("password must have at least {} characters", MIN_PASSWORD_LENGTH);
            }
            let user = state
                .users
                .create_account(admin_account(email, password, first_name, last_name))
                .await
                .map_err(|e| anyhow!("creating administrator failed: {:?}", e))?;
            output_success(
                output_format,
                &format!("Administrator {} created", user.email),
                Some(json!({ "id": user.id, "email": user.email })),
            )
        }
    }
}

pub fn demo_accounts() -> anyhow::Result<Vec<NewAccount>> {
    serde_json::from_str(USERS_JSON).context("malformed users fixture")
}

fn admin_account(email: String, password: String, first_name: String, last_name: String) -> NewAccount {
    NewAccount {
        email,
        password,
        first_name,
        last_name,
        phone: String::new(),
        role: Role::Admin,
        is_active: true,
        is_staff: true,
        is_superuser: true,
    }
}
