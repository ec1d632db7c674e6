use std::collections::BTreeSet;

use clap::{Parser, Subcommand};
use maternidad_core::config::{self, CoreConfig};
use maternidad_core::identity::{NewUser, UserDirectory};
use maternidad_core::provisioning::{ensure_default_admin, setup_roles};
use maternidad_core::roles::Group;
use maternidad_core::Rut;

#[derive(Parser)]
#[command(name = "maternidad")]
#[command(about = "Maternidad clinical records service CLI")]
struct Cli {
    /// Data directory (defaults to MATERNIDAD_DATA_DIR, then ./maternidad_data)
    #[arg(long, global = true)]
    data_dir: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the role groups and their permission sets
    SetupRoles,
    /// Seed the default administrator account if no superuser exists
    EnsureAdmin,
    /// Add a staff user account
    AddUser {
        /// Login username
        username: String,
        /// Initial password
        password: String,
        /// Full name
        full_name: String,
        /// Email address
        email: String,
        /// RUT (optional, any accepted written form)
        #[arg(long)]
        rut: Option<String>,
        /// Group membership, repeatable (administrador, medico, matrona, tens)
        #[arg(long = "group")]
        groups: Vec<String>,
        /// Grant superuser status
        #[arg(long)]
        superuser: bool,
    },
    /// Reset a user's password
    SetPassword {
        /// Login username
        username: String,
        /// New password
        password: String,
    },
    /// Deactivate a user account
    DeactivateUser {
        /// Login username
        username: String,
    },
    /// List all user accounts
    ListUsers,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = config::data_dir_from_env_value(
        cli.data_dir.or_else(|| std::env::var("MATERNIDAD_DATA_DIR").ok()),
    );
    let cfg = CoreConfig::with_data_dir(data_dir)?;

    match cli.command {
        Some(Commands::SetupRoles) => {
            let summary = setup_roles(&cfg)?;
            println!(
                "Groups provisioned: {} created, {} updated, {} unchanged",
                summary.created.len(),
                summary.updated.len(),
                summary.unchanged.len()
            );
        }
        Some(Commands::EnsureAdmin) => {
            let directory = UserDirectory::open(&cfg)?;
            if ensure_default_admin(&directory)? {
                println!("Default administrator created. Change its password now.");
            } else {
                println!("An active superuser already exists, nothing to do.");
            }
        }
        Some(Commands::AddUser {
            username,
            password,
            full_name,
            email,
            rut,
            groups,
            superuser,
        }) => {
            let rut = match rut.as_deref().map(Rut::normalize).transpose() {
                Ok(rut) => rut,
                Err(e) => {
                    eprintln!("Error adding user: invalid RUT: {}", e);
                    return Ok(());
                }
            };
            let parsed: Result<BTreeSet<Group>, _> =
                groups.iter().map(|g| g.parse::<Group>()).collect();
            let groups = match parsed {
                Ok(groups) => groups,
                Err(e) => {
                    eprintln!("Error adding user: {}", e);
                    return Ok(());
                }
            };
            let directory = UserDirectory::open(&cfg)?;
            match directory.add_user(NewUser {
                username,
                password,
                full_name,
                email,
                rut,
                groups,
                superuser,
            }) {
                Ok(record) => println!(
                    "Added user '{}' ({})",
                    record.username,
                    record.display_role().display_name()
                ),
                Err(e) => eprintln!("Error adding user: {}", e),
            }
        }
        Some(Commands::SetPassword { username, password }) => {
            let directory = UserDirectory::open(&cfg)?;
            match directory.set_password(&username, &password) {
                Ok(()) => println!("Password updated for '{}'", username),
                Err(e) => eprintln!("Error setting password: {}", e),
            }
        }
        Some(Commands::DeactivateUser { username }) => {
            let directory = UserDirectory::open(&cfg)?;
            match directory.deactivate(&username) {
                Ok(()) => println!("Deactivated '{}'", username),
                Err(e) => eprintln!("Error deactivating user: {}", e),
            }
        }
        Some(Commands::ListUsers) => {
            let directory = UserDirectory::open(&cfg)?;
            let users = directory.list();
            if users.is_empty() {
                println!("No users found.");
            } else {
                for user in users {
                    println!(
                        "{}: {} [{}] active={} superuser={}",
                        user.username,
                        user.full_name,
                        user.display_role().display_name(),
                        user.active,
                        user.superuser
                    );
                }
            }
        }
        None => {
            println!("Use 'maternidad --help' for commands");
        }
    }

    Ok(())
}
