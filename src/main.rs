use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use desk_api::{CareClient, PincodeDirectory};
use desk_core::config::{
    duration_ms_from_env_value, results_per_page_from_env_value, url_from_env_value,
};
use desk_core::constants::{AUTOFILL_NOTICE, PINCODE_DEBOUNCE};
use desk_core::{
    CurrentUser, DeskConfig, LocationCascade, Navigation, PatientNavigator, PatientRow,
    PatientSearch, RegistrationSession, Tier, UserRole,
};

const DEFAULT_CARE_API_URL: &str = "https://careapi.ohc.network";
const DEFAULT_PINCODE_API_URL: &str = "https://api.data.gov.in";

#[derive(Parser)]
#[command(name = "care-desk")]
#[command(about = "Patient search and registration desk for the CARE API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search patients
    Search {
        /// Search value
        value: String,
        /// Search widget: name, patient_no, phone_number or emergency_contact_number
        #[arg(long, default_value = "name")]
        field: String,
        /// Additional filters as a URL query string (e.g. "is_antenatal=true&gender=2")
        #[arg(long, default_value = "")]
        filters: String,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List geography options below the given selection
    Locations {
        #[arg(long)]
        state: Option<i64>,
        #[arg(long)]
        district: Option<i64>,
        #[arg(long)]
        local_body: Option<i64>,
    },
    /// Resolve state and district from a pincode
    Pincode {
        /// Six-digit Indian postal code
        pincode: String,
    },
    /// Work out where "add patient" navigates
    RegisterRoute {
        #[command(flatten)]
        user: UserArgs,
    },
    /// Work out where "discharged patients" navigates
    DischargedRoute {
        #[command(flatten)]
        user: UserArgs,
    },
}

#[derive(clap::Args)]
struct UserArgs {
    /// User role (e.g. Staff, Doctor, DistrictAdmin)
    #[arg(long)]
    role: UserRole,
    /// The user's home facility
    #[arg(long)]
    home_facility: Option<Uuid>,
    /// Facility chosen in the facility filter
    #[arg(long)]
    facility: Option<Uuid>,
}

impl UserArgs {
    fn user(&self) -> CurrentUser {
        CurrentUser {
            role: self.role,
            home_facility: self.home_facility,
        }
    }
}

/// Main entry point for the care-desk CLI
///
/// # Environment Variables
/// - `CARE_API_URL`: CARE API base URL (default: "https://careapi.ohc.network")
/// - `CARE_ACCESS_TOKEN`: bearer token for the CARE API (optional)
/// - `PINCODE_API_URL`: pincode directory base URL (default: "https://api.data.gov.in")
/// - `GOV_DATA_API_KEY`: pincode directory API key
/// - `RESULTS_PER_PAGE`: listing page size (default: 12)
/// - `PINCODE_DEBOUNCE_MS`: pincode quiet period (default: 1000)
/// - `AUTOFILL_NOTICE_MS`: auto-fill indicator duration (default: 2000)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("care_desk=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(load_config()?);
    let care = Arc::new(CareClient::new(&cfg)?);

    match cli.command {
        Commands::Search {
            value,
            field,
            filters,
            page,
        } => {
            let mut search = PatientSearch::new(cfg.results_per_page());
            search.store_mut().load_url(&filters);
            if !search.search(&field, &value) {
                tracing::warn!(%field, "search value not applied");
            }
            search.set_page(page);
            tracing::debug!(query = %search.store().to_url(), "listing filters");

            let today = chrono::Local::now().date_naive();
            match search.fetch(&*care, today).await? {
                None => println!("Enter a name, patient number or phone number to search."),
                Some(result) if result.results.is_empty() => println!("No patients found."),
                Some(result) => {
                    for item in &result.results {
                        let row = PatientRow::from_item(item, today);
                        println!(
                            "{} | {} | {} | {} | {}",
                            row.name,
                            row.patient_no.as_deref().unwrap_or("-"),
                            row.phone_number,
                            row.dob_cell(),
                            row.gender.unwrap_or("-"),
                        );
                    }
                    let pagination = search.pagination();
                    println!(
                        "Page {} of {} ({} patients)",
                        pagination.page,
                        pagination.total_pages(result.count),
                        result.count
                    );
                }
            }
        }
        Commands::Locations {
            state,
            district,
            local_body,
        } => {
            let mut cascade = LocationCascade::new();
            cascade.refresh(&*care, Tier::State).await;
            let mut shown = Tier::State;
            for (tier, id) in [
                (Tier::State, state),
                (Tier::District, district),
                (Tier::LocalBody, local_body),
            ] {
                let Some(id) = id else { break };
                cascade.select(tier, Some(id));
                if let Some(child) = tier.child() {
                    cascade.refresh(&*care, child).await;
                    shown = child;
                }
            }
            if cascade.options(shown).is_empty() {
                println!("No {} options.", shown.label());
            }
            for node in cascade.options(shown) {
                println!("{}\t{}", node.id, node.name);
            }
        }
        Commands::Pincode { pincode } => {
            let directory = Arc::new(PincodeDirectory::new(&cfg)?);
            let mut session = RegistrationSession::new(cfg.clone(), care.clone(), directory);
            if !session.load_states().await {
                anyhow::bail!("could not load states");
            }
            session.set_pincode(&pincode);
            if session.next_enrichment().await {
                let location = session.form().location();
                let name = |tier: Tier| {
                    location
                        .selected_node(tier)
                        .map_or("-", |n| n.name.as_str())
                };
                println!("State: {}", name(Tier::State));
                println!("District: {}", name(Tier::District));
            } else {
                println!("No locality found for {pincode}.");
            }
        }
        Commands::RegisterRoute { user } => {
            let current = user.user();
            let navigator = PatientNavigator::new(&*care, &current);
            print_navigation(navigator.add_patient(user.facility).await?);
        }
        Commands::DischargedRoute { user } => {
            let current = user.user();
            let navigator = PatientNavigator::new(&*care, &current);
            print_navigation(navigator.discharged_patients(user.facility).await?);
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<DeskConfig> {
    let api_base_url =
        url_from_env_value(std::env::var("CARE_API_URL").ok(), DEFAULT_CARE_API_URL)?;
    let pincode_api_url =
        url_from_env_value(std::env::var("PINCODE_API_URL").ok(), DEFAULT_PINCODE_API_URL)?;
    let results_per_page = results_per_page_from_env_value(std::env::var("RESULTS_PER_PAGE").ok())?;
    let pincode_debounce =
        duration_ms_from_env_value(std::env::var("PINCODE_DEBOUNCE_MS").ok(), PINCODE_DEBOUNCE)?;
    let autofill_notice =
        duration_ms_from_env_value(std::env::var("AUTOFILL_NOTICE_MS").ok(), AUTOFILL_NOTICE)?;

    let cfg = DeskConfig::new(api_base_url, pincode_api_url)
        .context("invalid service URL")?
        .with_access_token(std::env::var("CARE_ACCESS_TOKEN").ok())
        .with_pincode_api_key(std::env::var("GOV_DATA_API_KEY").ok())
        .with_results_per_page(results_per_page)?
        .with_timings(pincode_debounce, autofill_notice);

    tracing::info!(api = %cfg.api_base_url(), "configuration loaded");
    Ok(cfg)
}

fn print_navigation(navigation: Navigation) {
    match navigation {
        Navigation::Go(route) => println!("{route}"),
        Navigation::SelectFacility => println!("Select a facility to continue."),
        Navigation::Notify(notice) => println!("{}", notice.message()),
    }
}
