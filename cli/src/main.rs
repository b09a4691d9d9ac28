use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tourbook::config::ConfigError;
use tourbook::guard::GuardDecision;
use tourbook::net::types::{
    Page, ProfileUpdate, ReservationCreate, ReservationQuery, ReservationStatus, ReservationUpdate, ReviewCreate,
    ReviewUpdate, TourCreate, TourQuery, TourUpdate, UserUpdate,
};
use tourbook::workflow::{TourDetailView, average_rating, can_access_admin, public_reviews};
use tourbook::{ApiError, App, ClientConfig, Session};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("sign in required for {from}; run `tourbook login` ({to})")]
    LoginRequired { from: String, to: String },
    #[error("admin account required for this command")]
    AdminRequired,
    #[error("session expired; sign in again ({login})")]
    SessionExpired { login: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tourbook", about = "Tour booking client")]
struct Cli {
    /// Backend base URL; overrides TOURBOOK_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Durable storage file; overrides TOURBOOK_STORAGE_PATH.
    #[arg(long)]
    storage: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TOURBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TOURBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Password {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
    },
    Profile(ProfileCommand),
    Account(AccountCommand),
    Tours(ToursCommand),
    Reservations(ReservationsCommand),
    Reviews(ReviewsCommand),
    /// What the tour page offers the current user.
    TourDetail {
        tour_id: i64,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Update {
        /// ISO date, e.g. 1990-04-12.
        #[arg(long)]
        date_of_birth: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Subcommand, Debug)]
enum AccountSubcommand {
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    offset: Option<u32>,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Self { limit: args.limit, offset: args.offset }
    }
}

#[derive(Args, Debug)]
struct ToursCommand {
    #[command(subcommand)]
    command: ToursSubcommand,
}

#[derive(Subcommand, Debug)]
enum ToursSubcommand {
    List {
        #[arg(long)]
        city: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Get {
        tour_id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        agency: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        city: String,
        #[arg(long)]
        payment_terms: Option<String>,
    },
    Update {
        tour_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        agency: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        payment_terms: Option<String>,
    },
    Delete {
        tour_id: i64,
    },
}

#[derive(Args, Debug)]
struct ReservationsCommand {
    #[command(subcommand)]
    command: ReservationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReservationsSubcommand {
    Mine {
        #[command(flatten)]
        page: PageArgs,
    },
    Get {
        reservation_id: i64,
    },
    Create {
        tour_id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    Update {
        reservation_id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        reservation_id: i64,
    },
    AdminList {
        #[arg(long)]
        status: Option<ReservationStatus>,
        #[command(flatten)]
        page: PageArgs,
    },
    Confirm {
        reservation_id: i64,
    },
    Reject {
        reservation_id: i64,
    },
    Stats,
}

#[derive(Args, Debug)]
struct ReviewsCommand {
    #[command(subcommand)]
    command: ReviewsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReviewsSubcommand {
    List {
        tour_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Mine {
        tour_id: i64,
    },
    Create {
        tour_id: i64,
        #[arg(long)]
        text: String,
        /// 1 to 10.
        #[arg(long)]
        rating: i32,
    },
    Update {
        review_id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        rating: Option<i32>,
    },
    Delete {
        review_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(cli.api_url.as_deref(), cli.storage.as_deref(), |key| std::env::var(key).ok())?;

    tracing::debug!(api_url = %config.api_url, storage = %config.storage_path, "client configured");
    let app = App::open(config)?;
    app.start().await;

    if let Some(route) = cli.command.route() {
        if let GuardDecision::Redirect { to, from } = app.navigate(&route) {
            return Err(CliError::LoginRequired { from, to });
        }
    }
    authorize(&cli.command, &app.session().snapshot())?;

    let result = run(&app, cli.command).await;
    if app.process_signals() > 0 {
        return Err(CliError::SessionExpired { login: app.location().path });
    }
    print_json(&result?)
}

/// Environment config with the command-line flags taking priority.
fn load_config<F>(api_url: Option<&str>, storage: Option<&str>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    ClientConfig::from_lookup(|key| {
        let flag = match key {
            "TOURBOOK_API_URL" => api_url,
            "TOURBOOK_STORAGE_PATH" => storage,
            _ => None,
        };
        flag.map(str::to_owned).or_else(|| env(key))
    })
}

/// Admin commands need a verified admin user on top of the login guard.
fn authorize(command: &Command, session: &Session) -> Result<(), CliError> {
    if command.requires_admin() && !can_access_admin(session) {
        return Err(CliError::AdminRequired);
    }
    Ok(())
}

impl Command {
    fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::Reservations(ReservationsCommand {
                command: ReservationsSubcommand::AdminList { .. }
                    | ReservationsSubcommand::Confirm { .. }
                    | ReservationsSubcommand::Reject { .. }
                    | ReservationsSubcommand::Stats,
            })
        )
    }

    /// Screen the command corresponds to, for guarded navigation.
    fn route(&self) -> Option<String> {
        let path = match self {
            Self::Login { .. } | Self::Register { .. } | Self::Logout => return None,
            Self::Whoami | Self::Password { .. } | Self::Profile(_) | Self::Account(_) => "/profile".to_owned(),
            Self::Tours(tours) => match &tours.command {
                ToursSubcommand::List { .. } => "/tours".to_owned(),
                ToursSubcommand::Get { tour_id } => format!("/tours/{tour_id}"),
                ToursSubcommand::Create { .. } => "/tours/new".to_owned(),
                ToursSubcommand::Update { tour_id, .. } | ToursSubcommand::Delete { tour_id } => {
                    format!("/tours/{tour_id}/edit")
                }
            },
            Self::Reservations(reservations) => match &reservations.command {
                ReservationsSubcommand::AdminList { .. }
                | ReservationsSubcommand::Confirm { .. }
                | ReservationsSubcommand::Reject { .. }
                | ReservationsSubcommand::Stats => "/admin/reservations".to_owned(),
                _ => "/reservations".to_owned(),
            },
            Self::Reviews(reviews) => match &reviews.command {
                ReviewsSubcommand::List { tour_id, .. }
                | ReviewsSubcommand::Mine { tour_id }
                | ReviewsSubcommand::Create { tour_id, .. } => format!("/tours/{tour_id}"),
                ReviewsSubcommand::Update { .. } | ReviewsSubcommand::Delete { .. } => "/reservations".to_owned(),
            },
            Self::TourDetail { tour_id } => format!("/tours/{tour_id}"),
        };
        Some(path)
    }
}

async fn run(app: &App, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Login { username, password } => {
            app.session().login(&username, &password).await?;
            session_json(app)
        }
        Command::Register { username, email, password } => {
            app.session().register(&username, &email, &password).await?;
            session_json(app)
        }
        Command::Logout => {
            app.session().logout();
            Ok(json!({ "logged_out": true }))
        }
        Command::Whoami => session_json(app),
        Command::Password { current_password, new_password } => {
            app.api().auth().change_password(&current_password, &new_password).await?;
            Ok(json!({ "password_changed": true }))
        }
        Command::Profile(profile) => run_profile(app, profile).await,
        Command::Account(account) => match account.command {
            AccountSubcommand::Update { username, email } => {
                let user = app.api().auth().update_user(&UserUpdate { username, email }).await?;
                app.session().fetch_user().await;
                Ok(serde_json::to_value(user)?)
            }
        },
        Command::Tours(tours) => run_tours(app, tours).await,
        Command::Reservations(reservations) => run_reservations(app, reservations).await,
        Command::Reviews(reviews) => run_reviews(app, reviews).await,
        Command::TourDetail { tour_id } => run_tour_detail(app, tour_id).await,
    }
}

async fn run_profile(app: &App, profile: ProfileCommand) -> Result<Value, CliError> {
    let auth = app.api().auth();
    match profile.command {
        ProfileSubcommand::Show => Ok(serde_json::to_value(auth.profile().await?)?),
        ProfileSubcommand::Update { date_of_birth } => {
            Ok(serde_json::to_value(auth.update_profile(&ProfileUpdate { date_of_birth }).await?)?)
        }
    }
}

async fn run_tours(app: &App, tours: ToursCommand) -> Result<Value, CliError> {
    let api = app.api().tours();
    match tours.command {
        ToursSubcommand::List { city, page } => {
            let query = TourQuery { limit: page.limit, offset: page.offset, city };
            Ok(serde_json::to_value(api.list(&query).await?)?)
        }
        ToursSubcommand::Get { tour_id } => Ok(serde_json::to_value(api.get(tour_id).await?)?),
        ToursSubcommand::Create { title, agency, description, start_date, end_date, price, city, payment_terms } => {
            let payload = TourCreate { title, agency, description, start_date, end_date, price, city, payment_terms };
            Ok(serde_json::to_value(api.create(&payload).await?)?)
        }
        ToursSubcommand::Update {
            tour_id,
            title,
            agency,
            description,
            start_date,
            end_date,
            price,
            city,
            payment_terms,
        } => {
            let payload = TourUpdate { title, agency, description, start_date, end_date, price, city, payment_terms };
            Ok(serde_json::to_value(api.update(tour_id, &payload).await?)?)
        }
        ToursSubcommand::Delete { tour_id } => {
            api.delete(tour_id).await?;
            Ok(json!({ "deleted": tour_id }))
        }
    }
}

async fn run_reservations(app: &App, reservations: ReservationsCommand) -> Result<Value, CliError> {
    let api = app.api().reservations();
    match reservations.command {
        ReservationsSubcommand::Mine { page } => Ok(serde_json::to_value(api.mine(page.into()).await?)?),
        ReservationsSubcommand::Get { reservation_id } => Ok(serde_json::to_value(api.get(reservation_id).await?)?),
        ReservationsSubcommand::Create { tour_id, notes } => {
            Ok(serde_json::to_value(api.create(&ReservationCreate { tour_id, notes }).await?)?)
        }
        ReservationsSubcommand::Update { reservation_id, notes } => {
            let payload = ReservationUpdate { notes, status: None };
            Ok(serde_json::to_value(api.update(reservation_id, &payload).await?)?)
        }
        ReservationsSubcommand::Delete { reservation_id } => {
            api.delete(reservation_id).await?;
            Ok(json!({ "deleted": reservation_id }))
        }
        ReservationsSubcommand::AdminList { status, page } => {
            let query = ReservationQuery { limit: page.limit, offset: page.offset, status };
            Ok(serde_json::to_value(api.all(&query).await?)?)
        }
        ReservationsSubcommand::Confirm { reservation_id } => {
            Ok(serde_json::to_value(api.confirm(reservation_id).await?)?)
        }
        ReservationsSubcommand::Reject { reservation_id } => Ok(serde_json::to_value(api.reject(reservation_id).await?)?),
        ReservationsSubcommand::Stats => Ok(serde_json::to_value(api.stats().await?)?),
    }
}

async fn run_reviews(app: &App, reviews: ReviewsCommand) -> Result<Value, CliError> {
    let api = app.api().reviews();
    match reviews.command {
        ReviewsSubcommand::List { tour_id, page } => Ok(serde_json::to_value(api.for_tour(tour_id, page.into()).await?)?),
        ReviewsSubcommand::Mine { tour_id } => Ok(serde_json::to_value(api.mine_for_tour(tour_id).await?)?),
        ReviewsSubcommand::Create { tour_id, text, rating } => {
            Ok(serde_json::to_value(api.create(&ReviewCreate { tour_id, text, rating }).await?)?)
        }
        ReviewsSubcommand::Update { review_id, text, rating } => {
            Ok(serde_json::to_value(api.update(review_id, &ReviewUpdate { text, rating }).await?)?)
        }
        ReviewsSubcommand::Delete { review_id } => {
            api.delete(review_id).await?;
            Ok(json!({ "deleted": review_id }))
        }
    }
}

async fn run_tour_detail(app: &App, tour_id: i64) -> Result<Value, CliError> {
    let tour = app.api().tours().get(tour_id).await?;
    let reviews = app.api().reviews().for_tour(tour_id, Page::default()).await?;
    let session = app.session().snapshot();

    let (reservations, mine) = if session.is_authenticated {
        let reservations = app.api().reservations().mine(Page::default()).await?;
        let mine = app.api().reviews().mine_for_tour(tour_id).await?;
        (reservations, mine)
    } else {
        (Vec::new(), None)
    };

    let view = TourDetailView::derive(&session, tour_id, &reservations, mine.as_ref(), false);
    Ok(json!({
        "tour": tour,
        "view": view,
        "average_rating": average_rating(&reviews),
        "my_review": mine,
        "reviews": public_reviews(&reviews, mine.as_ref()),
    }))
}

fn session_json(app: &App) -> Result<Value, CliError> {
    let session = app.session().snapshot();
    Ok(json!({
        "phase": format!("{:?}", session.phase()),
        "is_authenticated": session.is_authenticated,
        "user": session.user,
        "error": session.error,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
