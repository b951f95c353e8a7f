use clap::Subcommand;

use planbot_core::integrations::{oauth, GoogleCalendar, Todoist};
use planbot_core::Config;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Google Calendar: url / exchange
    Google {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Todoist: url / exchange
    Todoist {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Print the authorization URL to open in a browser
    Url,
    /// Exchange an authorization code for an access token
    Exchange {
        /// The code from the redirect callback
        code: String,
    },
}

pub async fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let http = reqwest::Client::new();

    let (oauth_config, url) = match &action {
        AuthAction::Google { .. } => (
            GoogleCalendar::oauth_config(&config.google, &config.redirect_uri),
            GoogleCalendar::auth_url(&config.google, &config.redirect_uri),
        ),
        AuthAction::Todoist { .. } => (
            Todoist::oauth_config(&config.todoist, &config.redirect_uri),
            Todoist::auth_url(&config.todoist, &config.redirect_uri),
        ),
    };

    let op = match action {
        AuthAction::Google { action } | AuthAction::Todoist { action } => action,
    };
    match op {
        AuthOp::Url => println!("{url}"),
        AuthOp::Exchange { code } => {
            let token = oauth::exchange_code(&http, &oauth_config, &code).await?;
            println!("{token}");
        }
    }
    Ok(())
}
