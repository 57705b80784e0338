use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exactmails_api::{
    ApiClient, ApiKeyService, AuthService, BugReportService, BugReportSubmission,
    CompanySearchRequest, DecisionMakerRequest, FinderService, FoundEmail, HistoryService,
    LinkedInSearchRequest, NotificationUpdate, PersonSearchRequest, ProfileInfoUpdate,
    SettingsService, SignupRequest, SubscriptionService, VerificationService,
};
use exactmails_core::{
    calculate_metrics, discovery_trend, models::status_label, recent_activity, records_from_wire,
    validate, ApiBackend, Config, Error, ExportFormat, Exporter, HistoryList, Session,
    SessionStore,
};

#[derive(Parser)]
#[command(name = "exactmails")]
#[command(version, about = "Terminal client for the Exact Mails email discovery platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in, sign up, and manage the session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Find email addresses
    Find {
        #[command(subcommand)]
        command: FindCommands,
    },
    /// Verify a single email address
    Verify {
        /// Email address to verify
        email: String,
    },
    /// Browse and manage search history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show dashboard metrics, the discovery trend, and recent activity
    Dashboard,
    /// Subscription plans and billing
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },
    /// Account and notification settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Report a bug to the Exact Mails team
    BugReport {
        #[command(subcommand)]
        command: BugReportCommands,
    },
    /// Manage the REST API key
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommands,
    },
    /// Launch the interactive terminal UI
    Tui,
}

#[derive(clap::Subcommand)]
enum AuthCommands {
    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear the stored session
    Signout,
    /// Show the signed-in profile
    Whoami,
    /// Confirm an email address with the token from the confirmation mail
    VerifyEmail {
        #[arg(long)]
        token: String,
    },
    /// Request a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    /// Print the Google sign-in URL to open in a browser
    GoogleUrl,
    /// Complete Google sign-in with the authorization code from the redirect
    GoogleCallback {
        #[arg(long)]
        code: String,
    },
}

#[derive(clap::Subcommand)]
enum FindCommands {
    /// Find a person's email from their name and company domain
    Person {
        #[arg(long)]
        name: String,
        #[arg(long)]
        domain: String,
    },
    /// Find verified emails across a company
    Company {
        #[arg(long)]
        company: String,
    },
    /// Find the email behind a LinkedIn profile
    Linkedin {
        #[arg(long)]
        url: String,
    },
    /// Find a decision maker's email at a company
    DecisionMaker {
        #[arg(long)]
        company: String,
        /// Role or name of the decision maker (e.g. "Head of Sales")
        #[arg(long)]
        role: String,
    },
}

#[derive(clap::Subcommand)]
enum HistoryCommands {
    /// List all search history records
    List {
        /// Print raw JSON instead of formatted rows
        #[arg(long)]
        json: bool,
    },
    /// Delete one record
    Delete {
        /// Record id
        id: i64,
    },
    /// Report a record as containing bad data
    Report {
        /// Record id
        id: i64,
        #[arg(long)]
        reason: String,
    },
    /// Export the search history to a file (.csv or .xlsx)
    Export {
        /// Output path; the extension picks the format
        #[arg(long)]
        output: String,
    },
}

#[derive(clap::Subcommand)]
enum SubscriptionCommands {
    /// List available plans
    Plans,
    /// Show the current subscription status
    Status,
    /// Create a payment-method setup intent
    SetupIntent,
    /// Start a trial on a plan
    StartTrial {
        #[arg(long)]
        plan: i64,
        #[arg(long)]
        payment_method: String,
    },
    /// Create or upgrade to a plan
    Upgrade {
        #[arg(long)]
        plan: i64,
        #[arg(long)]
        payment_method: String,
    },
    /// Turn automatic renewal on or off
    AutoRenew {
        #[arg(long)]
        enabled: bool,
    },
    /// Show the billing history
    History,
}

#[derive(clap::Subcommand)]
enum SettingsCommands {
    /// List notification preferences
    Notifications,
    /// Enable or disable one notification type
    SetNotification {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        enabled: bool,
    },
    /// Show profile info
    Profile,
    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Request an email address change (confirmed via mail)
    UpdateEmail {
        #[arg(long)]
        email: String,
    },
    /// Cancel a pending email address change
    CancelEmailUpdate,
    /// Set a new password
    UpdatePassword {
        #[arg(long)]
        password: String,
    },
    /// Disable the account
    DisableAccount {
        /// Required; disabling is not reversible from this client
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum BugReportCommands {
    /// Submit a bug report
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// List submitted bug reports
    List,
}

#[derive(clap::Subcommand)]
enum ApiKeyCommands {
    /// Show the API key and when it was last used
    Show,
    /// Rotate the API key
    Refresh,
    /// Show recent API activity
    Activity,
}

/// Everything a command handler needs, built once in main.
struct AppContext {
    config: Config,
    client: ApiClient,
    session: Session<ApiBackend>,
}

impl AppContext {
    fn build() -> anyhow::Result<Self> {
        let config = Config::load().context("failed to load configuration")?;
        let store = SessionStore::load().context("failed to load session")?;
        let client = ApiClient::new(config.api.base_url.clone(), store.token());
        let session = Session::new(ApiBackend::new(client.clone()), store);

        Ok(Self {
            config,
            client,
            session,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exactmails=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::build()?;

    match cli.command {
        Commands::Auth { command } => run_auth(&ctx, command).await,
        Commands::Find { command } => run_find(&ctx, command).await,
        Commands::Verify { email } => run_verify(&ctx, &email).await,
        Commands::History { command } => run_history(&ctx, command).await,
        Commands::Dashboard => run_dashboard(&ctx).await,
        Commands::Subscription { command } => run_subscription(&ctx, command).await,
        Commands::Settings { command } => run_settings(&ctx, command).await,
        Commands::BugReport { command } => run_bug_report(&ctx, command).await,
        Commands::ApiKey { command } => run_api_key(&ctx, command).await,
        Commands::Tui => run_tui(&ctx).await,
    }
}

async fn run_auth(ctx: &AppContext, command: AuthCommands) -> anyhow::Result<()> {
    match command {
        AuthCommands::Signin { email, password } => {
            validate::email_address(&email)?;
            match ctx.session.sign_in(&email, &password).await {
                Ok(()) => {
                    let name = ctx
                        .session
                        .user()
                        .map(|u| u.username)
                        .unwrap_or_else(|| email.clone());
                    println!("Signed in as {}", name);
                    print_credit_line(&ctx.session);
                }
                Err(Error::EmailNotVerified) => {
                    anyhow::bail!(
                        "This email address has not been verified yet. \
                         Check your inbox for the confirmation mail."
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        AuthCommands::Signup {
            username,
            email,
            password,
        } => {
            validate::email_address(&email)?;
            let message = ctx
                .session
                .sign_up(SignupRequest {
                    email,
                    username,
                    password,
                })
                .await?;
            println!("{}", message);
            println!("Verify your email address, then sign in.");
        }
        AuthCommands::Signout => {
            ctx.session.sign_out();
            println!("Signed out.");
        }
        AuthCommands::Whoami => {
            ctx.session.initialize().await?;
            match ctx.session.user() {
                Some(user) => {
                    println!("Username   {}", user.username);
                    println!("Email      {}", user.email);
                    if let Some(pending) = user.new_requested_email {
                        println!("Pending    {} (awaiting confirmation)", pending);
                    }
                    println!("Member for {} days", (Utc::now() - user.created_at).num_days());
                    print_credit_line(&ctx.session);
                    if let Some(subscription) = ctx.session.subscription() {
                        if subscription.has_subscription {
                            println!(
                                "Plan       {}{}",
                                subscription.plan_name.as_deref().unwrap_or("unknown"),
                                if subscription.is_trial() { " (trial)" } else { "" }
                            );
                        } else {
                            println!("Plan       none");
                        }
                    }
                }
                None => println!("Not signed in. Run `exactmails auth signin` first."),
            }
        }
        AuthCommands::VerifyEmail { token } => {
            let message = ctx.session.verify_email(&token).await?;
            println!("{}", message);
        }
        AuthCommands::ForgotPassword { email } => {
            validate::email_address(&email)?;
            AuthService::new(ctx.client.clone())
                .forgot_password(&email)
                .await
                .map_err(Error::from)?;
            println!("If that address has an account, a reset link is on its way.");
        }
        AuthCommands::ResetPassword { token, password } => {
            AuthService::new(ctx.client.clone())
                .renew_password(&token, &password)
                .await
                .map_err(Error::from)?;
            println!("Password updated. Sign in with the new one.");
        }
        AuthCommands::GoogleUrl => {
            let url = AuthService::new(ctx.client.clone())
                .google_auth_url(&ctx.config.api.google_redirect_uri)
                .await
                .map_err(Error::from)?;
            println!("{}", url);
        }
        AuthCommands::GoogleCallback { code } => {
            match ctx
                .session
                .handle_google_callback(&code, &ctx.config.api.google_redirect_uri)
                .await
            {
                Ok(()) => {
                    let name = ctx.session.user().map(|u| u.username).unwrap_or_default();
                    println!("Signed in as {}", name);
                }
                Err(Error::SignInInProgress) => {
                    anyhow::bail!("This sign-in code was already used.");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

fn print_credit_line(session: &Session<ApiBackend>) {
    if let Some(credits) = session.credits() {
        println!(
            "Credits    {} active, {} used",
            credits.active_credits,
            credits.used()
        );
    }
}

fn print_found_email(email: &FoundEmail) {
    println!(
        "  {}  {}  ({:.0}%)",
        status_label(email.status),
        email.email,
        email.success_rate
    );
}

async fn print_remaining_credits(ctx: &AppContext) {
    // Lookups consume credits server-side; refetch so the number is honest.
    match AuthService::new(ctx.client.clone()).credits().await {
        Ok(credits) => println!("Credits remaining: {}", credits.active_credits),
        Err(e) => tracing::warn!("could not refresh credits: {}", e),
    }
}

async fn run_find(ctx: &AppContext, command: FindCommands) -> anyhow::Result<()> {
    let finder = FinderService::new(ctx.client.clone());

    match command {
        FindCommands::Person { name, domain } => {
            validate::person_name(&name)?;
            validate::domain_or_company(&domain)?;
            let response = finder
                .find_person_email(&PersonSearchRequest {
                    username: name,
                    domain,
                })
                .await
                .map_err(Error::from)?;
            println!("Search #{}", response.search_history_id);
            print_found_email(&response.emails);
        }
        FindCommands::Company { company } => {
            validate::domain_or_company(&company)?;
            let response = finder
                .find_company_emails(&CompanySearchRequest {
                    company_name: company,
                })
                .await
                .map_err(Error::from)?;
            println!(
                "Search #{}: found {} emails",
                response.search_history_id,
                response.emails.len()
            );
            for email in &response.emails {
                print_found_email(email);
            }
        }
        FindCommands::Linkedin { url } => {
            validate::linkedin_url(&url)?;
            let response = finder
                .find_linkedin_email(&LinkedInSearchRequest { linkedin_url: url })
                .await
                .map_err(Error::from)?;
            println!("Search #{}", response.search_history_id);
            print_found_email(&response.emails);
        }
        FindCommands::DecisionMaker { company, role } => {
            validate::domain_or_company(&company)?;
            validate::person_name(&role)?;
            let response = finder
                .find_decision_maker_email(&DecisionMakerRequest {
                    company_name: company,
                    decision_maker: role,
                })
                .await
                .map_err(Error::from)?;
            println!("Search #{}", response.search_history_id);
            if let (Some(name), Some(company)) = (&response.name, &response.company) {
                println!("  {} at {}", name, company);
            }
            print_found_email(&response.emails);
            if let Some(url) = &response.linkedin_url {
                println!("  {}", url);
            }
        }
    }

    print_remaining_credits(ctx).await;
    Ok(())
}

async fn run_verify(ctx: &AppContext, email: &str) -> anyhow::Result<()> {
    validate::email_address(email)?;
    let report = VerificationService::new(ctx.client.clone())
        .verify(email)
        .await
        .map_err(Error::from)?;

    let check = |flag: bool| if flag { "yes" } else { "no" };
    println!("{}", report.email);
    println!("  Verified       {}", check(report.is_verified));
    println!("  Valid format   {}", check(report.is_valid_format));
    println!("  Free provider  {}", check(report.is_free_email));
    println!("  Disposable     {}", check(report.is_disposable_email));
    println!("  Role address   {}", check(report.is_role_email));
    println!("  Catch-all      {}", check(report.is_catchall_email));
    println!("  MX found       {}", check(report.is_mx_found));
    println!("  SMTP valid     {}", check(report.is_smtp_valid));
    println!("  Score          {:.0}", report.score);
    println!("  {}", report.message);

    print_remaining_credits(ctx).await;
    Ok(())
}

async fn run_history(ctx: &AppContext, command: HistoryCommands) -> anyhow::Result<()> {
    let service = HistoryService::new(ctx.client.clone());

    match command {
        HistoryCommands::List { json } => {
            let records = records_from_wire(service.search_history().await.map_err(Error::from)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }

            let mut list = HistoryList::new();
            list.merge(records);
            if list.is_empty() {
                println!("No search history yet.");
                return Ok(());
            }
            for record in list.records() {
                let (status, email) = match record.first_finding() {
                    Some(finding) => (
                        status_label(finding.status),
                        format!("{} ({:.0}%)", finding.email, finding.success_rate),
                    ),
                    None => ("Not Found", "No results".to_string()),
                };
                println!(
                    "#{:<6} {}  {:<22} {:<24} {:<10} {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.kind().to_string(),
                    record.subject().unwrap_or("Unknown"),
                    status,
                    email
                );
            }
        }
        HistoryCommands::Delete { id } => {
            service
                .delete(id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete the record: {}", e))?;
            // Only a confirmed delete reports success.
            println!("Record #{} deleted.", id);
        }
        HistoryCommands::Report { id, reason } => {
            service.report(id, &reason).await.map_err(Error::from)?;
            println!("Record #{} reported. Thanks for flagging it.", id);
        }
        HistoryCommands::Export { output } => {
            let format = std::path::Path::new(&output)
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ExportFormat::from_extension)
                .ok_or_else(|| anyhow::anyhow!("Use a .csv or .xlsx output path"))?;
            let payload = service.export(format.as_request()).await.map_err(Error::from)?;
            Exporter::save_to_file(&payload, &output)?;
            println!("Exported search history to {}", output);
        }
    }
    Ok(())
}

async fn run_dashboard(ctx: &AppContext) -> anyhow::Result<()> {
    let service = HistoryService::new(ctx.client.clone());
    let records = records_from_wire(service.search_history().await.map_err(Error::from)?);

    let mut list = HistoryList::new();
    list.merge(records);
    let now = Utc::now();

    let metrics = calculate_metrics(list.records(), now);
    println!("Total Searches   {}", metrics.total_searches);
    println!("Verified Emails  {}", metrics.verified_emails);
    println!("Success Rate     {:.1}%", metrics.success_rate);
    println!("Monthly Growth   {:+.1}%", metrics.monthly_growth);
    println!("Weekly Growth    {:+.1}%", metrics.weekly_growth);

    let trend = discovery_trend(list.records(), now);
    println!();
    println!(
        "Discovery trend ({}):",
        if trend.weekly { "this month, by week" } else { "last 6 months" }
    );
    for point in &trend.points {
        println!("  {:<8} {}", point.label, "#".repeat(point.count as usize));
    }

    let activity = recent_activity(list.records());
    if !activity.is_empty() {
        println!();
        println!("Recent activity:");
        for entry in activity {
            println!(
                "  {:<9} {:<36} {:>3.0}%  {}",
                entry.status, entry.email, entry.confidence, entry.time
            );
        }
    }
    Ok(())
}

async fn run_subscription(ctx: &AppContext, command: SubscriptionCommands) -> anyhow::Result<()> {
    let service = SubscriptionService::new(ctx.client.clone());

    match command {
        SubscriptionCommands::Plans => {
            for plan in service.plans().await.map_err(Error::from)? {
                println!(
                    "#{:<4} {:<16} ${:<8.2} {} credits / {} days{}",
                    plan.id,
                    plan.name,
                    plan.price,
                    plan.credits,
                    plan.duration_days,
                    if plan.trial_days > 0 {
                        format!(" ({}-day trial)", plan.trial_days)
                    } else {
                        String::new()
                    }
                );
            }
        }
        SubscriptionCommands::Status => {
            let status = service.status().await.map_err(Error::from)?;
            if !status.has_subscription {
                println!("No active subscription.");
                return Ok(());
            }
            println!("Plan        {}", status.plan_name.as_deref().unwrap_or("unknown"));
            if let Some(plan_status) = status.subscription_status {
                println!("Status      {:?}", plan_status);
            }
            if let Some(expiry) = status.expiry_date {
                println!("Expires     {}", expiry.format("%Y-%m-%d"));
            }
            if let Some(credits) = status.credits {
                println!("Credits     {}", credits);
            }
            if let Some(auto_renew) = status.auto_renew {
                println!("Auto-renew  {}", if auto_renew { "on" } else { "off" });
            }
        }
        SubscriptionCommands::SetupIntent => {
            let intent = service.create_setup_intent().await.map_err(Error::from)?;
            println!("{}", intent.client_secret);
        }
        SubscriptionCommands::StartTrial {
            plan,
            payment_method,
        } => {
            let created = service
                .start_trial(plan, &payment_method)
                .await
                .map_err(Error::from)?;
            println!("Trial started: subscription {}", created.subscription_id);
        }
        SubscriptionCommands::Upgrade {
            plan,
            payment_method,
        } => {
            let created = service
                .create_or_upgrade(plan, &payment_method)
                .await
                .map_err(Error::from)?;
            println!("Subscription active: {}", created.subscription_id);
        }
        SubscriptionCommands::AutoRenew { enabled } => {
            service.set_auto_renew(enabled).await.map_err(Error::from)?;
            println!("Auto-renew {}.", if enabled { "enabled" } else { "disabled" });
        }
        SubscriptionCommands::History => {
            for entry in service.history().await.map_err(Error::from)? {
                println!(
                    "{}  {:<12} ${:<8.2} {}",
                    entry.action_date.format("%Y-%m-%d"),
                    entry.action_type,
                    entry.payment,
                    entry.description
                );
            }
        }
    }
    Ok(())
}

async fn run_settings(ctx: &AppContext, command: SettingsCommands) -> anyhow::Result<()> {
    let service = SettingsService::new(ctx.client.clone());

    match command {
        SettingsCommands::Notifications => {
            for setting in service.notifications().await.map_err(Error::from)? {
                println!(
                    "#{:<4} [{}] {:<24} {}",
                    setting.notification_type_id,
                    if setting.enabled { "x" } else { " " },
                    setting.name,
                    setting.description
                );
            }
        }
        SettingsCommands::SetNotification { id, enabled } => {
            let response = service
                .update_notifications(&[NotificationUpdate {
                    notification_type_id: id,
                    enabled,
                }])
                .await
                .map_err(Error::from)?;
            println!("{}", response.message);
        }
        SettingsCommands::Profile => {
            let info = service.profile_info().await.map_err(Error::from)?;
            println!("Username  {}", info.username);
            println!("Role      {}", info.role);
            println!("Company   {}", info.company_name);
        }
        SettingsCommands::UpdateProfile {
            username,
            role,
            company,
        } => {
            if username.is_none() && role.is_none() && company.is_none() {
                anyhow::bail!("Nothing to update; pass --username, --role, or --company");
            }
            let response = service
                .update_profile_info(&ProfileInfoUpdate {
                    new_username: username,
                    new_role: role,
                    new_company_name: company,
                })
                .await
                .map_err(Error::from)?;
            println!("{}", response.message);
        }
        SettingsCommands::UpdateEmail { email } => {
            validate::email_address(&email)?;
            let response = service.request_email_update(&email).await.map_err(Error::from)?;
            println!("{}", response.message);
        }
        SettingsCommands::CancelEmailUpdate => {
            let response = service.cancel_email_update().await.map_err(Error::from)?;
            println!("{}", response.message);
        }
        SettingsCommands::UpdatePassword { password } => {
            let response = service.update_password(&password).await.map_err(Error::from)?;
            println!("{}", response.message);
        }
        SettingsCommands::DisableAccount { yes } => {
            if !yes {
                anyhow::bail!("Disabling an account needs --yes to confirm");
            }
            let response = service.disable_account().await.map_err(Error::from)?;
            println!("{}", response.message);
            ctx.session.sign_out();
        }
    }
    Ok(())
}

async fn run_bug_report(ctx: &AppContext, command: BugReportCommands) -> anyhow::Result<()> {
    let service = BugReportService::new(ctx.client.clone());

    match command {
        BugReportCommands::Submit { title, description } => {
            let report = service
                .submit(&BugReportSubmission { title, description })
                .await
                .map_err(Error::from)?;
            println!("Bug report #{} submitted ({}).", report.id, report.status);
        }
        BugReportCommands::List => {
            for report in service.list().await.map_err(Error::from)? {
                println!(
                    "#{:<5} {}  [{}] {}",
                    report.id,
                    report.created_at.format("%Y-%m-%d"),
                    report.status,
                    report.title
                );
            }
        }
    }
    Ok(())
}

async fn run_api_key(ctx: &AppContext, command: ApiKeyCommands) -> anyhow::Result<()> {
    let service = ApiKeyService::new(ctx.client.clone());

    match command {
        ApiKeyCommands::Show => {
            let details = service.details().await.map_err(Error::from)?;
            println!("API key    {}", details.api_key);
            match details.last_used {
                Some(last_used) => println!("Last used  {}", last_used.format("%Y-%m-%d %H:%M")),
                None => println!("Last used  never"),
            }
        }
        ApiKeyCommands::Refresh => {
            let key = service.refresh().await.map_err(Error::from)?;
            println!("New API key: {}", key);
            println!("The old key stopped working just now.");
        }
        ApiKeyCommands::Activity => {
            let activity = service.recent_activity().await.map_err(Error::from)?;
            if activity.is_empty() {
                println!("No recent API activity.");
                return Ok(());
            }
            for entry in activity {
                println!(
                    "{}  {:<40} {} credits",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.endpoint,
                    entry.credits_used
                );
            }
        }
    }
    Ok(())
}

async fn run_tui(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.session.initialize().await?;
    if !ctx.session.is_authenticated() {
        anyhow::bail!("Not signed in. Run `exactmails auth signin` first.");
    }

    let account_line = match (ctx.session.user(), ctx.session.credits()) {
        (Some(user), Some(credits)) => {
            format!("{} | {} credits", user.username, credits.active_credits)
        }
        (Some(user), None) => user.username,
        _ => String::new(),
    };

    let app = exactmails_tui::App::new(account_line);
    exactmails_tui::run_tui(
        app,
        HistoryService::new(ctx.client.clone()),
        ctx.config.ui.mouse_enabled,
    )
    .await
}
