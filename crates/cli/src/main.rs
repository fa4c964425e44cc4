use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;

use uramix_client::{ClientConfig, UramixClient, DEFAULT_SERVER_URL};
use uramix_core::{AccountId, Grams, Paise, SubmissionId, TokenId, WasteCategory};

mod output;

#[derive(Parser, Debug)]
#[command(name = "uramix")]
#[command(about = "Submit waste, redeem tokens and trade manure on a URAMix server")]
struct Args {
    #[arg(short, long, env = "URAMIX_URL", default_value = DEFAULT_SERVER_URL)]
    url: String,

    /// Required for verify, redeem, pending, stock, price, sales, stats and feedback listing
    #[arg(long, env = "URAMIX_OPERATOR_KEY", hide_env_values = true)]
    operator_key: Option<String>,

    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Print raw JSON instead of the formatted summary
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the server's reward rates
    Info,
    /// Register a new account
    Signup { account: String, password: String },
    /// Check credentials and show the account profile
    Login { account: String, password: String },
    /// Show an account profile
    Profile { account: String },
    /// Request a pickup for a bin
    Submit {
        account: String,
        #[arg(value_name = "organic|inorganic")]
        category: WasteCategory,
    },
    /// Estimate credits for a quantity without submitting
    Preview {
        category: WasteCategory,
        /// Quantity in kg, e.g. 2.5
        kg: Grams,
    },
    /// List an account's submissions
    History { account: String },
    /// List submissions awaiting verification (operator)
    Pending,
    /// Weigh a pending submission and issue its token (operator)
    Verify {
        /// e.g. SUB-000001 or 1
        submission: SubmissionId,
        kg: Grams,
    },
    /// Redeem a token and credit its owner (operator)
    Redeem { token: String },
    /// Show balance and recent transactions
    Wallet { account: String },
    /// Convert credits to a payout
    Withdraw { account: String, credits: u64 },
    /// Apply the one-time referral bonus
    Referral { account: String, code: String },
    /// Show manure stock and price
    Market,
    /// Buy manure with credits
    Buy { account: String, kg: Grams },
    /// Add manure to stock (operator)
    Stock { kg: Grams },
    /// Set the manure price per kg in rupees (operator)
    Price { rupees: Paise },
    /// List manure sales (operator)
    Sales,
    /// Platform-wide statistics (operator)
    Stats,
    /// Send a message to the operators
    Feedback {
        name: String,
        email: String,
        message: String,
    },
    /// Read submitted feedback (operator)
    Inbox,
}

fn account_id(raw: &str) -> Result<AccountId> {
    AccountId::new(raw).map_err(|e| anyhow!("Invalid account id: {}", e))
}

fn emit<T: Serialize>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

async fn dispatch(client: &UramixClient, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Info => {
            let info = client.info().await?;
            emit(json, &info, |info| {
                let r = &info.rates;
                println!(
                    "  Base credits:   organic {} | inorganic {}",
                    r.organic_base_credits, r.inorganic_base_credits
                );
                println!(
                    "  Weight bonus:   {} credits/kg, capped at {}",
                    r.bonus_millicredits_per_kg as f64 / 1000.0,
                    r.bonus_cap
                );
                println!("  Manure yield:   {}‰ of organic weight", r.manure_yield_permille);
                println!("  Conversion:     {} credits per ₹1", r.credits_per_rupee);
                println!("  Min withdrawal: {} credits", r.min_withdrawal);
                println!("  Referral bonus: {} credits", r.referral_bonus);
                println!("  Min password:   {} characters", info.min_password_len);
            })
        }
        Command::Signup { account, password } => {
            let profile = client.signup(&account, &password).await?;
            println!("{}", "  Account created".green().bold());
            emit(json, &profile, output::print_profile)
        }
        Command::Login { account, password } => {
            let profile = client.login(&account, &password).await?;
            emit(json, &profile, output::print_profile)
        }
        Command::Profile { account } => {
            let profile = client.profile(&account).await?;
            emit(json, &profile, output::print_profile)
        }
        Command::Submit { account, category } => {
            let submission = client
                .create_submission(&account_id(&account)?, category)
                .await?;
            emit(json, &submission, |s| {
                println!(
                    "  {} requested for {} ({})",
                    s.id.to_string().bold(),
                    s.account,
                    s.category.as_str()
                );
                println!("  Awaiting verification");
            })
        }
        Command::Preview { category, kg } => {
            let preview = client.preview(category, kg).await?;
            emit(json, &preview, |p| {
                println!("  {} {}", p.quantity, p.category.as_str());
                println!("  Credits:  {}", p.credits);
                println!("  CO₂:      {}", output::percent(p.co2_reduction_bps));
                if let Some(manure) = p.manure_yield {
                    println!("  Manure:   {}", manure);
                }
            })
        }
        Command::History { account } => {
            let submissions = client.submissions_for(&account).await?;
            emit(json, &submissions, |s| output::print_submissions(s))
        }
        Command::Pending => {
            let submissions = client.pending().await?;
            emit(json, &submissions, |s| output::print_submissions(s))
        }
        Command::Verify { submission, kg } => {
            let verified = client.verify(submission, kg).await?;
            emit(json, &verified, |s| {
                println!("{}", "  Verified".green().bold());
                println!("  Submission: {}", s.id);
                if let (Some(quantity), Some(credits)) = (s.quantity, s.credits) {
                    println!("  Weighed:    {} ({} credits)", quantity, credits);
                }
                if let Some(token) = &s.token {
                    println!("  Token:      {}", token.to_string().bold());
                }
            })
        }
        Command::Redeem { token } => {
            let receipt = client.redeem(&TokenId::parse(&token)).await?;
            emit(json, &receipt, output::print_receipt)
        }
        Command::Wallet { account } => {
            let wallet = client.wallet(&account).await?;
            emit(json, &wallet, output::print_wallet)
        }
        Command::Withdraw { account, credits } => {
            let receipt = client.withdraw(&account, credits).await?;
            emit(json, &receipt, |r| {
                println!(
                    "  Withdrew {} credits for {}",
                    r.credits,
                    r.payout.to_string().green()
                );
                println!("  Remaining: {} credits", r.balance);
            })
        }
        Command::Referral { account, code } => {
            let receipt = client.apply_referral(&account, &code).await?;
            emit(json, &receipt, |r| {
                println!("  Referral bonus +{} credits", r.bonus);
                println!("  Balance: {} credits", r.balance);
            })
        }
        Command::Market => {
            let market = client.market().await?;
            emit(json, &market, output::print_market)
        }
        Command::Buy { account, kg } => {
            let sale = client.purchase(&account_id(&account)?, kg).await?;
            emit(json, &sale, |s| {
                println!(
                    "  Bought {} for {} ({} credits)",
                    s.quantity, s.amount, s.credits
                );
                println!("  Sale #{} at {}", s.id, output::timestamp(&s.at));
            })
        }
        Command::Stock { kg } => {
            let stock = client.add_stock(kg).await?;
            emit(json, &stock, |s| println!("  Stock now {}", s.stock))
        }
        Command::Price { rupees } => {
            let price = client.set_price(rupees).await?;
            emit(json, &price, |p| {
                println!("  Price {}/kg (was {}/kg)", p.price_per_kg, p.previous)
            })
        }
        Command::Sales => {
            let sales = client.sales().await?;
            emit(json, &sales, |sales| {
                if sales.is_empty() {
                    println!("  No sales yet");
                }
                for s in sales {
                    println!(
                        "  #{} | {} | {} | {} | {} credits | {}",
                        s.id,
                        output::timestamp(&s.at),
                        s.account,
                        s.quantity,
                        s.credits,
                        s.amount
                    );
                }
            })
        }
        Command::Stats => {
            let stats = client.stats().await?;
            emit(json, &stats, output::print_stats)
        }
        Command::Feedback {
            name,
            email,
            message,
        } => {
            let entry = client.submit_feedback(&name, &email, &message).await?;
            emit(json, &entry, |e| println!("  Feedback #{} received", e.id))
        }
        Command::Inbox => {
            let entries = client.feedback().await?;
            emit(json, &entries, |entries| {
                for e in entries {
                    println!(
                        "  #{} | {} | {} <{}>",
                        e.id,
                        output::timestamp(&e.at),
                        e.name,
                        e.email
                    );
                    println!("      {}", e.message);
                }
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::default()
        .with_base_url(&args.url)
        .with_timeout(args.timeout);
    if let Some(key) = &args.operator_key {
        config = config.with_operator_key(key);
    }
    let client = UramixClient::new(config)?;

    if let Err(e) = dispatch(&client, args.command, args.json).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
