use chrono::{DateTime, Utc};
use colored::Colorize;
use uramix_core::api::AccountProfile;
use uramix_core::{
    MarketStatus, PlatformStats, RedemptionReceipt, Submission, SubmissionStatus, Wallet,
};

/// Basis points rendered as a percentage, e.g. 80 -> "0.80%".
pub fn percent(bps: u64) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn status_label(status: SubmissionStatus) -> String {
    match status {
        SubmissionStatus::Pending => "PENDING ".yellow().to_string(),
        SubmissionStatus::Verified => "VERIFIED".cyan().to_string(),
        SubmissionStatus::Redeemed => "REDEEMED".green().to_string(),
    }
}

pub fn print_profile(profile: &AccountProfile) {
    println!("  Account:      {}", profile.id.to_string().bold());
    println!(
        "  Credits:      {} ({})",
        profile.credits, profile.currency_value
    );
    println!("  Submissions:  {}", profile.submissions.len());
    println!("  Manure bought: {}", profile.manure_purchased);
    println!("  CO₂ reduced:  {}", percent(profile.co2_reduced_bps));
    println!(
        "  Bins:         organic {}% | inorganic {}%",
        profile.organic_bin, profile.inorganic_bin
    );
    println!("  Member since: {}", timestamp(&profile.created_at));
}

pub fn print_wallet(wallet: &Wallet) {
    println!("  Account:   {}", wallet.account.to_string().bold());
    println!(
        "  Balance:   {} credits ({})",
        wallet.credits.to_string().green(),
        wallet.currency_value
    );
    println!("  Withdrawn: {}", wallet.total_withdrawn);
    println!(
        "  Referral:  {}",
        if wallet.referral_used { "used" } else { "available" }
    );

    if !wallet.transactions.is_empty() {
        println!("\n  Recent transactions:");
        for tx in wallet.transactions.iter().rev().take(10) {
            let currency = tx.currency.map(|c| format!(" | {}", c)).unwrap_or_default();
            let reference = tx
                .reference
                .as_ref()
                .map(|r| format!(" | {}", r))
                .unwrap_or_default();
            println!(
                "    {} | {:?} | {} credits{}{}",
                timestamp(&tx.at),
                tx.kind,
                tx.credits,
                currency,
                reference
            );
        }
        if wallet.transactions.len() > 10 {
            println!("    ... and {} more", wallet.transactions.len() - 10);
        }
    }
}

pub fn print_submissions(submissions: &[Submission]) {
    if submissions.is_empty() {
        println!("  No submissions");
        return;
    }
    for sub in submissions {
        let detail = match (sub.quantity, sub.credits) {
            (Some(quantity), Some(credits)) => format!(" | {} | {} credits", quantity, credits),
            _ => String::new(),
        };
        let token = sub
            .token
            .as_ref()
            .map(|t| format!(" | {}", t))
            .unwrap_or_default();
        println!(
            "  {} {} | {} | {} | {}{}{}",
            status_label(sub.status),
            sub.id,
            sub.account,
            sub.category.as_str(),
            timestamp(&sub.requested_at),
            detail,
            token
        );
    }
}

pub fn print_receipt(receipt: &RedemptionReceipt) {
    println!("{}", "  Token redeemed".green().bold());
    println!("  Submission: {}", receipt.submission);
    println!("  Account:    {}", receipt.account);
    println!(
        "  Waste:      {} {}",
        receipt.quantity,
        receipt.category.as_str()
    );
    println!("  Credits:    +{}", receipt.credits);
    if let Some(manure) = receipt.manure_added {
        println!("  Manure:     +{} to market stock", manure);
    }
    println!("  CO₂:        {}", percent(receipt.co2_reduction_bps));
    println!("  Balance:    {} credits", receipt.balance);
}

pub fn print_market(market: &MarketStatus) {
    println!("  Stock:     {}", market.stock.to_string().bold());
    println!("  Price:     {}/kg", market.price_per_kg);
    println!(
        "  Sold:      {} across {} sale(s), revenue {}",
        market.total_sold, market.sales, market.revenue
    );
    println!("  Rate:      {} credits per ₹1", market.credits_per_rupee);
}

pub fn print_stats(stats: &PlatformStats) {
    println!("  Accounts:            {}", stats.accounts);
    println!(
        "  Submissions:         {} pending | {} verified | {} redeemed",
        stats.pending, stats.verified, stats.redeemed
    );
    println!("  Credits issued:      {}", stats.total_credits_issued);
    println!(
        "  Credits outstanding: {} ({})",
        stats.credits_outstanding, stats.currency_outstanding
    );
    println!("  Withdrawn:           {}", stats.total_withdrawn);
    println!(
        "  Manure:              {} in stock | {} sold | {} revenue",
        stats.manure_stock, stats.manure_sold, stats.revenue
    );
    println!("  CO₂ reduced:         {}", percent(stats.co2_reduced_bps));

    if !stats.daily_collected.is_empty() {
        println!("\n  Collected per day:");
        for day in &stats.daily_collected {
            println!("    {} | {}", day.date, day.quantity);
        }
    }
    if !stats.account_summaries.is_empty() {
        println!("\n  Accounts:");
        for summary in &stats.account_summaries {
            println!(
                "    {} | {} credits ({}) | {} submission(s) | {} manure",
                summary.id,
                summary.credits,
                summary.currency_value,
                summary.submissions,
                summary.manure_purchased
            );
        }
    }
}
