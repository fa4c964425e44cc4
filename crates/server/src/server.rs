use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use uramix_core::account::MIN_PASSWORD_LEN;
use uramix_core::api::{
    AccountProfile, AddStockRequest, CreateSubmissionRequest, CredentialsRequest,
    FeedbackRequest, HealthResponse, InfoResponse, PreviewQuery, PriceResponse, PurchaseRequest,
    RedeemRequest, ReferralRequest, SetPriceRequest, StockResponse, VerifyRequest,
    WithdrawRequest,
};
use uramix_core::feedback::FeedbackEntry;
use uramix_core::{
    AccountId, CreditPreview, Inventory, MarketStatus, PlatformStats, RedemptionReceipt,
    ReferralReceipt, Sale, Store, Submission, SubmissionId, Wallet, WithdrawalReceipt,
};

use crate::accounts::AccountService;
use crate::config::ServerConfig;
use crate::error::{ApiError, Result};
use crate::market::MarketService;
use crate::redemption::RedemptionService;
use crate::submissions::SubmissionService;
use crate::wallet::WalletService;

const OPERATOR_KEY_HEADER: &str = "x-operator-key";
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<RwLock<Store>>,
    pub accounts: Arc<AccountService>,
    pub submissions: Arc<SubmissionService>,
    pub redemption: Arc<RedemptionService>,
    pub wallet: Arc<WalletService>,
    pub market: Arc<MarketService>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let inventory = Inventory::new(config.initial_stock, config.initial_price)?;
        let store = Arc::new(RwLock::new(Store::new(config.rates.clone(), inventory)?));
        info!(
            "Store ready: stock {}, price {}/kg, {} credits per rupee",
            config.initial_stock, config.initial_price, config.rates.credits_per_rupee
        );

        Ok(Self {
            accounts: Arc::new(AccountService::new(store.clone())),
            submissions: Arc::new(SubmissionService::new(store.clone())),
            redemption: Arc::new(RedemptionService::new(store.clone())),
            wallet: Arc::new(WalletService::new(store.clone())),
            market: Arc::new(MarketService::new(store.clone())),
            store,
            config,
        })
    }

    fn require_operator(&self, headers: &HeaderMap) -> Result<()> {
        let presented = headers
            .get(OPERATOR_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if self.config.is_operator_key(presented) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Operator routes check `x-operator-key`. Citizen routes trust the account id
/// named in the path or body; there is no per-user session.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(get_info))
        // Accounts
        .route("/accounts", post(signup))
        .route("/accounts/login", post(login))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id/wallet", get(get_wallet))
        .route("/accounts/:account_id/submissions", get(get_account_submissions))
        .route("/accounts/:account_id/referral", post(apply_referral))
        .route("/accounts/:account_id/withdraw", post(withdraw))
        // Submission lifecycle
        .route("/submissions", post(create_submission))
        .route("/submissions/pending", get(get_pending))
        .route("/submissions/preview", get(preview_credits))
        .route("/submissions/:submission_id/verify", post(verify_submission))
        .route("/redeem", post(redeem_token))
        // Marketplace
        .route("/market", get(get_market))
        .route("/market/purchase", post(purchase))
        .route("/market/stock", post(add_stock))
        .route("/market/price", post(set_price))
        .route("/market/sales", get(get_sales))
        // Operator views
        .route("/stats", get(get_stats))
        .route("/feedback", post(submit_feedback).get(get_feedback))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    // Use SmartIpKeyExtractor which handles both direct connections and proxied requests
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(state.config.rate_limit_per_second)
        .burst_size(state.config.rate_limit_burst)
        .key_extractor(tower_governor::key_extractor::SmartIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = router(state.clone()).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "URAMix server listening on {} (rate limited: {} req/s per IP)",
        addr, state.config.rate_limit_per_second
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(), // for providing ConnectInfo for rate limiting
    )
    .await?;
    Ok(())
}

fn account_id(raw: &str) -> Result<AccountId> {
    Ok(AccountId::new(raw)?)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn get_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        rates: state.config.rates.clone(),
        min_password_len: MIN_PASSWORD_LEN,
    })
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AccountProfile>> {
    let profile = state.accounts.signup(&req.account_id, &req.password).await?;
    Ok(Json(profile))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AccountProfile>> {
    let profile = state.accounts.login(&req.account_id, &req.password).await?;
    Ok(Json(profile))
}

async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<AccountProfile>> {
    let profile = state.accounts.profile(&account_id(&raw_id)?).await?;
    Ok(Json(profile))
}

async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Wallet>> {
    let wallet = state.wallet.wallet(&account_id(&raw_id)?).await?;
    Ok(Json(wallet))
}

async fn get_account_submissions(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Submission>>> {
    let submissions = state.submissions.for_account(&account_id(&raw_id)?).await?;
    Ok(Json(submissions))
}

async fn apply_referral(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Json(req): Json<ReferralRequest>,
) -> Result<Json<ReferralReceipt>> {
    let receipt = state
        .wallet
        .apply_referral(&account_id(&raw_id)?, &req.code)
        .await?;
    Ok(Json(receipt))
}

async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<WithdrawalReceipt>> {
    let receipt = state
        .wallet
        .withdraw(&account_id(&raw_id)?, req.credits)
        .await?;
    Ok(Json(receipt))
}

async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<Json<Submission>> {
    let submission = state
        .submissions
        .create(&req.account_id, req.category)
        .await?;
    Ok(Json(submission))
}

async fn get_pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Submission>>> {
    state.require_operator(&headers)?;
    Ok(Json(state.submissions.pending().await))
}

async fn preview_credits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<CreditPreview>> {
    let preview = state
        .submissions
        .preview(query.category, query.quantity_grams)
        .await?;
    Ok(Json(preview))
}

async fn verify_submission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Submission>> {
    state.require_operator(&headers)?;
    let id: SubmissionId = raw_id
        .parse()
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid submission id: {}", raw_id)))?;
    let submission = state.submissions.verify(id, req.quantity_grams).await?;
    Ok(Json(submission))
}

async fn redeem_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<RedemptionReceipt>> {
    state.require_operator(&headers)?;
    let receipt = state.redemption.redeem(&req.token).await?;
    Ok(Json(receipt))
}

async fn get_market(State(state): State<Arc<AppState>>) -> Json<MarketStatus> {
    Json(state.market.status().await)
}

async fn purchase(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<Sale>> {
    let sale = state
        .market
        .purchase(&req.account_id, req.quantity_grams)
        .await?;
    Ok(Json(sale))
}

async fn add_stock(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AddStockRequest>,
) -> Result<Json<StockResponse>> {
    state.require_operator(&headers)?;
    let stock = state.market.add_stock(req.quantity_grams).await;
    Ok(Json(StockResponse { stock }))
}

async fn set_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SetPriceRequest>,
) -> Result<Json<PriceResponse>> {
    state.require_operator(&headers)?;
    let previous = state.market.set_price(req.price_per_kg_paise).await?;
    Ok(Json(PriceResponse {
        previous,
        price_per_kg: req.price_per_kg_paise,
    }))
}

async fn get_sales(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Sale>>> {
    state.require_operator(&headers)?;
    Ok(Json(state.market.sales().await))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PlatformStats>> {
    state.require_operator(&headers)?;
    Ok(Json(state.store.read().await.statistics()))
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackEntry>> {
    let entry = state
        .accounts
        .submit_feedback(&req.name, &req.email, &req.message)
        .await?;
    Ok(Json(entry))
}

async fn get_feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<FeedbackEntry>>> {
    state.require_operator(&headers)?;
    Ok(Json(state.accounts.feedback().await))
}
