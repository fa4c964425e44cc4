use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use uramix_core::api::{
    AccountProfile, AddStockRequest, CreateSubmissionRequest, CredentialsRequest, ErrorResponse,
    FeedbackRequest, HealthResponse, InfoResponse, PreviewQuery, PriceResponse, PurchaseRequest,
    RedeemRequest, ReferralRequest, SetPriceRequest, StockResponse, VerifyRequest,
    WithdrawRequest,
};
use uramix_core::feedback::FeedbackEntry;
use uramix_core::{
    AccountId, CreditPreview, Grams, MarketStatus, Paise, PlatformStats, RedemptionReceipt,
    ReferralReceipt, Sale, Submission, SubmissionId, TokenId, Wallet, WasteCategory,
    WithdrawalReceipt,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const OPERATOR_KEY_HEADER: &str = "x-operator-key";

pub struct UramixClient {
    client: Client,
    config: ClientConfig,
}

impl UramixClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid server URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid server URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("Server URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn operator(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let key = self
            .config
            .operator_key
            .as_deref()
            .ok_or(ClientError::MissingOperatorKey)?;
        Ok(request.header(OPERATOR_KEY_HEADER, key))
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Http(format!("Request failed: {}", e)))?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ClientError::Http(format!("JSON parse failed: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R> {
        self.send(self.client.get(self.url(segments)?)).await
    }

    async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<R> {
        self.send(self.client.post(self.url(segments)?).json(body))
            .await
    }

    async fn operator_get<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R> {
        let request = self.operator(self.client.get(self.url(segments)?))?;
        self.send(request).await
    }

    async fn operator_post<T: Serialize, R: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<R> {
        let request = self.operator(self.client.post(self.url(segments)?).json(body))?;
        self.send(request).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json(&["health"]).await
    }

    pub async fn info(&self) -> Result<InfoResponse> {
        self.get_json(&["info"]).await
    }

    // Accounts

    pub async fn signup(&self, account_id: &str, password: &str) -> Result<AccountProfile> {
        let body = CredentialsRequest {
            account_id: account_id.to_string(),
            password: password.to_string(),
        };
        self.post_json(&["accounts"], &body).await
    }

    pub async fn login(&self, account_id: &str, password: &str) -> Result<AccountProfile> {
        let body = CredentialsRequest {
            account_id: account_id.to_string(),
            password: password.to_string(),
        };
        self.post_json(&["accounts", "login"], &body).await
    }

    pub async fn profile(&self, account_id: &str) -> Result<AccountProfile> {
        self.get_json(&["accounts", account_id]).await
    }

    pub async fn wallet(&self, account_id: &str) -> Result<Wallet> {
        self.get_json(&["accounts", account_id, "wallet"]).await
    }

    pub async fn submissions_for(&self, account_id: &str) -> Result<Vec<Submission>> {
        self.get_json(&["accounts", account_id, "submissions"]).await
    }

    pub async fn apply_referral(&self, account_id: &str, code: &str) -> Result<ReferralReceipt> {
        let body = ReferralRequest {
            code: code.to_string(),
        };
        self.post_json(&["accounts", account_id, "referral"], &body)
            .await
    }

    pub async fn withdraw(&self, account_id: &str, credits: u64) -> Result<WithdrawalReceipt> {
        self.post_json(
            &["accounts", account_id, "withdraw"],
            &WithdrawRequest { credits },
        )
        .await
    }

    // Submissions

    pub async fn create_submission(
        &self,
        account_id: &AccountId,
        category: WasteCategory,
    ) -> Result<Submission> {
        let body = CreateSubmissionRequest {
            account_id: account_id.clone(),
            category,
        };
        self.post_json(&["submissions"], &body).await
    }

    pub async fn preview(&self, category: WasteCategory, quantity: Grams) -> Result<CreditPreview> {
        let query = PreviewQuery {
            category,
            quantity_grams: quantity,
        };
        let request = self
            .client
            .get(self.url(&["submissions", "preview"])?)
            .query(&query);
        self.send(request).await
    }

    pub async fn pending(&self) -> Result<Vec<Submission>> {
        self.operator_get(&["submissions", "pending"]).await
    }

    pub async fn verify(&self, id: SubmissionId, quantity: Grams) -> Result<Submission> {
        let id = id.0.to_string();
        self.operator_post(
            &["submissions", &id, "verify"],
            &VerifyRequest {
                quantity_grams: quantity,
            },
        )
        .await
    }

    pub async fn redeem(&self, token: &TokenId) -> Result<RedemptionReceipt> {
        self.operator_post(
            &["redeem"],
            &RedeemRequest {
                token: token.clone(),
            },
        )
        .await
    }

    // Marketplace

    pub async fn market(&self) -> Result<MarketStatus> {
        self.get_json(&["market"]).await
    }

    pub async fn purchase(&self, account_id: &AccountId, quantity: Grams) -> Result<Sale> {
        let body = PurchaseRequest {
            account_id: account_id.clone(),
            quantity_grams: quantity,
        };
        self.post_json(&["market", "purchase"], &body).await
    }

    pub async fn add_stock(&self, quantity: Grams) -> Result<StockResponse> {
        self.operator_post(
            &["market", "stock"],
            &AddStockRequest {
                quantity_grams: quantity,
            },
        )
        .await
    }

    pub async fn set_price(&self, price_per_kg: Paise) -> Result<PriceResponse> {
        self.operator_post(
            &["market", "price"],
            &SetPriceRequest {
                price_per_kg_paise: price_per_kg,
            },
        )
        .await
    }

    pub async fn sales(&self) -> Result<Vec<Sale>> {
        self.operator_get(&["market", "sales"]).await
    }

    // Operator views

    pub async fn stats(&self) -> Result<PlatformStats> {
        self.operator_get(&["stats"]).await
    }

    pub async fn submit_feedback(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<FeedbackEntry> {
        let body = FeedbackRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        };
        self.post_json(&["feedback"], &body).await
    }

    pub async fn feedback(&self) -> Result<Vec<FeedbackEntry>> {
        self.operator_get(&["feedback"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned response and hands back the raw request.
    async fn one_shot_server(status: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            UramixClient::new(config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_url_escapes_account_ids() {
        let client = UramixClient::new(ClientConfig::default()).unwrap();
        let url = client
            .url(&["accounts", "asha kumar@example.com", "wallet"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/accounts/asha%20kumar@example.com/wallet"
        );
    }

    #[tokio::test]
    async fn test_operator_call_needs_key() {
        let client = UramixClient::new(ClientConfig::default()).unwrap();
        let err = client.stats().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingOperatorKey));
    }

    #[tokio::test]
    async fn test_decodes_success_body() {
        let (url, server) = one_shot_server(
            "200 OK",
            r#"{"status":"ok","version":"0.1.0"}"#,
        )
        .await;
        let client = UramixClient::new(ClientConfig::default().with_base_url(&url)).unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert!(server.await.unwrap().starts_with("GET /health "));
    }

    #[tokio::test]
    async fn test_maps_error_body() {
        let (url, server) = one_shot_server(
            "409 Conflict",
            r#"{"success":false,"error":"Token already redeemed"}"#,
        )
        .await;
        let client = UramixClient::new(
            ClientConfig::default()
                .with_base_url(&url)
                .with_operator_key("s3cret"),
        )
        .unwrap();

        let err = client
            .redeem(&TokenId::parse("URX-abc"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "Server returned 409: Token already redeemed"
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /redeem "));
        assert!(request.contains("x-operator-key: s3cret"));
    }
}
