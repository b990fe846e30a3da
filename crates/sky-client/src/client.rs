use crate::error::ApiError;
use crate::wire::{
    AiReport, CommandRequest, CommandResponse, CrewCostRequest, CrewRestRequest, DataSnapshot,
    FeedbackRequest, HealRequest, HealResponse, OptionRequest, PassengerFlight, ResolveRequest,
    SimulationRequest, StatusResponse, SupportRequest, SupportResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sky_config::DashboardConfig;
use sky_core::{FlightId, HealthStatus, OperatingMode, PilotId, RemediationOption};

/// The backend operations the dashboard workflow depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_snapshot(&self, page: u32, limit: u32) -> Result<DataSnapshot, ApiError>;
    async fn fetch_status(&self) -> Result<HealthStatus, ApiError>;
    async fn request_remediation(&self, mode: OperatingMode) -> Result<HealResponse, ApiError>;
    async fn resolve(&self, option: &RemediationOption) -> Result<(), ApiError>;
    async fn interpret_command(&self, command: &str) -> Result<CommandResponse, ApiError>;
    async fn seed(&self) -> Result<(), ApiError>;
    async fn simulate(&self, request: &SimulationRequest) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|err| ApiError::Url(err.to_string()))?;
        let client = Client::builder()
            .user_agent(format!("SkyCopilot-Console/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn passenger_flight(&self, flight_id: &FlightId) -> Result<PassengerFlight, ApiError> {
        let url = self.segments_url(&["passenger", "flight", flight_id.as_str()])?;
        let request = self.client.get(url);
        self.send_json(request, "passenger flight").await
    }

    pub async fn passenger_support(&self, message: &str, context: &str) -> Result<String, ApiError> {
        let body = SupportRequest { message, context };
        let response: SupportResponse = self
            .post_json("passenger/support", &body, "passenger support")
            .await?;
        Ok(response.response)
    }

    pub async fn passenger_feedback(
        &self,
        flight_id: &FlightId,
        rating: u8,
        comment: &str,
    ) -> Result<(), ApiError> {
        let body = FeedbackRequest {
            flight_id,
            rating,
            comment,
        };
        self.post_unit("passenger/feedback", &body, "passenger feedback")
            .await
    }

    pub async fn passenger_request_option(
        &self,
        flight_id: &FlightId,
        option_id: &str,
        email: &str,
    ) -> Result<(), ApiError> {
        let body = OptionRequest {
            flight_id,
            option_id,
            email,
        };
        self.post_unit("passenger/request-option", &body, "passenger option")
            .await
    }

    /// Reads one `/analytics/*` report; shapes are backend-defined.
    pub async fn analytics(&self, report: &str) -> Result<Value, ApiError> {
        let path = format!("analytics/{}", report.trim_matches('/'));
        let request = self.client.get(self.url(&path)?);
        self.send_json(request, "analytics").await
    }

    pub async fn ai_report(&self) -> Result<String, ApiError> {
        let request = self.client.get(self.url("analytics/ai_report")?);
        let report: AiReport = self.send_json(request, "ai report").await?;
        report
            .report_markdown
            .filter(|markdown| !markdown.trim().is_empty())
            .ok_or(ApiError::Empty {
                endpoint: "ai report",
            })
    }

    pub async fn crew_update_rest(&self, pilot_id: &PilotId) -> Result<(), ApiError> {
        let body = CrewRestRequest { pilot_id };
        self.post_unit("crew/update_rest", &body, "crew rest").await
    }

    pub async fn crew_calculate_cost(
        &self,
        pilot_id: &PilotId,
        additional_minutes: i64,
    ) -> Result<Value, ApiError> {
        let body = CrewCostRequest {
            pilot_id,
            additional_minutes,
        };
        self.post_json("crew/calculate_cost", &body, "crew cost")
            .await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Url(err.to_string()))
    }

    /// Appends each segment percent-encoded, so ids cannot add path levels or a query.
    fn segments_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        endpoint: &'static str,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)?).json(body);
        self.send_json(request, endpoint).await
    }

    async fn post_unit<B>(&self, path: &str, body: &B, endpoint: &'static str) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)?).json(body);
        self.send(request, endpoint).await.map(|_| ())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint, status = %status, "backend rejected request");
            return Err(ApiError::Status { endpoint, status });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, endpoint).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn fetch_snapshot(&self, page: u32, limit: u32) -> Result<DataSnapshot, ApiError> {
        let request = self.client.get(self.url("data")?).query(&[
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.send_json(request, "data").await
    }

    async fn fetch_status(&self) -> Result<HealthStatus, ApiError> {
        let request = self.client.get(self.url("status")?);
        let response: StatusResponse = self.send_json(request, "status").await?;
        Ok(response.status)
    }

    async fn request_remediation(&self, mode: OperatingMode) -> Result<HealResponse, ApiError> {
        self.post_json("heal", &HealRequest { mode }, "heal").await
    }

    async fn resolve(&self, option: &RemediationOption) -> Result<(), ApiError> {
        self.post_unit("resolve", &ResolveRequest { option }, "resolve")
            .await
    }

    async fn interpret_command(&self, command: &str) -> Result<CommandResponse, ApiError> {
        self.post_json("command", &CommandRequest { command }, "command")
            .await
    }

    async fn seed(&self) -> Result<(), ApiError> {
        let request = self.client.get(self.url("seed")?);
        self.send(request, "seed").await.map(|_| ())
    }

    async fn simulate(&self, request: &SimulationRequest) -> Result<(), ApiError> {
        self.post_unit("simulate", request, "simulate").await
    }
}
