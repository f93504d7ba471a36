use crate::domain::errors::{DomainError, DomainResult};
use crate::ports::gateway_port::*;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

/// HTTP adapter for the hosted-checkout payment gateway.
///
/// Authenticates with the merchant's secret key; amounts go over the wire
/// as `{currency, decimal}` objects with the decimal rendered as a string.
#[derive(Clone)]
pub struct HttpGatewayClient {
    base_url: String,
    secret_key: String,
    client: Client,
}

impl HttpGatewayClient {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            client: Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> DomainResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Gateway request POST {}: {}", path, body);

        let response = self
            .client
            .post(&url)
            .basic_auth("", Some(&self.secret_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        Self::read_body(response, path).await
    }

    async fn get(&self, path: &str) -> DomainResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .basic_auth("", Some(&self.secret_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::read_body(response, path).await
    }

    async fn read_body(response: reqwest::Response, path: &str) -> DomainResult<Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let text = response_error_text(&body);
            error!("Gateway API error: {} - {}", status, text);
            return Err(DomainError::GatewayError(format!(
                "API returned {}: {}",
                status, text
            )));
        }

        let body: Value = response.json().await?;
        debug!("Gateway response for {}: {}", path, body);
        Ok(body)
    }
}

#[async_trait::async_trait]
impl GatewayPort for HttpGatewayClient {
    async fn create_intent(&self, args: PaymentIntentArgs) -> DomainResult<String> {
        let mut body = json!({
            "amount": amount_body(&args.amount.currency, args.amount.value),
            "custom": {
                "products": args.products,
                "customer": args.customer,
                "platform": {
                    "name": args.platform_name,
                    "version": args.platform_version,
                },
            },
            "integration": {
                "key": args.integration_key,
                "name": args.integration_name,
            },
            "redirectUrl": args.redirect_url,
            "preferredPaymentMethod": args.preferred_payment_method,
        });

        if let Some(configuration_id) = &args.wallet_configuration_id {
            body["mobilePayConfiguration"] = json!({ "configurationID": configuration_id });
        }

        if let Some(test_fixture) = &args.test_fixture {
            body["test"] = test_fixture.clone();
        }

        let response = self.post("/payments", body).await?;

        response["paymentIntentId"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| DomainError::GatewayError("Missing paymentIntentId".to_string()))
    }

    async fn fetch(&self, transaction_id: &str) -> DomainResult<GatewayTransaction> {
        let body = self.get(&format!("/payments/{}", transaction_id)).await?;

        match parse_transaction(&body["transaction"]) {
            Some(transaction) => Ok(transaction),
            None => Err(DomainError::GatewayError(format!(
                "no transaction with provided id: {}",
                transaction_id
            ))),
        }
    }

    async fn capture(
        &self,
        transaction_id: &str,
        args: CaptureArgs,
    ) -> DomainResult<GatewayResponse> {
        let body = self
            .post(
                &format!("/payments/{}/capture", transaction_id),
                json!({ "amount": amount_body(&args.currency, args.amount) }),
            )
            .await?;

        Ok(parse_gateway_response(&body))
    }

    async fn refund(
        &self,
        transaction_id: &str,
        args: RefundArgs,
    ) -> DomainResult<GatewayResponse> {
        let body = self
            .post(
                &format!("/payments/{}/refund", transaction_id),
                json!({
                    "descriptor": args.descriptor,
                    "amount": args.amount.to_string(),
                }),
            )
            .await?;

        Ok(parse_gateway_response(&body))
    }

    async fn cancel(
        &self,
        transaction_id: &str,
        args: CancelArgs,
    ) -> DomainResult<GatewayResponse> {
        let body = self
            .post(
                &format!("/payments/{}/cancel", transaction_id),
                json!({ "amount": args.amount.to_string() }),
            )
            .await?;

        Ok(parse_gateway_response(&body))
    }
}

fn amount_body(currency: &str, value: Decimal) -> Value {
    json!({ "currency": currency, "decimal": value.to_string() })
}

/// Wire shape of a transaction; amounts arrive as `{currency, decimal}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBody {
    id: String,
    amount: AmountBody,
    #[serde(default)]
    pending_amount: Option<AmountBody>,
    #[serde(default)]
    captured_amount: Option<AmountBody>,
    #[serde(default)]
    refunded_amount: Option<AmountBody>,
    created: DateTime<Utc>,
    #[serde(default)]
    authorisation_created: bool,
}

#[derive(Debug, Deserialize)]
struct AmountBody {
    currency: String,
    decimal: Decimal,
}

fn parse_transaction(value: &Value) -> Option<GatewayTransaction> {
    let body: TransactionBody = serde_json::from_value(value.clone()).ok()?;

    Some(GatewayTransaction {
        id: body.id,
        amount: body.amount.decimal,
        pending_amount: body.pending_amount.map(|a| a.decimal).unwrap_or_default(),
        captured_amount: body.captured_amount.map(|a| a.decimal).unwrap_or_default(),
        refunded_amount: body.refunded_amount.map(|a| a.decimal).unwrap_or_default(),
        currency: body.amount.currency,
        created: body.created,
        authorisation_created: body.authorisation_created,
    })
}

/// Map a 2xx mutation payload into the structured response the dispatcher
/// shapes outcomes from. The `error` flag arrives as `1` or `true`.
fn parse_gateway_response(body: &Value) -> GatewayResponse {
    let error = body["error"] == json!(1) || body["error"] == json!(true);

    GatewayResponse {
        error,
        message: body["message"].as_str().map(String::from),
        transaction: parse_transaction(&body["transaction"]),
        capture_state: body["captureState"].as_str().map(String::from),
    }
}

/// Flatten a failed API payload into one readable line. Bodies come in
/// three shapes: `{text}`, `{code, error}` or a list of field errors.
fn response_error_text(body: &Value) -> String {
    if let Some(text) = body["text"].as_str() {
        return text.to_string();
    }

    if !body["code"].is_null() && !body["error"].is_null() {
        return format!("{}-{}", value_text(&body["code"]), value_text(&body["error"]));
    }

    if let Some(field_errors) = body.as_array() {
        let parts: Vec<String> = field_errors
            .iter()
            .map(|field_error| {
                format!(
                    "{}:{}",
                    field_error["field"].as_str().unwrap_or(""),
                    field_error["message"].as_str().unwrap_or("")
                )
            })
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }

    body.to_string()
}

fn value_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}
