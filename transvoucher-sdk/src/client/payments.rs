//! `/payments` endpoints.

use super::{ClientError, HttpClient, RequestOptions};
use crate::objects::payment::FieldErrors;
use crate::objects::{CreatePaymentRequest, Payment, PaymentList, PaymentListRequest, PaymentStatus};

/// Create, look up and list payments.
#[derive(Debug, Clone, Copy)]
pub struct PaymentService<'a> {
    http: &'a HttpClient,
    options: Option<&'a RequestOptions>,
}

impl<'a> PaymentService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http, options: None }
    }

    /// Apply `options` to every call made through this handle.
    pub fn with_options(mut self, options: &'a RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// `POST /payments`.  The request is validated locally first.
    pub async fn create(&self, request: &CreatePaymentRequest) -> Result<Payment, ClientError> {
        request
            .validate()
            .map_err(|errors| ClientError::validation("Validation failed", errors))?;

        self.http
            .post("/payments", request, self.options)
            .await?
            .into_data()
            .ok_or_else(|| invalid_response("payment creation"))
    }

    /// `GET /payments/{id}`.
    pub async fn get_status(&self, payment_id: u64) -> Result<Payment, ClientError> {
        if payment_id == 0 {
            let message = "Payment ID is required and must be a number";
            let errors = FieldErrors::from([("paymentId".to_owned(), vec![message.to_owned()])]);
            return Err(ClientError::validation(message, errors));
        }

        self.http
            .get(&format!("/payments/{payment_id}"), &[], self.options)
            .await?
            .into_data()
            .ok_or_else(|| invalid_response("payment status check"))
    }

    /// `GET /payments` with the set filters as query parameters.
    pub async fn list(&self, request: &PaymentListRequest) -> Result<PaymentList, ClientError> {
        request
            .validate()
            .map_err(|errors| ClientError::validation("Validation failed", errors))?;

        self.http
            .get("/payments", &request.to_query(), self.options)
            .await?
            .into_data()
            .ok_or_else(|| invalid_response("payment list"))
    }

    /// First payment carrying the merchant `reference`, if any.
    pub async fn get_by_reference(&self, reference: &str) -> Result<Option<Payment>, ClientError> {
        if reference.is_empty() {
            let message = "Reference is required and must be a string";
            let errors = FieldErrors::from([("reference".to_owned(), vec![message.to_owned()])]);
            return Err(ClientError::validation(message, errors));
        }

        let list = self.list(&PaymentListRequest::by_reference(reference)).await?;
        Ok(list.payments.into_iter().next())
    }

    pub fn is_completed(&self, payment: &Payment) -> bool {
        payment.status == PaymentStatus::Completed
    }

    pub fn is_pending(&self, payment: &Payment) -> bool {
        payment.status == PaymentStatus::Pending
    }

    pub fn is_failed(&self, payment: &Payment) -> bool {
        payment.status == PaymentStatus::Failed
    }

    pub fn is_expired(&self, payment: &Payment) -> bool {
        payment.status == PaymentStatus::Expired
    }
}

fn invalid_response(operation: &str) -> ClientError {
    ClientError::validation(format!("Invalid response from {operation}"), FieldErrors::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::mock_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payment_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "reference_id": "order-42",
            "amount": 25.5,
            "currency": "USD",
            "status": status,
            "payment_url": "https://pay.transvoucher.com/p/abc"
        })
    }

    #[tokio::test]
    async fn test_create_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": payment_json("pay_1", "pending"),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let payments = client.payments();
        let payment = payments
            .create(&CreatePaymentRequest::new("Order #42", 25.5, "USD"))
            .await
            .unwrap();

        assert_eq!(payment.id, "pay_1");
        assert!(payments.is_pending(&payment));
        assert!(!payments.is_completed(&payment));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client
            .payments()
            .create(&CreatePaymentRequest::new("Order", -1.0, "US"))
            .await
            .unwrap_err();
        let ClientError::Validation { message, errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Validation failed");
        assert!(errors.contains_key("amount"));
        assert!(errors.contains_key("currency"));
    }

    #[tokio::test]
    async fn test_get_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": payment_json("7", "completed"),
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let payment = client.payments().get_status(7).await.unwrap();
        assert!(client.payments().is_completed(&payment));

        let err = client.payments().get_status(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { ref errors, .. } if errors.contains_key("paymentId")));
    }

    #[tokio::test]
    async fn test_missing_data_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&server)
            .await;

        let err = mock_client(&server).payments().get_status(9).await.unwrap_err();
        assert_eq!(err.to_string(), "validation error: Invalid response from payment status check");
    }

    #[tokio::test]
    async fn test_list_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .and(query_param("page", "2"))
            .and(query_param("status", "failed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "payments": [payment_json("pay_2", "failed")],
                    "has_more": false,
                    "count": 1
                }
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let request = PaymentListRequest {
            page: Some(2),
            status: Some(PaymentStatus::Failed),
            ..Default::default()
        };
        let list = client.payments().list(&request).await.unwrap();
        assert_eq!(list.count, 1);
        assert!(client.payments().is_failed(&list.payments[0]));
    }

    #[tokio::test]
    async fn test_get_by_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .and(query_param("reference", "order-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "payments": [payment_json("pay_3", "expired")] }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .and(query_param("reference", "unknown"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "payments": [] }
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let payment = client.payments().get_by_reference("order-42").await.unwrap().unwrap();
        assert!(client.payments().is_expired(&payment));
        assert!(client.payments().get_by_reference("unknown").await.unwrap().is_none());
        assert!(client.payments().get_by_reference("").await.is_err());
    }

    #[tokio::test]
    async fn test_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })),
            )
            .mount(&server)
            .await;

        let err = mock_client(&server).payments().get_status(1).await.unwrap_err();
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    }
}
