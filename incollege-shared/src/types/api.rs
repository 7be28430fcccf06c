use serde::{Deserialize, Serialize};

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, message: None }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data, message: Some(message.into()) }
    }
}

/// Payload for mutations whose only result is a confirmation line.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorDetail,
}

/// `code` is the refined `E####` code, `kind` the coarse class clients branch on.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub kind: String,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiErrorDetail {
                code: code.into(),
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    /// A named check outcome; the error text becomes the check message.
    pub fn from_result<E: std::fmt::Display>(name: impl Into<String>, result: Result<(), E>) -> Self {
        let (status, message) = match result {
            Ok(()) => (HealthStatus::Healthy, None),
            Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
        };
        Self { name: name.into(), status, message }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub checks: Vec<HealthCheck>,
}

impl HealthResponse {
    /// Overall status is unhealthy as soon as one check fails.
    pub fn from_checks(service: impl Into<String>, version: impl Into<String>, checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self {
            status,
            service: service.into(),
            version: version.into(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_failed_check_marks_the_service_unhealthy() {
        let checks = vec![
            HealthCheck::from_result::<String>("database", Ok(())),
            HealthCheck::from_result("disk", Err("read-only filesystem")),
        ];
        let health = HealthResponse::from_checks("incollege-api", "0.1.0", checks);

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.checks[1].message.as_deref(), Some("read-only filesystem"));
    }

    #[test]
    fn message_is_omitted_from_success_envelope_when_absent() {
        let value = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": [1, 2] }));
    }
}
