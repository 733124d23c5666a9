/// Requests the panel sends to the background worker when it lacks a capability

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundRequest {
    CheckClosedTabs,
    ReopenClosedTab,
}

/// Answer to `checkClosedTabs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTabsResponse {
    pub has_closed_tabs: bool,
}

/// Answer to `reopenClosedTab`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReopenResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shapes() {
        assert_eq!(
            serde_json::to_value(BackgroundRequest::CheckClosedTabs).unwrap(),
            json!({"action": "checkClosedTabs"})
        );
        assert_eq!(
            serde_json::to_value(BackgroundRequest::ReopenClosedTab).unwrap(),
            json!({"action": "reopenClosedTab"})
        );
    }

    #[test]
    fn test_request_parsing() {
        let request: BackgroundRequest =
            serde_json::from_value(json!({"action": "reopenClosedTab"})).unwrap();
        assert_eq!(request, BackgroundRequest::ReopenClosedTab);

        assert!(serde_json::from_value::<BackgroundRequest>(json!({"action": "somethingElse"})).is_err());
        assert!(serde_json::from_value::<BackgroundRequest>(json!({"type": "checkClosedTabs"})).is_err());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(ClosedTabsResponse { has_closed_tabs: true }).unwrap(),
            json!({"hasClosedTabs": true})
        );
        assert_eq!(
            serde_json::to_value(ReopenResponse { success: false }).unwrap(),
            json!({"success": false})
        );
    }
}
