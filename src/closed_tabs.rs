/// Recently-closed tab detection and restore
///
/// The panel reads session history directly when it can. When the session
/// capability is missing in the panel's context, it asks the background
/// worker, which always has it.

use log::{error, warn};

use crate::host::{HostError, TabHost};
use crate::messages::{BackgroundRequest, ClosedTabsResponse, ReopenResponse};

/// How long to let the host record a removal before asking about it again.
pub const SETTLE_DELAY_MS: u32 = 100;

/// Session id of the most recently closed entry, provided that entry is a tab.
pub async fn most_recent_closed_tab<H: TabHost + ?Sized>(
    host: &H,
) -> Result<Option<String>, HostError> {
    let entries = host.recently_closed(1).await?;

    Ok(entries
        .into_iter()
        .next()
        .and_then(|entry| entry.tab)
        .and_then(|tab| tab.session_id))
}

/// Restore the most recently closed tab. Returns `false` when there is none.
pub async fn restore_most_recent<H: TabHost + ?Sized>(host: &H) -> Result<bool, HostError> {
    match most_recent_closed_tab(host).await? {
        Some(session_id) => {
            host.restore_session(&session_id).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Whether a reopen button would have something to reopen. Fails closed.
pub async fn has_recently_closed_tab<H: TabHost + ?Sized>(host: &H) -> bool {
    if !host.sessions_available() {
        return ask_background_for_closed_tabs(host).await;
    }

    match most_recent_closed_tab(host).await {
        Ok(session_id) => session_id.is_some(),
        Err(e) => {
            error!("Failed to check closed tabs: {}", e);
            false
        }
    }
}

async fn ask_background_for_closed_tabs<H: TabHost + ?Sized>(host: &H) -> bool {
    match host.send_message(&BackgroundRequest::CheckClosedTabs).await {
        Ok(value) => match serde_json::from_value::<ClosedTabsResponse>(value) {
            Ok(response) => response.has_closed_tabs,
            Err(e) => {
                warn!("Unexpected checkClosedTabs response: {}", e);
                false
            }
        },
        Err(e) => {
            error!("Failed to ask background for closed tabs: {}", e);
            false
        }
    }
}

/// Ask the background worker to restore the most recent tab on our behalf.
pub async fn request_background_reopen<H: TabHost + ?Sized>(host: &H) -> bool {
    match host.send_message(&BackgroundRequest::ReopenClosedTab).await {
        Ok(value) => match serde_json::from_value::<ReopenResponse>(value) {
            Ok(response) => response.success,
            Err(e) => {
                warn!("Unexpected reopenClosedTab response: {}", e);
                false
            }
        },
        Err(e) => {
            error!("Background reopen failed as well: {}", e);
            false
        }
    }
}
