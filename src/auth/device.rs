//! Device code login

use std::time::Duration;

use log::{debug, info};
use tokio::time::{sleep, Instant};

use crate::config::auth;
use crate::error::AuthError;
use crate::ui::Console;

use super::identity::{DeviceCodeChallenge, DevicePoll, IdentityClient};
use super::{Credential, CredentialSource};

/// Show the sign-in instructions for a device code
pub fn show_challenge<C: Console + ?Sized>(console: &mut C, challenge: &DeviceCodeChallenge) {
    console.say("");
    console.say("📱 Device Code Login");
    match &challenge.message {
        Some(message) => console.say(message),
        None => console.say(&format!(
            "To sign in, open {} and enter the code {} to authenticate.",
            challenge.verification_uri, challenge.user_code
        )),
    }
    console.say(&format!("   URL:  {}", challenge.verification_uri));
    console.say(&format!("   Code: {}", challenge.user_code));
    console.say(&format!(
        "   The code expires in {} minute(s). Waiting for sign-in...",
        challenge.expires_in.div_ceil(60)
    ));
}

/// Run the device code flow: request, display, poll until issued or expired
pub async fn device_code_login<C: Console + ?Sized>(
    identity: &IdentityClient,
    console: &mut C,
) -> Result<Credential, AuthError> {
    let challenge = identity.request_device_code().await?;
    show_challenge(console, &challenge);

    let deadline = deadline_after(Instant::now(), challenge.expires_in);
    let mut interval = Duration::from_secs(challenge.interval);

    loop {
        if Instant::now() >= deadline {
            return Err(AuthError::Timeout(format!(
                "device code {} was not used within {} seconds",
                challenge.user_code, challenge.expires_in
            )));
        }

        sleep(interval).await;

        match identity.poll_device_code(&challenge.device_code).await? {
            DevicePoll::Pending => debug!("Device code sign-in still pending"),
            DevicePoll::SlowDown => {
                interval += Duration::from_secs(auth::SLOW_DOWN_INCREMENT_SECS);
                debug!("Provider asked to slow down, polling every {:?}", interval);
            }
            DevicePoll::Issued(token) => {
                info!("Device code sign-in completed");
                return Ok(Credential::expiring_in(
                    token.access_token,
                    token.expires_in,
                    CredentialSource::DeviceCode {
                        user_code: challenge.user_code,
                        verification_uri: challenge.verification_uri,
                    },
                ));
            }
        }
    }
}

/// When the device code stops being valid
fn deadline_after(now: Instant, expires_in_secs: u64) -> Instant {
    now.checked_add(Duration::from_secs(expires_in_secs))
        .unwrap_or_else(|| now + auth::MAX_DEVICE_CODE_WAIT)
}
