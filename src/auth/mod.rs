//! Azure authentication: mode selection and credential flows

mod browser;
mod cli_session;
mod credential;
mod device;
mod flows;
mod identity;
mod mode;
mod resolver;

pub use browser::{BrowserLauncher, Pkce, SystemBrowser};
pub use cli_session::AzureCliSession;
pub use credential::{Credential, CredentialSource};
pub use device::show_challenge;
pub use flows::{AuthFlows, AuthSettings, AzureFlows};
pub use identity::{DeviceCodeChallenge, IdentityClient};
pub use mode::AuthMode;
pub use resolver::AuthResolver;
