//! Browser wallet connection
//!
//! [`WalletSession`] mirrors what the page shows (account, balance, a
//! connecting flag). Talking to the injected provider happens through
//! [`WalletProvider`]; on wasm32 that is `window.ethereum`.

use std::fmt;

/// Wallet failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No injected provider (e.g. MetaMask not installed)
    NotAvailable,
    /// The user dismissed the connection request
    UserRejected,
    /// Any other provider failure
    Provider(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::NotAvailable => {
                write!(f, "No wallet found. Please install MetaMask to connect.")
            }
            WalletError::UserRejected => write!(f, "Wallet connection was rejected"),
            WalletError::Provider(msg) => write!(f, "Wallet error: {msg}"),
        }
    }
}

impl std::error::Error for WalletError {}

/// EIP-1193 rejection code
pub const USER_REJECTED_CODE: f64 = 4001.0;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Format a wei amount (hex quantity as returned by `eth_getBalance`, or
/// decimal) as ether with at least one decimal place: `"1.5"`, `"0.0"`.
pub fn format_ether(wei: &str) -> Option<String> {
    let wei = wei.trim();
    let value = match wei.strip_prefix("0x").or_else(|| wei.strip_prefix("0X")) {
        Some("") => 0,
        Some(hex) => u128::from_str_radix(hex, 16).ok()?,
        None => wei.parse::<u128>().ok()?,
    };

    let whole = value / WEI_PER_ETHER;
    let frac = format!("{:018}", value % WEI_PER_ETHER);
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    Some(format!("{whole}.{frac}"))
}

/// `0x1234...abcd` style display of an address
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Result of a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub account: String,
    /// Ether balance, `None` when the lookup failed
    pub balance: Option<String>,
}

/// Access to an injected wallet
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Ask the user to authorize accounts (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Already-authorized accounts, no prompt (`eth_accounts`)
    async fn accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Balance in wei as a hex quantity (`eth_getBalance`)
    async fn balance_wei(&self, account: &str) -> Result<String, WalletError>;

    /// Prompt for accounts and read the first one's balance. A failed
    /// balance lookup still connects.
    async fn connect(&self) -> Result<Option<WalletConnection>, WalletError> {
        let accounts = self.request_accounts().await?;
        connection_for(self, accounts).await
    }

    /// Silent check for an existing authorization, used on page load
    async fn restore(&self) -> Result<Option<WalletConnection>, WalletError> {
        let accounts = self.accounts().await?;
        connection_for(self, accounts).await
    }
}

async fn connection_for<P: WalletProvider + ?Sized>(
    provider: &P,
    accounts: Vec<String>,
) -> Result<Option<WalletConnection>, WalletError> {
    let Some(account) = accounts.into_iter().next() else {
        return Ok(None);
    };
    let balance = match provider.balance_wei(&account).await {
        Ok(wei) => format_ether(&wei),
        Err(err) => {
            log::warn!("Balance lookup failed: {err}");
            None
        }
    };
    Ok(Some(WalletConnection { account, balance }))
}

/// Wallet state shown by the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    account: Option<String>,
    balance: Option<String>,
    connecting: bool,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    /// Mark a connect request in flight. Returns false if one already is.
    pub fn begin_connect(&mut self) -> bool {
        if self.connecting {
            return false;
        }
        self.connecting = true;
        true
    }

    /// Apply the outcome of a connect or restore request
    pub fn finish_connect(
        &mut self,
        result: Result<Option<WalletConnection>, WalletError>,
    ) -> Result<(), WalletError> {
        self.connecting = false;
        match result? {
            Some(conn) => {
                log::info!("Wallet connected: {}", short_address(&conn.account));
                self.account = Some(conn.account);
                self.balance = conn.balance;
            }
            None => log::info!("Wallet returned no accounts"),
        }
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.account.take().is_some() {
            log::info!("Wallet disconnected");
        }
        self.balance = None;
    }

    /// Provider `accountsChanged`: the first account becomes active, an
    /// empty list disconnects. Returns true when the active account changed.
    pub fn accounts_changed(&mut self, accounts: &[String]) -> bool {
        match accounts.first() {
            None => {
                let was_connected = self.is_connected();
                self.disconnect();
                was_connected
            }
            Some(first) if self.account.as_deref() == Some(first.as_str()) => false,
            Some(first) => {
                log::info!("Wallet account changed: {}", short_address(first));
                self.account = Some(first.clone());
                // Belongs to the previous account
                self.balance = None;
                true
            }
        }
    }

    /// Header label: short address, or a connect prompt
    pub fn label(&self) -> String {
        match (&self.account, &self.balance) {
            (Some(account), Some(balance)) => {
                format!("{} ({} ETH)", short_address(account), balance)
            }
            (Some(account), None) => short_address(account),
            (None, _) if self.connecting => "Connecting...".to_string(),
            (None, _) => "Connect Wallet".to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use ethereum::{AccountsSubscription, EthereumProvider};

#[cfg(target_arch = "wasm32")]
mod ethereum {
    use js_sys::{Array, Function, Object, Promise, Reflect};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    use super::{USER_REJECTED_CODE, WalletError, WalletProvider};

    /// `window.ethereum` (EIP-1193)
    #[derive(Clone)]
    pub struct EthereumProvider {
        ethereum: JsValue,
    }

    impl EthereumProvider {
        /// Find the injected provider
        pub fn detect() -> Result<Self, WalletError> {
            let window = web_sys::window().ok_or(WalletError::NotAvailable)?;
            let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum"))
                .map_err(|_| WalletError::NotAvailable)?;
            if ethereum.is_undefined() || ethereum.is_null() {
                return Err(WalletError::NotAvailable);
            }
            Ok(Self { ethereum })
        }

        fn method(&self, name: &str) -> Result<Function, WalletError> {
            Reflect::get(&self.ethereum, &JsValue::from_str(name))
                .map_err(provider_error)?
                .dyn_into::<Function>()
                .map_err(|_| WalletError::Provider(format!("provider has no `{name}`")))
        }

        async fn request(&self, method: &str, params: Array) -> Result<JsValue, WalletError> {
            let args = Object::new();
            Reflect::set(&args, &"method".into(), &method.into()).map_err(provider_error)?;
            Reflect::set(&args, &"params".into(), &params).map_err(provider_error)?;

            let promise = self
                .method("request")?
                .call1(&self.ethereum, &args)
                .map_err(provider_error)?
                .dyn_into::<Promise>()
                .map_err(|_| WalletError::Provider("request did not return a promise".into()))?;
            JsFuture::from(promise).await.map_err(provider_error)
        }

        /// Subscribe to `accountsChanged`; dropping the subscription
        /// removes the listener
        pub fn on_accounts_changed(
            &self,
            mut handler: impl FnMut(Vec<String>) + 'static,
        ) -> Result<AccountsSubscription, WalletError> {
            let closure = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
                handler(to_accounts(&accounts));
            });
            self.method("on")?
                .call2(
                    &self.ethereum,
                    &"accountsChanged".into(),
                    closure.as_ref().unchecked_ref(),
                )
                .map_err(provider_error)?;
            Ok(AccountsSubscription {
                provider: self.clone(),
                closure,
            })
        }
    }

    impl WalletProvider for EthereumProvider {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            let accounts = self.request("eth_requestAccounts", Array::new()).await?;
            Ok(to_accounts(&accounts))
        }

        async fn accounts(&self) -> Result<Vec<String>, WalletError> {
            let accounts = self.request("eth_accounts", Array::new()).await?;
            Ok(to_accounts(&accounts))
        }

        async fn balance_wei(&self, account: &str) -> Result<String, WalletError> {
            let params = Array::of2(&JsValue::from_str(account), &JsValue::from_str("latest"));
            self.request("eth_getBalance", params)
                .await?
                .as_string()
                .ok_or_else(|| WalletError::Provider("balance is not a string".into()))
        }
    }

    /// Live `accountsChanged` listener
    pub struct AccountsSubscription {
        provider: EthereumProvider,
        closure: Closure<dyn FnMut(JsValue)>,
    }

    impl Drop for AccountsSubscription {
        fn drop(&mut self) {
            if let Ok(remove) = self.provider.method("removeListener") {
                let _ = remove.call2(
                    &self.provider.ethereum,
                    &"accountsChanged".into(),
                    self.closure.as_ref().unchecked_ref(),
                );
            }
        }
    }

    fn to_accounts(value: &JsValue) -> Vec<String> {
        if !Array::is_array(value) {
            return Vec::new();
        }
        Array::from(value)
            .iter()
            .filter_map(|a| a.as_string())
            .collect()
    }

    fn provider_error(err: JsValue) -> WalletError {
        let code = Reflect::get(&err, &"code".into())
            .ok()
            .and_then(|c| c.as_f64());
        if code == Some(USER_REJECTED_CODE) {
            return WalletError::UserRejected;
        }
        let message = Reflect::get(&err, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{:?}", err));
        WalletError::Provider(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    /// Drive a future whose dependencies resolve immediately
    fn block_on<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        loop {
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    struct FakeProvider {
        accounts: Result<Vec<String>, WalletError>,
        balance: Result<String, WalletError>,
    }

    impl WalletProvider for FakeProvider {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            self.accounts.clone()
        }

        async fn accounts(&self) -> Result<Vec<String>, WalletError> {
            self.accounts.clone()
        }

        async fn balance_wei(&self, _account: &str) -> Result<String, WalletError> {
            self.balance.clone()
        }
    }

    const ADDR: &str = "0x1234567890abcdef1234567890abcdef12345678";

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether("0x0").as_deref(), Some("0.0"));
        assert_eq!(format_ether("0x").as_deref(), Some("0.0"));
        // 1.5 ETH
        assert_eq!(format_ether("0x14d1120d7b160000").as_deref(), Some("1.5"));
        assert_eq!(format_ether("1000000000000000000").as_deref(), Some("1.0"));
        assert_eq!(format_ether("1").as_deref(), Some("0.000000000000000001"));
        assert_eq!(format_ether("0xzz"), None);
        assert_eq!(format_ether("-5"), None);
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(ADDR), "0x1234...5678");
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_connect_flow() {
        let provider = FakeProvider {
            accounts: Ok(vec![ADDR.to_string(), "0xother".to_string()]),
            balance: Ok("0x14d1120d7b160000".to_string()),
        };
        let mut session = WalletSession::new();
        assert!(session.begin_connect());
        assert!(!session.begin_connect());
        assert_eq!(session.label(), "Connecting...");

        session.finish_connect(block_on(provider.connect())).unwrap();
        assert!(!session.is_connecting());
        assert_eq!(session.account(), Some(ADDR));
        assert_eq!(session.balance(), Some("1.5"));
        assert_eq!(session.label(), "0x1234...5678 (1.5 ETH)");
    }

    #[test]
    fn test_connect_rejected() {
        let provider = FakeProvider {
            accounts: Err(WalletError::UserRejected),
            balance: Ok("0x0".to_string()),
        };
        let mut session = WalletSession::new();
        session.begin_connect();
        let result = session.finish_connect(block_on(provider.connect()));
        assert_eq!(result, Err(WalletError::UserRejected));
        assert!(!session.is_connecting());
        assert!(!session.is_connected());
    }

    #[test]
    fn test_balance_failure_still_connects() {
        let provider = FakeProvider {
            accounts: Ok(vec![ADDR.to_string()]),
            balance: Err(WalletError::Provider("rpc down".into())),
        };
        let conn = block_on(provider.restore()).unwrap().unwrap();
        assert_eq!(conn.account, ADDR);
        assert_eq!(conn.balance, None);

        let empty = FakeProvider {
            accounts: Ok(Vec::new()),
            balance: Ok("0x0".to_string()),
        };
        assert_eq!(block_on(empty.restore()), Ok(None));
    }

    #[test]
    fn test_accounts_changed() {
        let mut session = WalletSession::new();
        session
            .finish_connect(Ok(Some(WalletConnection {
                account: ADDR.to_string(),
                balance: Some("2.0".to_string()),
            })))
            .unwrap();

        assert!(!session.accounts_changed(&[ADDR.to_string()]));
        assert_eq!(session.balance(), Some("2.0"));

        assert!(session.accounts_changed(&["0xfeed".to_string()]));
        assert_eq!(session.account(), Some("0xfeed"));
        assert_eq!(session.balance(), None);

        assert!(session.accounts_changed(&[]));
        assert!(!session.is_connected());
        assert_eq!(session.label(), "Connect Wallet");
        assert!(!session.accounts_changed(&[]));
    }

    #[test]
    fn test_error_messages() {
        assert!(WalletError::NotAvailable.to_string().contains("MetaMask"));
        assert_eq!(
            WalletError::Provider("boom".into()).to_string(),
            "Wallet error: boom"
        );
    }
}
