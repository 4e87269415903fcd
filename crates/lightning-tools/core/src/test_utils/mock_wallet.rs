use std::sync::Mutex;

use crate::wallet::{
    KeysendRequest, SendPaymentResponse, Wallet, WalletError, WalletResult,
};

/// Records what it was asked to pay and answers with a fixed preimage.
pub struct MockWallet {
    pub preimage: String,
    pub supports_keysend: bool,
    pub enabled: Mutex<u32>,
    pub payments: Mutex<Vec<String>>,
    pub keysends: Mutex<Vec<KeysendRequest>>,
}

impl MockWallet {
    pub fn new(preimage: &str) -> Self {
        MockWallet {
            preimage: preimage.to_string(),
            supports_keysend: true,
            enabled: Mutex::new(0),
            payments: Mutex::new(Vec::new()),
            keysends: Mutex::new(Vec::new()),
        }
    }

    pub fn without_keysend(mut self) -> Self {
        self.supports_keysend = false;
        self
    }
}

#[async_trait::async_trait]
impl Wallet for MockWallet {
    async fn enable(&self) -> WalletResult<()> {
        *self.enabled.lock().unwrap() += 1;
        Ok(())
    }

    async fn send_payment(&self, payment_request: &str) -> WalletResult<SendPaymentResponse> {
        self.payments
            .lock()
            .unwrap()
            .push(payment_request.to_string());
        Ok(SendPaymentResponse {
            preimage: self.preimage.clone(),
        })
    }

    async fn keysend(&self, request: KeysendRequest) -> WalletResult<SendPaymentResponse> {
        if !self.supports_keysend {
            return Err(WalletError::KeysendUnsupported);
        }
        self.keysends.lock().unwrap().push(request);
        Ok(SendPaymentResponse {
            preimage: self.preimage.clone(),
        })
    }
}
