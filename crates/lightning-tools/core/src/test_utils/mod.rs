pub mod mock_http_client;
pub mod mock_wallet;

pub use mock_http_client::{MockHttpClient, MockResponse, RecordedRequest};
pub use mock_wallet::MockWallet;
