use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;

/// The connected wallet of the current user.
///
/// Passed explicitly into author-scoped operations; nothing in the workspace
/// keeps session state globally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub address: WalletAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl Session {
    pub fn new(address: WalletAddress) -> Self {
        Self {
            address,
            chain_id: None,
        }
    }

    pub fn on_chain(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}
