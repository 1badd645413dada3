//! Vendor swap states folded into one lifecycle.

use xswap_api::chainflip::SwapState;
use xswap_api::lifi::TransferStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatusKind {
    Pending,
    Done,
    Failed,
    Unknown,
}

impl SwapStatusKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, SwapStatusKind::Done | SwapStatusKind::Failed)
    }
}

impl From<SwapState> for SwapStatusKind {
    fn from(state: SwapState) -> Self {
        match state {
            SwapState::Waiting
            | SwapState::Receiving
            | SwapState::Swapping
            | SwapState::Sending
            | SwapState::Sent => SwapStatusKind::Pending,
            SwapState::Completed => SwapStatusKind::Done,
            SwapState::Failed => SwapStatusKind::Failed,
            SwapState::Unknown => SwapStatusKind::Unknown,
        }
    }
}

impl From<TransferStatus> for SwapStatusKind {
    fn from(status: TransferStatus) -> Self {
        match status {
            // NOT_FOUND is normal until the indexer sees the tx
            TransferStatus::NotFound | TransferStatus::Pending => SwapStatusKind::Pending,
            TransferStatus::Done => SwapStatusKind::Done,
            TransferStatus::Failed | TransferStatus::Invalid => SwapStatusKind::Failed,
            TransferStatus::Unknown => SwapStatusKind::Unknown,
        }
    }
}
