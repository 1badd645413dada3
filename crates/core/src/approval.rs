//! Which SwapKit routes need an ERC-20 approval, and to whom.

use crate::error::SwapError;
use alloy::primitives::Address;
use std::str::FromStr;
use xswap_api::swapkit::QuoteRoute;

/// Providers that take deposits directly and never pull tokens via allowance.
pub const NO_APPROVAL_PROVIDERS: &[&str] = &["CHAINFLIP", "CHAINFLIP_STREAMING", "NEAR"];

/// `false` for the no-approval providers; a route without providers needs approval.
pub fn needs_approval(provider: Option<&str>) -> bool {
    match provider {
        Some(p) => !NO_APPROVAL_PROVIDERS.contains(&p),
        None => true,
    }
}

/// Spender for the sell asset: `meta.approvalAddress`, then `targetAddress`,
/// then the lowercased primary provider name.
pub fn resolve_approval_address(route: &QuoteRoute) -> Result<Address, SwapError> {
    let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());

    let candidate = non_empty(&route.meta.approval_address)
        .or_else(|| non_empty(&route.target_address))
        .or_else(|| route.primary_provider().map(str::to_lowercase))
        .filter(|v| !v.is_empty())
        .ok_or(SwapError::ApprovalAddressMissing)?;

    Address::from_str(&candidate).map_err(|_| SwapError::InvalidApprovalAddress(candidate))
}
