//! LiFi route execution.
//!
//! Each step runs in order: switch to the step's source chain, ensure the
//! allowance, fetch and send the step transaction, then poll `/status`
//! until the transfer settles. The update hook sees the route after every
//! state change.

use super::{build_sender, pretty, require_receipt};
use crate::config::{chain_by_id, chains, require_env, EvmChain, StatusPollSettings, SwapSettings};
use crate::error::SwapError;
use crate::status::SwapStatusKind;
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::{debug, info, warn};
use xswap_api::lifi::{
    Execution, ExecutionStatus, LifiClient, Process, ProcessType, Route, RouteOptions,
    RoutesRequest, StatusRequest, StatusResponse,
};
use xswap_chain::{
    is_native_token, signer_from_private_key, AllowanceOutcome, Erc20Client, TransactionSender,
    TxDescriptor,
};

/// Chains the executor may switch to.
pub static SUPPORTED_CHAINS: &[EvmChain] = &[
    chains::ARBITRUM,
    chains::ETHEREUM,
    chains::OPTIMISM,
    chains::POLYGON,
    chains::SCROLL,
    chains::BASE,
];

pub fn supported_chain(chain_id: u64) -> Result<&'static EvmChain, SwapError> {
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.id == chain_id)
        .ok_or_else(|| SwapError::UnsupportedChain(chain_id.to_string()))
}

/// Signs and tracks the steps of LiFi routes.
pub struct RouteExecutor {
    client: LifiClient,
    sender: TransactionSender,
    poll: StatusPollSettings,
    rpc_url_for: Box<dyn Fn(&EvmChain) -> String + Send + Sync>,
}

impl RouteExecutor {
    pub fn new(
        client: LifiClient,
        sender: TransactionSender,
        poll: StatusPollSettings,
        rpc_url_for: impl Fn(&EvmChain) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            sender,
            poll,
            rpc_url_for: Box::new(rpc_url_for),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.sender.chain_id()
    }

    /// Rebind the wallet to `chain_id` if it is on another chain.
    pub fn switch_chain(&mut self, chain_id: u64) -> Result<(), SwapError> {
        if self.sender.chain_id() == chain_id {
            return Ok(());
        }
        let chain = supported_chain(chain_id)?;
        info!(chain = chain.name, chain_id, "Switching chain");
        self.sender = self.sender.switch_chain((self.rpc_url_for)(chain), chain_id);
        Ok(())
    }

    /// Execute every step of `route`, returning it with execution records filled in.
    pub async fn execute_route<F>(&mut self, mut route: Route, mut update_hook: F) -> Result<Route>
    where
        F: FnMut(&Route),
    {
        info!(route_id = %route.id, steps = route.steps.len(), "Executing route");
        for index in 0..route.steps.len() {
            self.execute_step(&mut route, index, &mut update_hook).await?;
        }
        Ok(route)
    }

    async fn execute_step<F>(&mut self, route: &mut Route, index: usize, hook: &mut F) -> Result<()>
    where
        F: FnMut(&Route),
    {
        let action = route.steps[index].action.clone();
        let tool = route.steps[index].tool.clone();
        debug!(index, tool = %tool, from_chain = action.from_chain_id, to_chain = action.to_chain_id, "Executing step");

        self.switch_chain(action.from_chain_id)?;
        let chain = supported_chain(action.from_chain_id)?;
        route.steps[index].execution.get_or_insert_with(Execution::new);

        let from_token = action.from_token.address()?;
        let approval_address = route.steps[index].estimate.approval_address.clone();
        if let (false, Some(spender)) = (is_native_token(from_token), approval_address) {
            let spender: Address = spender
                .parse()
                .map_err(|_| SwapError::InvalidApprovalAddress(spender.clone()))?;
            let amount = U256::from_str(&action.from_amount)
                .map_err(|_| SwapError::InvalidAmount(action.from_amount.clone()))?;

            start_process(route, index, ProcessType::TokenAllowance);
            hook(&*route);

            let erc20 = Erc20Client::new(self.sender.rpc_url());
            let outcome = erc20
                .ensure_allowance(&self.sender, from_token, spender, amount)
                .await?;
            update_process(route, index, |p| {
                if let AllowanceOutcome::Approved(sent) = &outcome {
                    p.tx_hash = Some(sent.hash.to_string());
                    p.tx_link = Some(chain.explorer_tx_url(&sent.hash.to_string()));
                }
                p.status = ExecutionStatus::Done;
            });
            hook(&*route);
        }

        let kind = if action.from_chain_id == action.to_chain_id {
            ProcessType::Swap
        } else {
            ProcessType::CrossChain
        };
        start_process(route, index, kind);
        hook(&*route);

        route.steps[index] = self.client.get_step_transaction(&route.steps[index]).await?;
        let tx = route.steps[index]
            .transaction_request
            .clone()
            .context("Step has no transaction request")?;
        let descriptor = TxDescriptor::new(tx.target()?, tx.calldata()?, tx.value()?)
            .with_gas_limit(tx.gas_limit());

        let sent = self.sender.send_transaction(&descriptor).await?;
        let receipt = require_receipt(sent)?;
        let tx_hash = receipt.transaction_hash.to_string();
        update_process(route, index, |p| {
            p.tx_hash = Some(tx_hash.clone());
            p.tx_link = Some(chain.explorer_tx_url(&tx_hash));
        });
        hook(&*route);

        let status = self
            .wait_for_status(&StatusRequest {
                tx_hash,
                bridge: tool,
                from_chain: action.from_chain_id,
                to_chain: action.to_chain_id,
            })
            .await?;

        match SwapStatusKind::from(status.status) {
            SwapStatusKind::Done => {
                update_process(route, index, |p| {
                    p.status = ExecutionStatus::Done;
                    p.message = status.substatus.clone();
                });
                set_execution_status(route, index, ExecutionStatus::Done);
                hook(&*route);
                Ok(())
            }
            _ => {
                let reason = status
                    .substatus_message
                    .clone()
                    .or_else(|| status.substatus.clone())
                    .unwrap_or_else(|| format!("{:?}", status.status));
                update_process(route, index, |p| {
                    p.status = ExecutionStatus::Failed;
                    p.message = Some(reason.clone());
                });
                set_execution_status(route, index, ExecutionStatus::Failed);
                hook(&*route);
                anyhow::bail!("Step {} failed: {}", index, reason)
            }
        }
    }

    /// Poll `/status` until DONE or FAILED.
    pub async fn wait_for_status(&self, request: &StatusRequest) -> Result<StatusResponse> {
        for attempt in 1..=self.poll.max_attempts {
            match self.client.get_status(request).await {
                Ok(status) if SwapStatusKind::from(status.status).is_terminal() => {
                    info!(tx_hash = %request.tx_hash, status = ?status.status, "Transfer settled");
                    return Ok(status);
                }
                Ok(status) => {
                    debug!(attempt, status = ?status.status, substatus = ?status.substatus, "Transfer pending");
                }
                Err(e) => warn!(attempt, error = %e, "Status request failed"),
            }
            tokio::time::sleep(self.poll.interval()).await;
        }
        anyhow::bail!(
            "Transfer {} not settled after {} status checks",
            request.tx_hash,
            self.poll.max_attempts
        )
    }
}

fn start_process(route: &mut Route, index: usize, kind: ProcessType) {
    route.steps[index]
        .execution
        .get_or_insert_with(Execution::new)
        .start(kind);
}

fn update_process(route: &mut Route, index: usize, f: impl FnOnce(&mut Process)) {
    if let Some(process) = route.steps[index]
        .execution
        .as_mut()
        .and_then(|e| e.process.last_mut())
    {
        f(process);
    }
}

fn set_execution_status(route: &mut Route, index: usize, status: ExecutionStatus) {
    if let Some(execution) = route.steps[index].execution.as_mut() {
        execution.status = status;
    }
}

pub async fn run(settings: &SwapSettings) -> Result<()> {
    let lifi = &settings.lifi;
    let private_key = require_env("PRIVATE_KEY")?;

    let signer = signer_from_private_key(&private_key)?;
    let address = signer.address();
    info!(address = %address, "Account address");

    let default_chain = chain_by_id(lifi.default_chain_id)
        .ok_or_else(|| SwapError::UnsupportedChain(lifi.default_chain_id.to_string()))?;
    let sender = build_sender(signer, default_chain, &settings.rpc_url(default_chain), &settings.gas).await?;

    let client = LifiClient::new(&lifi.api_url, &lifi.integrator, lifi.api_key.as_deref())?;

    let routes = client
        .get_routes(&RoutesRequest {
            from_chain_id: lifi.from_chain_id,
            to_chain_id: lifi.to_chain_id,
            from_token_address: lifi.from_token,
            to_token_address: lifi.to_token,
            from_amount: lifi.from_amount.clone(),
            from_address: address,
            to_address: address,
            options: RouteOptions {
                order: lifi.order,
                slippage: lifi.slippage,
                integrator: Some(lifi.integrator.clone()),
            },
        })
        .await?;

    let route = routes.into_iter().next().ok_or(SwapError::NoRoute)?;
    info!(route = %pretty(&route), "Route selected");

    let rpc_settings = settings.clone();
    let mut executor = RouteExecutor::new(client, sender, settings.status.clone(), move |chain| {
        rpc_settings.rpc_url(chain)
    });

    let executed = executor
        .execute_route(route, |route| {
            let latest = route
                .steps
                .iter()
                .filter_map(|s| s.execution.as_ref())
                .filter_map(|e| e.process.last())
                .last();
            info!(
                route_id = %route.id,
                process = ?latest.map(|p| p.kind),
                status = ?latest.map(|p| p.status),
                tx_hash = ?latest.and_then(|p| p.tx_hash.as_deref()),
                "Route updated"
            );
            debug!(route = %pretty(route), "Route snapshot");
        })
        .await?;

    info!(route = %pretty(&executed), "Executed route");
    Ok(())
}
