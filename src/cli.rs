use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::{Direction, OrderKind};
use crate::engine::parameters::{
    close_position_request, position_request, swap_request, PositionParameters, SwapParameters,
};
use crate::engine::{OrderEngine, OrderPlan, TokenDirectory};
use crate::error::{Result, TraderError};
use crate::exchange::ChainServices;

#[derive(Parser)]
#[command(name = "gmx-trader")]
#[command(version = "0.1.0")]
#[command(about = "Build and submit GMX v2 perpetual orders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Chain to trade on
    #[arg(long, global = true, default_value = "arbitrum")]
    pub chain: String,

    /// Build and print the order without submitting anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Config directory
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,

    /// Emit JSON logs
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open or add to a position
    Increase(PositionArgs),
    /// Reduce or close a position
    Decrease(DecreaseArgs),
    /// Swap one token for another
    Swap(SwapArgs),
    /// List available markets
    Markets,
    /// List the trader's open positions
    Positions,
    /// Show data store gas limits and the current gas price
    Gas,
}

#[derive(Args, Debug, Clone)]
pub struct PositionArgs {
    /// Index token symbol, e.g. ARB
    #[arg(long)]
    pub market: String,
    /// Collateral token symbol, e.g. USDC
    #[arg(long)]
    pub collateral: String,
    #[arg(long, value_enum)]
    pub direction: DirectionArg,
    /// Position size delta in USD
    #[arg(long)]
    pub size_usd: Decimal,
    /// Collateral amount in whole tokens
    #[arg(long)]
    pub amount: Decimal,
    /// Slippage as a fraction (0.03 = 3%)
    #[arg(long, default_value = "0.03")]
    pub slippage: Decimal,
}

#[derive(Args, Debug, Clone)]
pub struct DecreaseArgs {
    /// Index token symbol, e.g. ETH
    #[arg(long)]
    pub market: String,
    #[arg(long, value_enum)]
    pub direction: DirectionArg,
    /// Close the whole open position for this market and direction
    #[arg(long, conflicts_with_all = ["collateral", "size_usd", "amount"])]
    pub from_position: bool,
    #[arg(long, required_unless_present = "from_position")]
    pub collateral: Option<String>,
    #[arg(long, required_unless_present = "from_position")]
    pub size_usd: Option<Decimal>,
    /// Collateral to withdraw in whole tokens
    #[arg(long, required_unless_present = "from_position")]
    pub amount: Option<Decimal>,
    #[arg(long, default_value = "0.03")]
    pub slippage: Decimal,
}

#[derive(Args, Debug, Clone)]
pub struct SwapArgs {
    /// Symbol of the token to sell
    #[arg(long)]
    pub from: String,
    /// Symbol of the token to buy
    #[arg(long)]
    pub to: String,
    /// Amount of `from` in whole tokens
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long, default_value = "0.03")]
    pub slippage: Decimal,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Long,
    Short,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Long => Direction::Long,
            DirectionArg::Short => Direction::Short,
        }
    }
}

impl PositionArgs {
    pub fn parameters(&self, chain: &str) -> PositionParameters {
        PositionParameters {
            chain: chain.to_string(),
            index_symbol: self.market.clone(),
            collateral_symbol: self.collateral.clone(),
            direction: self.direction.into(),
            size_usd: self.size_usd,
            collateral_amount: self.amount,
            slippage: self.slippage,
        }
    }
}

impl DecreaseArgs {
    pub fn parameters(&self, chain: &str) -> Result<PositionParameters> {
        match (&self.collateral, self.size_usd, self.amount) {
            (Some(collateral), Some(size_usd), Some(amount)) => Ok(PositionParameters {
                chain: chain.to_string(),
                index_symbol: self.market.clone(),
                collateral_symbol: collateral.clone(),
                direction: self.direction.into(),
                size_usd,
                collateral_amount: amount,
                slippage: self.slippage,
            }),
            _ => Err(TraderError::Validation(
                "decrease needs --collateral, --size-usd and --amount, or --from-position".into(),
            )),
        }
    }
}

impl SwapArgs {
    pub fn parameters(&self, chain: &str) -> SwapParameters {
        SwapParameters {
            chain: chain.to_string(),
            start_symbol: self.from.clone(),
            out_symbol: self.to.clone(),
            amount: self.amount,
            slippage: self.slippage,
        }
    }
}

/// Resolve symbols, then plan or submit a position order
pub async fn run_position(
    engine: &OrderEngine,
    kind: OrderKind,
    chain: &str,
    args: &PositionArgs,
    dry_run: bool,
) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let request = request_from_symbols(services, kind, &args.parameters(chain)).await?;

    submit_or_plan(engine, request, dry_run).await
}

/// Decrease by explicit amounts, or close a position read from chain
pub async fn run_decrease(
    engine: &OrderEngine,
    chain: &str,
    args: &DecreaseArgs,
    dry_run: bool,
) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let request = if args.from_position {
        let (positions, markets) = tokio::try_join!(
            services.positions.open_positions(services.ledger.trader()),
            services.markets.available_markets()
        )?;
        close_position_request(
            chain,
            &positions,
            &markets,
            &args.market,
            args.direction.into(),
            args.slippage,
        )?
    } else {
        request_from_symbols(services, OrderKind::Decrease, &args.parameters(chain)?).await?
    };

    submit_or_plan(engine, request, dry_run).await
}

async fn request_from_symbols(
    services: &ChainServices,
    kind: OrderKind,
    params: &PositionParameters,
) -> Result<crate::domain::OrderRequest> {
    let (markets, tokens) = tokio::try_join!(
        services.markets.available_markets(),
        services.markets.tokens()
    )?;
    position_request(kind, params, &markets, &TokenDirectory::new(tokens))
}

pub async fn run_swap(engine: &OrderEngine, chain: &str, args: &SwapArgs, dry_run: bool) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let tokens = TokenDirectory::new(services.markets.tokens().await?);
    let request = swap_request(&args.parameters(chain), &tokens)?;

    submit_or_plan(engine, request, dry_run).await
}

async fn submit_or_plan(
    engine: &OrderEngine,
    request: crate::domain::OrderRequest,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        let plan = engine.plan(request).await?;
        print_plan(&plan);
        return Ok(());
    }

    let handle = engine.build_and_submit(request).await?;
    println!("\n=== Order Submitted ===");
    println!("Build:         {}", handle.build_id);
    println!("Tx:            {}", handle.tx_hash);
    println!("Explorer:      {}", handle.explorer_url);
    println!("State:         {}", handle.state);
    println!("Execution fee: {} wei", handle.execution_fee);
    println!("Value sent:    {} wei", handle.value);
    Ok(())
}

fn print_plan(plan: &OrderPlan) {
    println!("\n=== Order Plan ({} on {}) ===", plan.kind, plan.chain);
    println!("Build:            {}", plan.build_id);
    println!("Trader:           {}", plan.trader);
    println!("Gas limit entry:  {} (multi-hop: {})", plan.gas.entry, plan.gas.multi_hop);
    println!("Approval:         {:?}", plan.approval);
    println!("Mark price:       {}", plan.price.mark_price);
    println!("Acceptable price: {} (~${:.4})", plan.price.acceptable_price_raw, plan.price.acceptable_price_usd);
    if let Some(preview) = &plan.execution_preview {
        println!(
            "Execution price:  {} (~${:.4}, impact ${:.4})",
            preview.execution_price,
            preview.execution_price_usd(),
            preview.price_impact_usd()
        );
    }
    println!("Gas price:        {} wei", plan.fee.gas_price);
    println!("Execution fee:    {} wei", plan.fee.execution_fee);
    if let Some(route) = &plan.route {
        println!("Swap path:        {:?}", route.hops);
        println!("Min output:       {}", plan.min_output_amount);
    }
    println!("Batch:            {}", plan.batch);
    println!("\nLifecycle:");
    for t in &plan.transitions {
        println!("  {} -> {}: {}", t.from, t.to, t.reason);
    }
    println!("\nDry run: nothing was submitted.");
}

pub async fn show_markets(engine: &OrderEngine, chain: &str) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let markets = services.markets.available_markets().await?;

    println!("\n=== Markets on {} ({}) ===", chain, markets.len());
    println!("{:<24} {:<44} {:<44}", "Symbol", "Market token", "Index token");
    for market in markets.iter() {
        println!(
            "{:<24} {:<44} {:<44}",
            market.symbol,
            market.market_token.to_string(),
            market.index_token.to_string()
        );
    }
    Ok(())
}

pub async fn show_positions(engine: &OrderEngine, chain: &str) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let trader = services.ledger.trader();
    let (positions, markets) = tokio::try_join!(
        services.positions.open_positions(trader),
        services.markets.available_markets()
    )?;

    println!("\n=== Open positions for {} on {} ({}) ===", trader, chain, positions.len());
    println!("{:<16} {:>16} {:>28} {:<44}", "Position", "Size (USD)", "Collateral", "Collateral token");
    for position in &positions {
        println!(
            "{:<16} {:>16.2} {:>28} {:<44}",
            position.label(&markets),
            position.size_usd(),
            position.collateral_amount.to_string(),
            position.collateral_token.to_string()
        );
    }
    Ok(())
}

pub async fn show_gas(engine: &OrderEngine, chain: &str) -> Result<()> {
    let (_, services) = engine.resolve(chain)?;
    let (limits, gas_price) =
        tokio::try_join!(services.gas.gas_limits(), services.ledger.gas_price())?;

    println!("\n=== Gas on {} ===", chain);
    println!("Increase order:      {}", limits.increase_order);
    println!("Decrease order:      {}", limits.decrease_order);
    println!("Swap order:          {}", limits.swap_order);
    println!("Single swap:         {}", limits.single_swap);
    println!("Fee base gas limit:  {}", limits.estimated_fee_base_gas_limit);
    println!("Fee multiplier:      {}", limits.estimated_fee_multiplier_factor);
    println!("Gas price:           {} wei", gas_price);
    Ok(())
}
