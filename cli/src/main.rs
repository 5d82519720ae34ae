use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use mines_core::*;

mod repl;

#[derive(Parser, Debug)]
#[command(version, about = "Play Mines rounds against an in-memory ledger", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Player name
    #[arg(short, long, default_value = "player")]
    user: String,

    /// Starting balance
    #[arg(short, long, default_value_t = DEFAULT_BALANCE)]
    balance: Amount,

    /// Mines hidden in the first round
    #[arg(short, long, default_value_t = 1)]
    mines: CellCount,

    /// Extra accounts to fill the leaderboard, opened with the default balance
    #[arg(long = "rival")]
    rivals: Vec<String>,

    /// Print round snapshots as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("seed: {:?}", args.seed);

    let account = AccountId::new(args.user.clone());
    let mut ledger = MemoryLedger::new();
    ledger
        .open_account(account.clone(), args.balance)
        .context("opening player account")?;
    for rival in &args.rivals {
        ledger
            .open_account(AccountId::new(rival.as_str()), DEFAULT_BALANCE)
            .with_context(|| format!("opening rival account {rival}"))?;
    }

    let mut table = match args.seed {
        Some(seed) => MinesTable::with_seed(ledger, seed),
        None => MinesTable::new(ledger),
    };
    let preview = table
        .configure(&account, args.mines)
        .context("configuring the first round")?;

    let mut session = repl::Session::new(table, account, args.json);
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Base multiplier {:.2}x, hit probability {:.2}%. Type `help` for commands.",
        preview.multiplier, preview.hit_probability
    )?;
    session.render(&mut stdout)?;

    let stdin = io::stdin();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match session.execute(&line, &mut stdout)? {
            repl::Flow::Continue => {}
            repl::Flow::Quit => break,
        }
    }

    Ok(())
}
