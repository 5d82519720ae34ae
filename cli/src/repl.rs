use std::io::Write;

use clap::{Parser, Subcommand};
use mines_core::*;

#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Choose how many mines the next round hides
    Mines { count: CellCount },
    /// Stake an amount and start a round
    Bet { amount: Amount },
    /// Uncover a cell by index, or by column and row
    Reveal { cell: CellIndex, row: Option<Coord> },
    /// Collect the bet times the current multiplier
    #[command(alias = "cash")]
    Cashout,
    /// Clear a finished round
    Reset,
    /// Show the board
    Board,
    /// Show the current balance
    Balance,
    /// List past transactions
    History,
    /// Rank accounts by balance
    Leaderboard,
    /// Leave the game
    #[command(alias = "exit")]
    Quit,
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    table: MinesTable<MemoryLedger>,
    account: AccountId,
    json: bool,
}

impl Session {
    pub fn new(table: MinesTable<MemoryLedger>, account: AccountId, json: bool) -> Self {
        Self {
            table,
            account,
            json,
        }
    }

    /// Runs one input line; game errors are printed and only I/O errors are returned.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let command = match Line::try_parse_from(line.split_whitespace()) {
            Ok(Line { command }) => command,
            Err(err) => {
                write!(out, "{err}")?;
                return Ok(Flow::Continue);
            }
        };
        log::trace!("command: {:?}", command);
        let quit = command == Command::Quit;

        if let Err(err) = self.run(command, out) {
            match err.downcast_ref::<GameError>() {
                Some(game_err) => writeln!(out, "Declined: {game_err}")?,
                None => return Err(err),
            }
        }

        Ok(if quit { Flow::Quit } else { Flow::Continue })
    }

    fn run(&mut self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        let account = self.account.clone();
        match command {
            Command::Mines { count } => {
                let preview = self.table.configure(&account, count)?;
                writeln!(
                    out,
                    "{} mines: base multiplier {:.2}x, hit probability {:.2}%",
                    preview.mines, preview.multiplier, preview.hit_probability
                )?;
            }
            Command::Bet { amount } => {
                let placed = self.table.place_bet(&account, amount)?;
                writeln!(
                    out,
                    "Bet {} on {} mines, balance {}",
                    placed.bet, placed.mines, placed.balance
                )?;
                self.render(out)?;
            }
            Command::Reveal { cell, row } => {
                let index = self.cell_index(cell, row)?;
                match self.table.reveal(&account, index)? {
                    RevealOutcome::NoChange => writeln!(out, "Cell {index} is already open")?,
                    RevealOutcome::Safe {
                        revealed,
                        multiplier,
                    } => writeln!(out, "Safe! {revealed} revealed, multiplier {multiplier:.2}x")?,
                    RevealOutcome::HitMine { lost, logged } => {
                        writeln!(out, "You hit a mine! You lost {lost}")?;
                        if !logged {
                            writeln!(out, "Warning: the loss could not be recorded in your history")?;
                        }
                    }
                }
                self.render(out)?;
            }
            Command::Cashout => {
                let cash_out = self.table.cash_out(&account)?;
                writeln!(
                    out,
                    "You won {} at {:.4}x, balance {}",
                    cash_out.winnings, cash_out.multiplier, cash_out.balance
                )?;
                self.render(out)?;
            }
            Command::Reset => {
                self.table.reset(&account)?;
                self.render(out)?;
            }
            Command::Board => self.render(out)?,
            Command::Balance => {
                let balance = self.table.settlement().balance(&account).map_err(GameError::from)?;
                writeln!(out, "Balance: {balance}")?;
            }
            Command::History => {
                let transactions = self
                    .table
                    .settlement()
                    .transactions(&account)
                    .map_err(GameError::from)?;
                if transactions.is_empty() {
                    writeln!(out, "No transactions yet")?;
                }
                for tx in transactions.iter().rev() {
                    writeln!(out, "{:<5} {:>12} {}", tx.kind, tx.amount, tx.timestamp)?;
                }
            }
            Command::Leaderboard => {
                for (rank, entry) in self.table.leaderboard().iter().enumerate() {
                    let marker = if entry.username == account { "*" } else { " " };
                    writeln!(
                        out,
                        "{marker}{:>3}. {:<16} {:>12}",
                        rank + 1,
                        entry.username.as_str(),
                        entry.balance
                    )?;
                }
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn cell_index(&self, cell: CellIndex, row: Option<Coord>) -> Result<CellIndex> {
        let Some(row) = row else {
            return Ok(cell);
        };
        let size = self
            .table
            .round(&self.account)
            .map_or(DEFAULT_SIZE, |round| round.config().size);
        let column = Coord::try_from(cell).map_err(|_| GameError::InvalidCell(cell))?;
        coords_to_index(size, (column, row)).ok_or(GameError::InvalidCell(cell))
    }

    pub fn render(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let Some(snapshot) = self.table.snapshot(&self.account) else {
            return Ok(());
        };

        if self.json {
            serde_json::to_writer(&mut *out, &snapshot)?;
            writeln!(out)?;
            return Ok(());
        }

        for row in snapshot.grid_rows() {
            writeln!(out, "  {row}")?;
        }
        writeln!(
            out,
            "{:?} | mines {} | bet {} | multiplier {:.2}x | hit {:.2}% | potential win {}",
            snapshot.phase,
            snapshot.mines,
            snapshot.bet,
            snapshot.multiplier,
            snapshot.hit_probability,
            snapshot.potential_win
        )?;
        Ok(())
    }
}
