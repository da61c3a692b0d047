//! `deal`: shuffle, lay out one table and list every set on it. No threads
//! are started; this is the dealer's first deal rendered as text.

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::terminal::render_card;
use setgame_engine::cards::SetRules;
use setgame_engine::deck::Deck;
use std::io::Write;

pub fn handle_deal_command(seed: Option<u64>, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = config::resolve(&Overrides {
        seed,
        ..Overrides::default()
    })?;
    let config = resolved.config;
    let rules = config.rules();
    let seed = config.seed.unwrap_or_else(rand::random);

    let mut deck = Deck::new_with_seed(config.deck_size, seed);
    deck.shuffle();
    let table: Vec<_> = (0..config.table_size).map_while(|_| deck.draw()).collect();

    writeln!(out, "seed: {}", seed)?;
    for (slot, card) in table.iter().enumerate() {
        writeln!(out, "slot {:>2}: {}", slot, render_card(&rules, *card))?;
    }
    let sets = rules.find_sets(&table, usize::MAX);
    writeln!(out, "sets on table: {}", sets.len())?;
    for set in sets {
        let mut slots: Vec<usize> = set
            .iter()
            .filter_map(|card| table.iter().position(|c| c == card))
            .collect();
        slots.sort_unstable();
        writeln!(out, "  slots {:?}", slots)?;
    }
    writeln!(out, "left in deck: {}", deck.len())?;
    Ok(())
}
