//! Restart selection. Drivers run one after another, cycling the primary
//! type and stepping the seed, until the search window closes. The loop
//! stops one projected restart early so the winner gets the remaining time
//! as extension passes.
//!
//! Every candidate is validated by full replay before it may win; a
//! restart whose answer fails replay, or that aborts on a broken grid
//! invariant, is discarded with a warning rather than trusted. At least
//! one restart always runs, even with an expired deadline, so there is
//! always an answer to print.

use crate::clock::Deadline;
use crate::io::{Input, Output};
use crate::judge;
use crate::search::{Driver, near_table};
use itertools::Itertools;

pub fn search(input: &Input, deadline: &Deadline, seed: u64) -> Output {
    let near = near_table(input);
    let mut drivers = vec![];
    let mut restart: u64 = 0;
    loop {
        let begun = deadline.elapsed();
        let primary = (restart as usize % input.k) as u8 + 1;
        let mut driver = Driver::new(
            input,
            &near,
            primary,
            input.budget(),
            deadline,
            seed.wrapping_add(restart),
        );
        match driver.run() {
            Ok(()) => {
                eprintln!(
                    "[search] restart {restart} primary {primary} score {} actions {}/{} largest {}",
                    driver.score(),
                    driver.actions_used(),
                    input.budget(),
                    driver.largest_cluster(),
                );
                drivers.push(driver);
            }
            Err(err) => eprintln!("[WARN] restart {restart} aborted: {err}"),
        }
        restart += 1;
        let took = deadline.elapsed() - begun;
        if deadline.search_expired() || deadline.search_remaining() < took * 3 / 2 {
            break;
        }
    }

    let order = (0..drivers.len())
        .sorted_by_key(|&i| (-drivers[i].score(), drivers[i].actions_used()))
        .collect_vec();
    for i in order {
        let out = drivers[i].output();
        match judge::replay(input, &out) {
            Ok(replay) => {
                let mut best = out;
                let mut best_score = replay.score;
                if !deadline.search_expired() {
                    match drivers[i].extend() {
                        Ok(()) => {
                            let extended = drivers[i].output();
                            match judge::replay(input, &extended) {
                                Ok(r) if r.score > best_score => {
                                    eprintln!(
                                        "[search] extended score {best_score} -> {}",
                                        r.score
                                    );
                                    best = extended;
                                    best_score = r.score;
                                }
                                Ok(_) => {}
                                Err(err) => eprintln!("[WARN] extension discarded: {err}"),
                            }
                        }
                        Err(err) => eprintln!("[WARN] extension aborted: {err}"),
                    }
                }
                eprintln!("[search] final score {best_score}");
                return best;
            }
            Err(err) => {
                eprintln!("[WARN] candidate discarded: {err}");
                drivers[i].dump();
            }
        }
    }
    eprintln!("[WARN] no restart produced a valid answer");
    Output::default()
}
