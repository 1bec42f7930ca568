//! Consensus detection and the majority-vote fallback for the panel
//! protocol.

use rand::seq::SliceRandom;
use rand::Rng;

/// Unanimity check over one round's extracted answers.
///
/// Holds iff every answer was extracted and all of them are equal. A round
/// where every extraction missed is not consensus.
pub fn check_consensus(answers: &[Option<String>]) -> bool {
    let first = match answers.first() {
        Some(Some(answer)) => answer.as_str(),
        _ => return false,
    };
    answers.iter().all(|a| a.as_deref() == Some(first))
}

/// Majority vote over a round's extracted answers.
///
/// Missing and blank answers carry no vote. Ties are broken uniformly at
/// random among the tied candidates. `None` when nothing was extractable.
pub fn majority_vote<R: Rng + ?Sized>(answers: &[Option<String>], rng: &mut R) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for answer in answers.iter().flatten() {
        if answer.trim().is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(a, _)| *a == answer.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((answer.as_str(), 1)),
        }
    }

    let max = counts.iter().map(|(_, n)| *n).max()?;
    let tied: Vec<&str> = counts
        .iter()
        .filter(|(_, n)| *n == max)
        .map(|(a, _)| *a)
        .collect();
    tied.choose(rng).map(|a| a.to_string())
}
