use crate::Bracket;

use std::iter::FusedIterator;

/// The final placements of a [`Bracket`].
///
/// The champion is placed 1st, the loser of the final 2nd and every other entrant shares the
/// placement of the round it was eliminated in: a loser of a round with `n` entrants is placed
/// `n / 2 + 1`, e.g. 3rd for semifinal losers and 5th for quarterfinal losers. Entrants still in
/// the tournament have no placement yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standings {
    entries: Vec<Entry>,
}

impl Standings {
    pub(crate) fn new(bracket: &Bracket) -> Self {
        let mut placements: Vec<Option<usize>> = vec![None; bracket.entrants().len()];

        for round in bracket.rounds() {
            let placement = round.tier().participants() / 2 + 1;

            for r#match in round.matches() {
                if let Some(loser) = r#match.loser() {
                    if let Some(slot) = placements.get_mut(loser) {
                        *slot = Some(placement);
                    }
                }
            }
        }

        if let Some(champion) = bracket
            .rounds()
            .last()
            .filter(|_| bracket.is_finished())
            .and_then(|round| round.matches().first())
            .and_then(|r#match| r#match.winner())
        {
            if let Some(slot) = placements.get_mut(champion) {
                *slot = Some(1);
            }
        }

        let mut entries: Vec<Entry> = placements
            .into_iter()
            .enumerate()
            .map(|(index, placement)| Entry { index, placement })
            .collect();

        // Placed entrants first, best placement first. The sort is stable so entrants with the
        // same placement keep their seeding order.
        entries.sort_by_key(|entry| (entry.placement.is_none(), entry.placement));

        Self { entries }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self,
            next: 0,
        }
    }

    /// Returns the placement of the entrant at `index`.
    pub fn placement(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.index == index)
            .and_then(|entry| entry.placement)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Standings {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The index of the entrant in the bracket.
    pub index: usize,
    pub placement: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: &'a Standings,
    next: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.entries.get(self.next)?;
        self.next += 1;
        Some(entry)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.entries.len() - self.next;
        (len, Some(len))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> FusedIterator for Iter<'a> {}
